pub mod buffered_accumulator;
pub mod frame_writer;
pub mod progress_reporter;
pub mod writer_config;
