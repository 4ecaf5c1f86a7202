//! Frame ingestion for video encoding.
//!
//! Frames (raw RGB/RGBA pixel buffers, or figures rendered on demand) are
//! normalized to one block-aligned canonical size, optionally cross-faded
//! into each other, and appended to a video stream in call order.
//!
//! ```no_run
//! use frameweave_core::pipeline::frame_writer::FrameWriter;
//! use frameweave_core::pipeline::writer_config::WriterConfig;
//! use frameweave_core::shared::frame::Frame;
//! use frameweave_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
//! use frameweave_core::video::infrastructure::image_file_writer::ImageFileWriter;
//! use image::Rgb;
//!
//! # fn main() -> frameweave_core::shared::error::Result<()> {
//! let config = WriterConfig::builder("out.mp4")
//!     .fps(10.0)
//!     .auto_smooth(true)
//!     .smoothing_frames(4)
//!     .build()?;
//! FrameWriter::scoped(
//!     config,
//!     Box::new(FfmpegWriter::new()),
//!     Box::new(ImageFileWriter::new()),
//!     |writer| {
//!         writer.write_frame(Frame::filled(101, 57, Rgb([0, 0, 0])), Rgb([255, 255, 255]))?;
//!         writer.write_frame(Frame::filled(101, 57, Rgb([255, 0, 0])), Rgb([255, 255, 255]))
//!     },
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod pipeline;
pub mod rendering;
pub mod shared;
pub mod smoothing;
pub mod video;
