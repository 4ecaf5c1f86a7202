use std::path::Path;

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Abstracts the sequential video encoder so frame ingestion does not depend
/// on a specific codec library.
///
/// Frames are appended in call order. `open` receives the canonical size,
/// which is always a multiple of `metadata.block_size`.
pub trait VideoWriter: Send {
    fn open(&mut self, path: &Path, metadata: &VideoMetadata) -> Result<(), BoxError>;

    fn write(&mut self, frame: &Frame) -> Result<(), BoxError>;

    /// Flushes buffered packets and releases the output file.
    fn close(&mut self) -> Result<(), BoxError>;
}
