use std::path::Path;

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;

/// Loads still images from disk into [`Frame`]s.
///
/// Images with an alpha channel become RGBA frames; everything else is
/// converted to RGB.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> Result<Frame, BoxError> {
        let img = image::open(path)?;
        let (width, height) = (img.width(), img.height());
        let frame = if img.color().has_alpha() {
            Frame::try_new(img.into_rgba8().into_raw(), width, height, 4)?
        } else {
            Frame::try_new(img.into_rgb8().into_raw(), width, height, 3)?
        };
        Ok(frame)
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}
