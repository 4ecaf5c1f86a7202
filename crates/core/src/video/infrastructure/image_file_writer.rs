use std::path::Path;

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes a single RGB or RGBA frame to an image file using the `image` crate.
///
/// The format is inferred from the path's extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_dynamic_image(frame: &Frame) -> Result<DynamicImage, BoxError> {
    let data = frame.data().to_vec();
    match frame.channels() {
        3 => RgbImage::from_raw(frame.width(), frame.height(), data)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| "Failed to create image from frame data".into()),
        4 => RgbaImage::from_raw(frame.width(), frame.height(), data)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| "Failed to create image from frame data".into()),
        other => Err(format!("Unsupported channel count: {other}").into()),
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), BoxError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        to_dynamic_image(frame)?.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let frame = Frame::filled(100, 80, Rgb([50, 100, 200]));
        ImageFileWriter::new().write(&path, &frame).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let frame = Frame::filled(50, 50, Rgb([50, 100, 200]));
        ImageFileWriter::new().write(&path, &frame).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.width(), 50);
        assert_eq!(img.height(), 50);
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_write_rgba_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alpha.png");
        let frame = Frame::new(vec![10, 20, 30, 40], 1, 1, 4);
        ImageFileWriter::new().write(&path, &frame).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 40]);
    }

    #[test]
    fn test_write_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/still.png");
        let frame = Frame::filled(8, 8, Rgb([1, 2, 3]));
        ImageFileWriter::new().write(&path, &frame).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_unknown_extension_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.notanimage");
        let frame = Frame::filled(10, 10, Rgb([0, 0, 0]));
        assert!(ImageFileWriter::new().write(&path, &frame).is_err());
    }
}
