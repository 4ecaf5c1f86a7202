use image::Rgb;
use ndarray::ArrayView3;

use crate::shared::error::{FrameweaveError, Result};

/// A single video frame: contiguous RGB or RGBA bytes in row-major order.
///
/// Frames are immutable once constructed. Resizing, alpha flattening and
/// blending all produce new frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    /// Validating constructor for buffers coming from outside the crate.
    pub fn try_new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FrameweaveError::invalid_config(format!(
                "frame dimensions must be positive, got {width}x{height}"
            )));
        }
        if channels != 3 && channels != 4 {
            return Err(FrameweaveError::invalid_config(format!(
                "frame must have 3 or 4 channels, got {channels}"
            )));
        }
        let expected = (width as usize) * (height as usize) * (channels as usize);
        if data.len() != expected {
            return Err(FrameweaveError::ShapeMismatch {
                expected: (width, height, channels),
                actual: (data.len() as u32, 1, 1),
            });
        }
        Ok(Self::new(data, width, height, channels))
    }

    /// A frame where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: Rgb<u8>) -> Self {
        let data = color
            .0
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 3)
            .collect();
        Self::new(data, width, height, 3)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// (width, height, channels)
    pub fn shape(&self) -> (u32, u32, u8) {
        (self.width, self.height, self.channels)
    }

    pub fn same_shape(&self, other: &Frame) -> bool {
        self.shape() == other.shape()
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.array_shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Composites an RGBA frame over a solid background, yielding RGB.
    /// RGB frames are returned unchanged.
    pub fn flatten(self, background: Rgb<u8>) -> Frame {
        if !self.has_alpha() {
            return self;
        }
        let mut out = Vec::with_capacity((self.width as usize) * (self.height as usize) * 3);
        for px in self.data.chunks_exact(4) {
            let alpha = u16::from(px[3]);
            for c in 0..3 {
                let fg = u16::from(px[c]) * alpha;
                let bg = u16::from(background.0[c]) * (255 - alpha);
                out.push(((fg + bg + 127) / 255) as u8);
            }
        }
        Frame::new(out, self.width, self.height, 3)
    }

    fn array_shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
