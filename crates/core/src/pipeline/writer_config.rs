use std::fmt;
use std::path::{Path, PathBuf};

use crate::shared::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_DPI, DEFAULT_FPS, DEFAULT_SMOOTHING_FRAMES, FINAL_FRAME_EXTENSION,
    FINAL_FRAME_SUFFIX,
};
use crate::shared::error::{FrameweaveError, Result};
use crate::smoothing::domain::interpolator::{Interpolator, SmoothingPolicy};
use crate::smoothing::infrastructure::linear_crossfade::LinearCrossfade;

/// Validated settings for a [`FrameWriter`](super::frame_writer::FrameWriter).
///
/// Built through [`WriterConfig::builder`]; invalid combinations are rejected
/// by [`WriterConfigBuilder::build`] rather than at write time.
pub struct WriterConfig {
    output_path: PathBuf,
    size: Option<(u32, u32)>,
    progress: bool,
    block_size: u32,
    dpi: f64,
    fps: f64,
    interactive: bool,
    smoothing: Option<SmoothingPolicy>,
    interpolator: Box<dyn Interpolator>,
    save_final_frame: bool,
}

impl WriterConfig {
    pub fn builder(output_path: impl Into<PathBuf>) -> WriterConfigBuilder {
        WriterConfigBuilder::new(output_path.into())
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Requested output size, before block alignment.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    pub fn progress(&self) -> bool {
        self.progress
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn smoothing(&self) -> Option<SmoothingPolicy> {
        self.smoothing
    }

    /// Number of transition frames inserted before each real frame after the
    /// first; zero when smoothing is off.
    pub fn smoothing_frames(&self) -> usize {
        self.smoothing
            .map(|policy| policy.frame_count(self.fps))
            .unwrap_or(0)
    }

    pub fn interpolator(&self) -> &dyn Interpolator {
        self.interpolator.as_ref()
    }

    pub fn save_final_frame(&self) -> bool {
        self.save_final_frame
    }

    /// Whether the writer has to hold on to the last real frame.
    pub fn retains_previous_frame(&self) -> bool {
        self.smoothing.is_some() || self.save_final_frame
    }

    /// `<dir>/<stem>_FinalFrame.png` next to the video output.
    pub fn final_frame_path(&self) -> PathBuf {
        let stem = self
            .output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_path.with_file_name(format!(
            "{stem}{FINAL_FRAME_SUFFIX}.{FINAL_FRAME_EXTENSION}"
        ))
    }
}

impl fmt::Debug for WriterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterConfig")
            .field("output_path", &self.output_path)
            .field("size", &self.size)
            .field("progress", &self.progress)
            .field("block_size", &self.block_size)
            .field("dpi", &self.dpi)
            .field("fps", &self.fps)
            .field("interactive", &self.interactive)
            .field("smoothing", &self.smoothing)
            .field("save_final_frame", &self.save_final_frame)
            .finish_non_exhaustive()
    }
}

/// Collects writer options; see [`WriterConfig::builder`].
pub struct WriterConfigBuilder {
    output_path: PathBuf,
    size: Option<(u32, u32)>,
    progress: bool,
    block_size: u32,
    dpi: f64,
    fps: f64,
    interactive: bool,
    auto_smooth: bool,
    smoothing_frames: Option<usize>,
    smoothing_time: Option<f64>,
    interpolator: Option<Box<dyn Interpolator>>,
    save_final_frame: bool,
}

impl WriterConfigBuilder {
    fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            size: None,
            progress: false,
            block_size: DEFAULT_BLOCK_SIZE,
            dpi: DEFAULT_DPI,
            fps: DEFAULT_FPS,
            interactive: false,
            auto_smooth: false,
            smoothing_frames: None,
            smoothing_time: None,
            interpolator: None,
            save_final_frame: false,
        }
    }

    /// Fixes the output size up front instead of deriving it from the first
    /// frame. The size is still rounded up to the block size.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    pub fn block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    /// Minimum DPI figures are rendered at.
    pub fn dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn interactive(mut self, enabled: bool) -> Self {
        self.interactive = enabled;
        self
    }

    pub fn auto_smooth(mut self, enabled: bool) -> Self {
        self.auto_smooth = enabled;
        self
    }

    pub fn smoothing_frames(mut self, frames: usize) -> Self {
        self.smoothing_frames = Some(frames);
        self
    }

    /// Transition length in seconds. Takes precedence over
    /// [`smoothing_frames`](Self::smoothing_frames).
    pub fn smoothing_time(mut self, seconds: f64) -> Self {
        self.smoothing_time = Some(seconds);
        self
    }

    pub fn interpolator(mut self, interpolator: impl Interpolator + 'static) -> Self {
        self.interpolator = Some(Box::new(interpolator));
        self
    }

    pub fn save_final_frame(mut self, enabled: bool) -> Self {
        self.save_final_frame = enabled;
        self
    }

    pub fn build(self) -> Result<WriterConfig> {
        if self.output_path.as_os_str().is_empty() {
            return Err(FrameweaveError::invalid_config("output path is required"));
        }
        if self.block_size == 0 {
            return Err(FrameweaveError::invalid_config(
                "block size must be a positive integer",
            ));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(FrameweaveError::invalid_config(format!(
                "fps must be a positive number, got {}",
                self.fps
            )));
        }
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(FrameweaveError::invalid_config(format!(
                "dpi must be a positive number, got {}",
                self.dpi
            )));
        }
        if let Some((w, h)) = self.size {
            if w == 0 || h == 0 {
                return Err(FrameweaveError::invalid_config(format!(
                    "output size must be positive, got {w}x{h}"
                )));
            }
        }

        let smoothing = if self.auto_smooth {
            Some(self.resolve_smoothing()?)
        } else {
            if self.smoothing_frames.is_some() || self.smoothing_time.is_some() {
                log::warn!("Smoothing options are ignored because auto-smoothing is disabled");
            }
            None
        };

        Ok(WriterConfig {
            output_path: self.output_path,
            size: self.size,
            progress: self.progress,
            block_size: self.block_size,
            dpi: self.dpi,
            fps: self.fps,
            interactive: self.interactive,
            smoothing,
            interpolator: self
                .interpolator
                .unwrap_or_else(|| Box::new(LinearCrossfade::new())),
            save_final_frame: self.save_final_frame,
        })
    }

    fn resolve_smoothing(&self) -> Result<SmoothingPolicy> {
        if let Some(seconds) = self.smoothing_time {
            if !(seconds.is_finite() && seconds > 0.0) {
                return Err(FrameweaveError::invalid_config(format!(
                    "smoothing time must be a positive number of seconds, got {seconds}"
                )));
            }
            let policy = SmoothingPolicy::Duration(seconds);
            if policy.frame_count(self.fps) == 0 {
                return Err(FrameweaveError::invalid_config(format!(
                    "smoothing time {seconds}s is shorter than one frame at {} fps",
                    self.fps
                )));
            }
            if self.smoothing_frames.is_some() {
                log::debug!("Both smoothing time and frame count given; using time");
            }
            return Ok(policy);
        }

        let frames = self.smoothing_frames.unwrap_or(DEFAULT_SMOOTHING_FRAMES);
        if frames == 0 {
            return Err(FrameweaveError::invalid_config(
                "smoothing frame count must be at least 1",
            ));
        }
        Ok(SmoothingPolicy::Frames(frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::Frame;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = WriterConfig::builder("out.mp4").build().unwrap();
        assert_eq!(config.block_size(), 16);
        assert_eq!(config.dpi(), 150.0);
        assert_eq!(config.fps(), 5.0);
        assert_eq!(config.size(), None);
        assert!(!config.progress());
        assert!(!config.interactive());
        assert!(!config.save_final_frame());
        assert_eq!(config.smoothing(), None);
        assert_eq!(config.smoothing_frames(), 0);
        assert!(!config.retains_previous_frame());
    }

    #[test]
    fn test_auto_smooth_uses_default_frame_count() {
        let config = WriterConfig::builder("out.mp4")
            .auto_smooth(true)
            .build()
            .unwrap();
        assert_eq!(config.smoothing(), Some(SmoothingPolicy::Frames(5)));
        assert_eq!(config.smoothing_frames(), 5);
        assert!(config.retains_previous_frame());
    }

    #[test]
    fn test_smoothing_time_wins_over_frames() {
        let config = WriterConfig::builder("out.mp4")
            .fps(60.0)
            .auto_smooth(true)
            .smoothing_frames(3)
            .smoothing_time(0.5)
            .build()
            .unwrap();
        assert_eq!(config.smoothing(), Some(SmoothingPolicy::Duration(0.5)));
        assert_eq!(config.smoothing_frames(), 30);
    }

    #[test]
    fn test_smoothing_ignored_without_auto_smooth() {
        let config = WriterConfig::builder("out.mp4")
            .smoothing_frames(3)
            .build()
            .unwrap();
        assert_eq!(config.smoothing_frames(), 0);
    }

    #[test]
    fn test_save_final_frame_retains_previous() {
        let config = WriterConfig::builder("out.mp4")
            .save_final_frame(true)
            .build()
            .unwrap();
        assert!(config.retains_previous_frame());
    }

    #[rstest]
    #[case(WriterConfig::builder(""))]
    #[case(WriterConfig::builder("out.mp4").block_size(0))]
    #[case(WriterConfig::builder("out.mp4").fps(0.0))]
    #[case(WriterConfig::builder("out.mp4").fps(f64::NAN))]
    #[case(WriterConfig::builder("out.mp4").dpi(-1.0))]
    #[case(WriterConfig::builder("out.mp4").size(0, 10))]
    #[case(WriterConfig::builder("out.mp4").auto_smooth(true).smoothing_frames(0))]
    #[case(WriterConfig::builder("out.mp4").auto_smooth(true).smoothing_time(-1.0))]
    #[case(WriterConfig::builder("out.mp4").auto_smooth(true).smoothing_time(0.01))]
    fn test_invalid_options_rejected(#[case] builder: WriterConfigBuilder) {
        assert!(matches!(
            builder.build(),
            Err(FrameweaveError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_final_frame_path() {
        let config = WriterConfig::builder("/tmp/videos/run.mp4").build().unwrap();
        assert_eq!(
            config.final_frame_path(),
            PathBuf::from("/tmp/videos/run_FinalFrame.png")
        );
    }

    #[test]
    fn test_custom_interpolator_is_used() {
        let config = WriterConfig::builder("out.mp4")
            .interpolator(|prev: &Frame, _: &Frame, _: usize, _: usize| -> Result<Frame> {
                Ok(prev.clone())
            })
            .build()
            .unwrap();
        let a = Frame::new(vec![1, 2, 3], 1, 1, 3);
        let b = Frame::new(vec![4, 5, 6], 1, 1, 3);
        assert_eq!(config.interpolator().interpolate(&a, &b, 0, 1).unwrap(), a);
    }

    #[test]
    fn test_debug_omits_interpolator() {
        let config = WriterConfig::builder("out.mp4").build().unwrap();
        let text = format!("{config:?}");
        assert!(text.contains("out.mp4"));
        assert!(text.contains(".."));
    }
}
