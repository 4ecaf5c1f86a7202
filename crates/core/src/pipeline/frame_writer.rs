use std::fmt;

use image::Rgb;

use crate::alignment::domain::block_aligner::{aligned_dimensions, resize_to};
use crate::rendering::domain::figure::Figure;
use crate::shared::error::{BoxError, FrameweaveError, Result};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::smoothing::domain::interpolator::check_output_shape;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_writer::VideoWriter;

use super::writer_config::WriterConfig;

/// Normalizes frames to one canonical size, optionally inserts cross-fade
/// frames between them, and forwards everything to a [`VideoWriter`] in
/// call order.
///
/// The canonical size is fixed by the first frame (or by the configured
/// output size) and never changes afterwards. The encoder is opened lazily
/// once that size is known and closed exactly once, by [`close`](Self::close),
/// by [`scoped`](Self::scoped) or, as a last resort, on drop.
pub struct FrameWriter {
    config: WriterConfig,
    encoder: Box<dyn VideoWriter>,
    image_writer: Box<dyn ImageWriter>,
    canonical_size: Option<(u32, u32)>,
    frame_count: usize,
    frames_encoded: usize,
    previous: Option<Frame>,
    closed: bool,
}

impl FrameWriter {
    pub fn new(
        config: WriterConfig,
        encoder: Box<dyn VideoWriter>,
        image_writer: Box<dyn ImageWriter>,
    ) -> Self {
        Self {
            config,
            encoder,
            image_writer,
            canonical_size: None,
            frame_count: 0,
            frames_encoded: 0,
            previous: None,
            closed: false,
        }
    }

    /// Runs `body` with a fresh writer and closes it on every exit path.
    ///
    /// If `body` fails, a failure while closing is logged and the original
    /// error is returned.
    pub fn scoped<T, F>(
        config: WriterConfig,
        encoder: Box<dyn VideoWriter>,
        image_writer: Box<dyn ImageWriter>,
        body: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut FrameWriter) -> Result<T>,
    {
        let mut writer = FrameWriter::new(config, encoder, image_writer);
        let outcome = body(&mut writer);
        let closed = writer.close();

        match outcome {
            Ok(value) => closed.map(|()| value),
            Err(err) => {
                log::error!("Writing {} failed: {err}", writer.config.output_path().display());
                if let Err(close_err) = closed {
                    log::error!("Closing writer after failure also failed: {close_err}");
                }
                Err(err)
            }
        }
    }

    pub fn write_frame(&mut self, frame: Frame, background: Rgb<u8>) -> Result<()> {
        if self.closed {
            return Err(FrameweaveError::ClosedWriter);
        }

        let frame = self.normalize(frame.flatten(background))?;

        self.write_transition(&frame)?;
        self.forward(&frame)?;
        self.frame_count += 1;
        log::debug!("Wrote frame {}", self.frame_count);

        if self.config.retains_previous_frame() {
            self.previous = Some(frame);
        }
        Ok(())
    }

    /// Writes `frames` in order. The first failure aborts the remaining
    /// frames; frames already forwarded stay in the stream.
    pub fn write_frames<I>(&mut self, frames: I, background: Rgb<u8>) -> Result<()>
    where
        I: IntoIterator<Item = Frame>,
    {
        for frame in frames {
            self.write_frame(frame, background)?;
        }
        Ok(())
    }

    /// Renders `figure` at no less than the configured DPI and writes the
    /// result as one frame.
    pub fn write_figure<F>(&mut self, figure: &mut F, background: Rgb<u8>) -> Result<()>
    where
        F: Figure + ?Sized,
    {
        if self.closed {
            return Err(FrameweaveError::ClosedWriter);
        }

        if figure.dpi() < self.config.dpi() {
            figure.set_dpi(self.config.dpi());
        }
        if !self.config.interactive() {
            figure.suppress_interactive();
        }

        let (width, height) = figure.pixel_size();
        let frame = figure.render(background).map_err(FrameweaveError::Render)?;
        if frame.dimensions() != (width, height) {
            return Err(FrameweaveError::ShapeMismatch {
                expected: (width, height, frame.channels()),
                actual: frame.shape(),
            });
        }

        self.write_frame(frame, background)
    }

    pub fn write_figures<'a, F, I>(&mut self, figures: I, background: Rgb<u8>) -> Result<()>
    where
        F: Figure + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut F>,
    {
        for figure in figures {
            self.write_figure(figure, background)?;
        }
        Ok(())
    }

    /// Saves the final frame (when requested) and closes the encoder.
    ///
    /// Only the first call does anything.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let saved = self.save_final_frame();
        let closed = self.encoder.close().map_err(FrameweaveError::Encoder);
        self.previous = None;

        log::info!(
            "Closed {} ({} frames, {} encoded)",
            self.config.output_path().display(),
            self.frame_count,
            self.frames_encoded
        );

        if let (Err(save_err), Err(_)) = (&saved, &closed) {
            log::error!("Saving final frame failed: {save_err}");
        }
        closed.and(saved)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Real frames written so far, not counting synthesized transitions.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Frames handed to the encoder, transitions included.
    pub fn frames_encoded(&self) -> usize {
        self.frames_encoded
    }

    pub fn canonical_size(&self) -> Option<(u32, u32)> {
        self.canonical_size
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    fn normalize(&mut self, frame: Frame) -> Result<Frame> {
        if let Some((width, height)) = self.canonical_size {
            return resize_to(&frame, width, height);
        }

        let (target_w, target_h) = self.config.size().unwrap_or(frame.dimensions());
        let (width, height) = aligned_dimensions(target_w, target_h, self.config.block_size())?;
        let frame = resize_to(&frame, width, height)?;

        let metadata = VideoMetadata {
            width,
            height,
            fps: self.config.fps(),
            block_size: self.config.block_size(),
        };
        if let Err(err) = self.encoder.open(self.config.output_path(), &metadata) {
            return Err(self.encoder_failed(err));
        }

        self.canonical_size = Some((width, height));
        log::info!(
            "Canonical frame size {width}x{height} for {}",
            self.config.output_path().display()
        );
        Ok(frame)
    }

    /// Forwards the cross-fade from the retained previous frame to `curr`.
    /// The previous frame stays in place so a close triggered by an encoder
    /// failure can still capture it.
    fn write_transition(&mut self, curr: &Frame) -> Result<()> {
        let steps = self.config.smoothing_frames();
        for step in 0..steps {
            let Some(prev) = self.previous.as_ref() else {
                return Ok(());
            };
            let synthesized = self
                .config
                .interpolator()
                .interpolate(prev, curr, step, steps)?;
            check_output_shape(curr, &synthesized)?;
            self.forward(&synthesized)?;
        }
        Ok(())
    }

    fn forward(&mut self, frame: &Frame) -> Result<()> {
        if let Err(err) = self.encoder.write(frame) {
            return Err(self.encoder_failed(err));
        }
        self.frames_encoded += 1;
        Ok(())
    }

    /// Releases the encoder after a collaborator failure and returns the
    /// original error for propagation.
    fn encoder_failed(&mut self, err: BoxError) -> FrameweaveError {
        log::error!(
            "Encoder failed on {}: {err}",
            self.config.output_path().display()
        );
        if let Err(close_err) = self.close() {
            log::warn!("Closing after encoder failure also failed: {close_err}");
        }
        FrameweaveError::Encoder(err)
    }

    fn save_final_frame(&self) -> Result<()> {
        if !self.config.save_final_frame() {
            return Ok(());
        }
        let Some(frame) = self.previous.as_ref() else {
            log::debug!("No frames written; skipping final frame capture");
            return Ok(());
        };

        let path = self.config.final_frame_path();
        self.image_writer
            .write(&path, frame)
            .map_err(FrameweaveError::StillImage)?;
        log::info!("Saved final frame to {}", path.display());
        Ok(())
    }
}

impl Drop for FrameWriter {
    fn drop(&mut self) {
        if !self.closed {
            log::debug!(
                "Closing {} on drop",
                self.config.output_path().display()
            );
            if let Err(err) = self.close() {
                log::error!("Failed to close writer on drop: {err}");
            }
        }
    }
}

impl fmt::Display for FrameWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical_size {
            Some((w, h)) => writeln!(f, "Animation size: {w}x{h}")?,
            None => writeln!(f, "Animation size: unset")?,
        }
        write!(f, "Animation path: {}", self.config.output_path().display())
    }
}
