use image::Rgb;

use crate::shared::error::{FrameweaveError, Result};
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_writer::VideoWriter;

use super::frame_writer::FrameWriter;
use super::progress_reporter::{LogProgressReporter, NullProgressReporter, ProgressReporter};
use super::writer_config::WriterConfig;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Collects frames in a bounded queue and hands them to a [`FrameWriter`] in
/// batches of `flush_threshold`.
///
/// The stream length is declared up front: adding more than `total` frames
/// fails, and adding the last one closes the accumulator (and its writer).
/// Progress is reported once per flushed batch.
pub struct BufferedAccumulator {
    writer: FrameWriter,
    total: usize,
    flush_threshold: usize,
    pending: Vec<Frame>,
    count: usize,
    flushed: usize,
    background: Rgb<u8>,
    progress: Box<dyn ProgressReporter>,
    closed: bool,
}

impl BufferedAccumulator {
    pub fn new(
        writer: FrameWriter,
        total: usize,
        flush_threshold: usize,
        progress: Box<dyn ProgressReporter>,
    ) -> Result<Self> {
        if total == 0 {
            return Err(FrameweaveError::invalid_config(
                "declared total frame count must be positive",
            ));
        }
        if flush_threshold == 0 {
            return Err(FrameweaveError::invalid_config(
                "flush threshold must be positive",
            ));
        }

        Ok(Self {
            writer,
            total,
            flush_threshold,
            pending: Vec::with_capacity(flush_threshold.min(total)),
            count: 0,
            flushed: 0,
            background: WHITE,
            progress,
            closed: false,
        })
    }

    /// Builds the writer from `config` and picks a log-based or silent
    /// progress reporter from its progress toggle.
    pub fn from_config(
        config: WriterConfig,
        encoder: Box<dyn VideoWriter>,
        image_writer: Box<dyn ImageWriter>,
        total: usize,
        flush_threshold: usize,
    ) -> Result<Self> {
        let progress: Box<dyn ProgressReporter> = if config.progress() {
            Box::new(LogProgressReporter::new(total, flush_threshold))
        } else {
            Box::new(NullProgressReporter)
        };
        let writer = FrameWriter::new(config, encoder, image_writer);
        Self::new(writer, total, flush_threshold, progress)
    }

    /// Background used to flatten RGBA frames. Defaults to white.
    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }

    pub fn add_frame(&mut self, frame: Frame) -> Result<()> {
        if self.count == self.total {
            return Err(FrameweaveError::Overflow { total: self.total });
        }
        if self.closed {
            return Err(FrameweaveError::ClosedAccumulator);
        }

        self.pending.push(frame);
        self.count += 1;

        let flushed = if self.pending.len() >= self.flush_threshold {
            self.flush()
        } else {
            Ok(())
        };
        if self.count < self.total {
            return flushed;
        }

        let closed = self.close();
        if let (Err(flush_err), Err(_)) = (&flushed, &closed) {
            log::error!("Flush before auto-close failed: {flush_err}");
        }
        flushed.and(closed)
    }

    /// Flushes whatever is still queued and closes the underlying writer.
    ///
    /// Only the first call does anything. The writer is closed even when
    /// the final flush fails.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let flushed = if self.pending.is_empty() {
            Ok(())
        } else {
            self.flush()
        };
        let closed = self.writer.close();
        self.progress.finish();

        if let (Err(flush_err), Err(_)) = (&flushed, &closed) {
            log::error!("Final flush failed: {flush_err}");
        }
        flushed.and(closed)
    }

    /// Frames accepted so far, whether flushed or still queued.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn flush_threshold(&self) -> usize {
        self.flush_threshold
    }

    /// Frames queued but not yet handed to the writer.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Frames the writer has accepted from this accumulator.
    pub fn flushed(&self) -> usize {
        self.flushed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn writer(&self) -> &FrameWriter {
        &self.writer
    }

    fn flush(&mut self) -> Result<()> {
        let batch = std::mem::take(&mut self.pending);
        log::debug!("Flushing {} frames", batch.len());

        let before = self.writer.frame_count();
        let result = self.writer.write_frames(batch, self.background);
        let written = self.writer.frame_count() - before;

        self.flushed += written;
        self.progress.advance(written);
        result
    }
}

impl Drop for BufferedAccumulator {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!(
                "Accumulator dropped with {} of {} frames; closing",
                self.count,
                self.total
            );
            if let Err(err) = self.close() {
                log::error!("Failed to close accumulator on drop: {err}");
            }
        }
    }
}
