use std::time::Instant;

/// Cross-cutting sink for ingestion progress.
///
/// Lets each caller decide how accumulator progress shows up.
pub trait ProgressReporter: Send {
    /// Report that `frames` more frames reached the writer.
    fn advance(&mut self, frames: usize);

    /// Emit an end-of-stream summary. Default: no-op.
    fn finish(&self) {}
}

/// Silent reporter used when progress reporting is switched off.
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {
    fn advance(&mut self, _frames: usize) {}
}

/// Reports progress through the `log` crate.
///
/// Output is throttled to every `throttle_frames` frames to keep long
/// renders from flooding the log.
pub struct LogProgressReporter {
    total: usize,
    current: usize,
    throttle_frames: usize,
    last_reported: usize,
    start_time: Instant,
}

impl LogProgressReporter {
    pub fn new(total: usize, throttle_frames: usize) -> Self {
        Self {
            total,
            current: 0,
            throttle_frames: throttle_frames.max(1),
            last_reported: 0,
            start_time: Instant::now(),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the formatted summary string, or `None` if nothing was reported.
    pub fn summary_string(&self) -> Option<String> {
        if self.current == 0 {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Ingestion summary ({} of {} frames, {:.1}s total)",
            self.current, self.total, elapsed
        )];
        if elapsed > 0.0 {
            let fps = self.current as f64 / elapsed;
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }
        Some(lines.join("\n"))
    }
}

impl ProgressReporter for LogProgressReporter {
    fn advance(&mut self, frames: usize) {
        self.current = (self.current + frames).min(self.total);
        let due = self.current - self.last_reported >= self.throttle_frames;
        if self.total > 0 && (due || self.current == self.total) {
            let pct = self.current as f64 / self.total as f64 * 100.0;
            log::info!(
                "Encoded: {}/{} frames ({pct:.1}%)",
                self.current,
                self.total
            );
            self.last_reported = self.current;
        }
    }

    fn finish(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}
