use thiserror::Error;

/// Boxed error returned by external collaborators (encoders, image writers,
/// figure renderers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, FrameweaveError>;

#[derive(Error, Debug)]
pub enum FrameweaveError {
    #[error("frame writer is closed")]
    ClosedWriter,
    #[error("frame accumulator is closed")]
    ClosedAccumulator,
    #[error("frame accumulator overflow: declared total of {total} frames already reached")]
    Overflow { total: usize },
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// (width, height, channels)
        expected: (u32, u32, u8),
        actual: (u32, u32, u8),
    },
    #[error("video encoder failed: {0}")]
    Encoder(#[source] BoxError),
    #[error("failed to save still image: {0}")]
    StillImage(#[source] BoxError),
    #[error("figure rendering failed: {0}")]
    Render(#[source] BoxError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FrameweaveError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
