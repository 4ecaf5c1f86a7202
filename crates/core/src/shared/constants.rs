/// Encoders based on 16x16 macroblocks reject other frame sizes.
pub const DEFAULT_BLOCK_SIZE: u32 = 16;

pub const DEFAULT_DPI: f64 = 150.0;
pub const DEFAULT_FPS: f64 = 5.0;

pub const DEFAULT_SMOOTHING_FRAMES: usize = 5;
pub const DEFAULT_FLUSH_THRESHOLD: usize = 10;

/// Appended to the output file stem when the final frame is saved as a still.
pub const FINAL_FRAME_SUFFIX: &str = "_FinalFrame";
pub const FINAL_FRAME_EXTENSION: &str = "png";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
