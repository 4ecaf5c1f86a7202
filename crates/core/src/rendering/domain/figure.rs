use image::Rgb;

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;

/// A drawable figure owned by a plotting/rendering library.
///
/// Rendering must be synchronous and idempotent, and the returned frame's
/// dimensions must match [`Figure::pixel_size`] at the time of the call.
pub trait Figure {
    fn dpi(&self) -> f64;

    fn set_dpi(&mut self, dpi: f64);

    /// Current canvas size in pixels, `(width, height)`.
    fn pixel_size(&self) -> (u32, u32);

    /// Draws the canvas and returns its RGB or RGBA pixels.
    fn render(&mut self, background: Rgb<u8>) -> Result<Frame, BoxError>;

    /// Called before rendering unless interactive mode was requested.
    fn suppress_interactive(&mut self) {}
}
