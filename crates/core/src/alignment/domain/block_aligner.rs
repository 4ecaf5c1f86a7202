use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel, Rgb, Rgba};

use crate::shared::error::{FrameweaveError, Result};
use crate::shared::frame::Frame;

/// Filter used for every resample. Interpolating, so content is stretched
/// rather than cropped or padded.
const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Rounds `width` and `height` up to the next multiple of `granularity`.
///
/// Dimensions that are already multiples are returned unchanged.
pub fn aligned_dimensions(width: u32, height: u32, granularity: u32) -> Result<(u32, u32)> {
    if granularity == 0 {
        return Err(FrameweaveError::invalid_config(
            "block granularity must be positive",
        ));
    }
    Ok((
        round_up(width, granularity),
        round_up(height, granularity),
    ))
}

fn round_up(value: u32, granularity: u32) -> u32 {
    value + (granularity - value % granularity) % granularity
}

/// Resamples `frame` to the smallest size whose sides are multiples of
/// `granularity`.
pub fn align(frame: &Frame, granularity: u32) -> Result<Frame> {
    let (width, height) = aligned_dimensions(frame.width(), frame.height(), granularity)?;
    resize_to(frame, width, height)
}

/// Resamples `frame` to exactly `width` x `height`.
///
/// A frame that already has the requested size is returned as-is, without
/// going through the (lossy) filter.
pub fn resize_to(frame: &Frame, width: u32, height: u32) -> Result<Frame> {
    if width == 0 || height == 0 {
        return Err(FrameweaveError::invalid_config(format!(
            "cannot resize to {width}x{height}"
        )));
    }
    if frame.dimensions() == (width, height) {
        return Ok(frame.clone());
    }

    log::debug!(
        "Resizing frame {}x{} -> {width}x{height}",
        frame.width(),
        frame.height()
    );

    match frame.channels() {
        3 => resample::<Rgb<u8>>(frame, width, height),
        4 => resample::<Rgba<u8>>(frame, width, height),
        other => Err(FrameweaveError::invalid_config(format!(
            "unsupported channel count {other}"
        ))),
    }
}

fn resample<P>(frame: &Frame, width: u32, height: u32) -> Result<Frame>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let src: ImageBuffer<P, Vec<u8>> =
        ImageBuffer::from_raw(frame.width(), frame.height(), frame.data().to_vec()).ok_or(
            FrameweaveError::ShapeMismatch {
                expected: frame.shape(),
                actual: (frame.data().len() as u32, 1, 1),
            },
        )?;
    let resized = imageops::resize(&src, width, height, RESIZE_FILTER);
    Ok(Frame::new(
        resized.into_raw(),
        width,
        height,
        frame.channels(),
    ))
}
