use ndarray::Zip;

use crate::shared::error::Result;
use crate::shared::frame::Frame;
use crate::smoothing::domain::interpolator::{check_inputs, step_weight, Interpolator};

/// Linear cross-fade: `prev * (1 - w) + curr * w` per sample, with
/// `w = (step_index + 1) / total_steps`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearCrossfade;

impl LinearCrossfade {
    pub fn new() -> Self {
        Self
    }
}

impl Interpolator for LinearCrossfade {
    fn interpolate(
        &self,
        prev: &Frame,
        curr: &Frame,
        step_index: usize,
        total_steps: usize,
    ) -> Result<Frame> {
        check_inputs(prev, curr, step_index, total_steps)?;
        Ok(blend(prev, curr, step_weight(step_index, total_steps)))
    }
}

/// Mixes two same-shaped frames; `weight` is the share of `curr`.
///
/// Callers are responsible for checking shapes first.
pub fn blend(prev: &Frame, curr: &Frame, weight: f64) -> Frame {
    let weight = weight.clamp(0.0, 1.0);
    let mixed = Zip::from(prev.as_ndarray())
        .and(curr.as_ndarray())
        .map_collect(|&p, &c| mix(p, c, weight));
    Frame::new(
        mixed.iter().copied().collect(),
        prev.width(),
        prev.height(),
        prev.channels(),
    )
}

fn mix(prev: u8, curr: u8, weight: f64) -> u8 {
    let value = f64::from(prev) * (1.0 - weight) + f64::from(curr) * weight;
    value.round().clamp(0.0, 255.0) as u8
}
