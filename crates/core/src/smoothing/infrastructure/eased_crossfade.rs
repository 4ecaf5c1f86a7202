use crate::shared::error::Result;
use crate::shared::frame::Frame;
use crate::smoothing::domain::interpolator::{check_inputs, step_weight, Interpolator};
use crate::smoothing::infrastructure::linear_crossfade::blend;

/// Easing curves mapping linear progress in `[0, 1]` onto blend weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Ease {
    pub const ALL: [Ease; 7] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ];

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }

    pub fn parse(name: &str) -> Option<Ease> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "linear" => Some(Self::Linear),
            "in-quad" => Some(Self::InQuad),
            "out-quad" => Some(Self::OutQuad),
            "in-out-quad" => Some(Self::InOutQuad),
            "in-cubic" => Some(Self::InCubic),
            "out-cubic" => Some(Self::OutCubic),
            "in-out-cubic" => Some(Self::InOutCubic),
            _ => None,
        }
    }
}

/// Cross-fade whose weight follows an easing curve instead of a straight line.
#[derive(Clone, Copy, Debug)]
pub struct EasedCrossfade {
    ease: Ease,
}

impl EasedCrossfade {
    pub fn new(ease: Ease) -> Self {
        Self { ease }
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }
}

impl Interpolator for EasedCrossfade {
    fn interpolate(
        &self,
        prev: &Frame,
        curr: &Frame,
        step_index: usize,
        total_steps: usize,
    ) -> Result<Frame> {
        check_inputs(prev, curr, step_index, total_steps)?;
        let weight = self.ease.apply(step_weight(step_index, total_steps));
        Ok(blend(prev, curr, weight))
    }
}
