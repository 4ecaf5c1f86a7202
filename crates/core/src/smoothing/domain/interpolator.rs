use crate::shared::error::{FrameweaveError, Result};
use crate::shared::frame::Frame;

/// Synthesizes one in-between frame for a transition from `prev` to `curr`.
///
/// `step_index` runs from `0` to `total_steps - 1`. Both inputs have the
/// same shape, and implementations must return a frame of that shape.
pub trait Interpolator: Send {
    fn interpolate(
        &self,
        prev: &Frame,
        curr: &Frame,
        step_index: usize,
        total_steps: usize,
    ) -> Result<Frame>;
}

impl<F> Interpolator for F
where
    F: Fn(&Frame, &Frame, usize, usize) -> Result<Frame> + Send,
{
    fn interpolate(
        &self,
        prev: &Frame,
        curr: &Frame,
        step_index: usize,
        total_steps: usize,
    ) -> Result<Frame> {
        self(prev, curr, step_index, total_steps)
    }
}

/// How many transition frames to synthesize between two real frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SmoothingPolicy {
    /// A fixed number of frames.
    Frames(usize),
    /// A transition duration in seconds, converted using the stream fps.
    Duration(f64),
}

impl SmoothingPolicy {
    pub fn frame_count(&self, fps: f64) -> usize {
        match *self {
            Self::Frames(n) => n,
            Self::Duration(seconds) => (seconds * fps).round().max(0.0) as usize,
        }
    }
}

/// Fails unless `prev` and `curr` can be blended and the step is in range.
pub fn check_inputs(
    prev: &Frame,
    curr: &Frame,
    step_index: usize,
    total_steps: usize,
) -> Result<()> {
    if !prev.same_shape(curr) {
        return Err(FrameweaveError::ShapeMismatch {
            expected: prev.shape(),
            actual: curr.shape(),
        });
    }
    if total_steps == 0 || step_index >= total_steps {
        return Err(FrameweaveError::invalid_config(format!(
            "interpolation step {step_index} out of range for {total_steps} steps"
        )));
    }
    Ok(())
}

/// Weight of `curr` at `step_index`: `(step_index + 1) / total_steps`.
///
/// The last step lands exactly on the target frame.
pub fn step_weight(step_index: usize, total_steps: usize) -> f64 {
    (step_index + 1) as f64 / total_steps as f64
}

/// Verifies that a synthesized frame kept the shape of its inputs.
pub fn check_output_shape(expected: &Frame, synthesized: &Frame) -> Result<()> {
    if expected.same_shape(synthesized) {
        Ok(())
    } else {
        Err(FrameweaveError::ShapeMismatch {
            expected: expected.shape(),
            actual: synthesized.shape(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;
    use rstest::rstest;

    #[test]
    fn test_closure_is_an_interpolator() {
        let pick_current =
            |_: &Frame, curr: &Frame, _: usize, _: usize| -> Result<Frame> { Ok(curr.clone()) };
        let a = Frame::filled(2, 2, Rgb([0, 0, 0]));
        let b = Frame::filled(2, 2, Rgb([9, 9, 9]));
        let boxed: Box<dyn Interpolator> = Box::new(pick_current);
        assert_eq!(boxed.interpolate(&a, &b, 0, 1).unwrap(), b);
    }

    #[rstest]
    #[case(SmoothingPolicy::Frames(7), 30.0, 7)]
    #[case(SmoothingPolicy::Duration(1.0), 60.0, 60)]
    #[case(SmoothingPolicy::Duration(0.5), 5.0, 3)]
    #[case(SmoothingPolicy::Duration(0.25), 10.0, 3)]
    #[case(SmoothingPolicy::Duration(0.05), 5.0, 0)]
    fn test_frame_count(
        #[case] policy: SmoothingPolicy,
        #[case] fps: f64,
        #[case] expected: usize,
    ) {
        assert_eq!(policy.frame_count(fps), expected);
    }

    #[test]
    fn test_step_weight_reaches_one_on_last_step() {
        assert_relative_eq!(step_weight(0, 4), 0.25);
        assert_relative_eq!(step_weight(3, 4), 1.0);
        assert_relative_eq!(step_weight(0, 1), 1.0);
    }

    #[test]
    fn test_check_inputs_rejects_shape_mismatch() {
        let a = Frame::filled(2, 2, Rgb([0, 0, 0]));
        let b = Frame::filled(4, 2, Rgb([0, 0, 0]));
        assert!(matches!(
            check_inputs(&a, &b, 0, 1),
            Err(FrameweaveError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_check_inputs_rejects_step_out_of_range() {
        let a = Frame::filled(2, 2, Rgb([0, 0, 0]));
        assert!(check_inputs(&a, &a, 2, 2).is_err());
        assert!(check_inputs(&a, &a, 0, 0).is_err());
        assert!(check_inputs(&a, &a, 1, 2).is_ok());
    }

    #[test]
    fn test_check_output_shape() {
        let a = Frame::filled(2, 2, Rgb([0, 0, 0]));
        let b = Frame::filled(3, 2, Rgb([0, 0, 0]));
        assert!(check_output_shape(&a, &a).is_ok());
        assert!(check_output_shape(&a, &b).is_err());
    }
}
