//! Single-pole exponential low-pass filter.
//!
//! `state' = state + α·(target − state)`
//!
//! The smoother holds only its coefficient; the running state belongs to the
//! caller (see [`crate::pipeline::FilterState`]).  Feeding the same initial
//! state and the same targets always reproduces the same outputs, and each
//! scalar channel is filtered on its own.

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExponentialSmoother {
    alpha: f64,
}

impl ExponentialSmoother {
    /// `name` identifies the option in the error message.
    pub fn new(name: &'static str, alpha: f64) -> Result<Self, ConfigError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::SmoothingAlpha { name, value: alpha });
        }
        Ok(ExponentialSmoother { alpha })
    }

    #[inline]
    pub fn step(&self, state: f64, target: f64) -> f64 {
        state + self.alpha * (target - state)
    }

    /// Filter a whole sequence starting from `initial`.
    pub fn run<I>(&self, initial: f64, targets: I) -> Vec<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut state = initial;
        targets
            .into_iter()
            .map(|t| {
                state = self.step(state, t);
                state
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_alpha_outside_unit_interval() {
        assert!(ExponentialSmoother::new("a", 0.0).is_err());
        assert!(ExponentialSmoother::new("a", 1.5).is_err());
        assert!(ExponentialSmoother::new("a", f64::NAN).is_err());
        assert!(ExponentialSmoother::new("a", 1.0).is_ok());
    }

    #[test]
    fn alpha_one_tracks_target_exactly() {
        let s = ExponentialSmoother::new("a", 1.0).unwrap();
        assert_eq!(s.run(0.0, [3.0, -2.0, 7.5]), vec![3.0, -2.0, 7.5]);
    }

    #[test]
    fn quarter_alpha_moves_a_quarter_of_the_way() {
        let s = ExponentialSmoother::new("a", 0.25).unwrap();
        assert_eq!(s.step(960.0, 1960.0), 1210.0);
    }

    #[test]
    fn converges_toward_constant_target() {
        let s = ExponentialSmoother::new("a", 0.2).unwrap();
        let out = s.run(0.0, std::iter::repeat(1.0).take(60));
        assert!(out.windows(2).all(|w| w[1] >= w[0]));
        assert!((out[59] - 1.0).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn restart_reproduces_identical_output(
            alpha in 0.01f64..=1.0,
            init in -1000.0f64..1000.0,
            targets in prop::collection::vec(-1000.0f64..1000.0, 0..64),
        ) {
            let s = ExponentialSmoother::new("a", alpha).unwrap();
            let a = s.run(init, targets.iter().copied());
            let b = s.run(init, targets.iter().copied());
            prop_assert_eq!(
                a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
                b.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
            );
        }

        #[test]
        fn stays_within_hull_of_inputs(
            alpha in 0.01f64..=1.0,
            init in 0.0f64..=1.0,
            targets in prop::collection::vec(0.0f64..=1.0, 1..64),
        ) {
            let s = ExponentialSmoother::new("a", alpha).unwrap();
            for v in s.run(init, targets) {
                prop_assert!((-1e-12..=1.0 + 1e-12).contains(&v));
            }
        }
    }
}
