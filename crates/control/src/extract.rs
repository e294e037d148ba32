//! # Control Extractor
//!
//! Path-integral control law: the control is the softmax-weighted average of
//! the first-step noise draws, with weights `exp(−cost/λ)`, rescaled by
//! `σ/√dt`. Costs are shifted by their minimum before exponentiating so the
//! weight sum cannot underflow to zero.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, Result};
use crate::noise::Noise;

/// Command applied to the speed and heading channels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub acceleration: f64,
    pub yaw_rate: f64,
}

impl Control {
    #[must_use]
    pub const fn as_array(&self) -> [f64; 2] {
        [self.acceleration, self.yaw_rate]
    }
}

/// Importance-weight diagnostics for one extraction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WeightStats {
    pub min_cost: f64,
    /// Kish effective sample size, (Σw)²/Σw².
    pub effective_samples: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlExtractor {
    /// σ/√dt.
    gain: f64,
    /// λ.
    temperature: f64,
}

impl ControlExtractor {
    #[must_use]
    pub fn new(sigma: f64, dt: f64, temperature: f64) -> Self {
        Self { gain: sigma / dt.sqrt(), temperature }
    }

    /// Computes the control from per-sample costs and first-step noise.
    ///
    /// # Errors
    ///
    /// [`ControlError::Degenerate`] when there are no samples, the minimum
    /// cost is not finite, or the weighted average is not finite.
    pub fn extract(
        &self,
        costs: &[f64],
        first_noise: impl IntoIterator<Item = Noise>,
    ) -> Result<(Control, WeightStats)> {
        let min_cost = costs.iter().copied().fold(f64::INFINITY, f64::min);
        if !min_cost.is_finite() {
            return Err(ControlError::Degenerate(format!(
                "minimum rollout cost is {min_cost} over {} samples",
                costs.len()
            )));
        }

        let mut weight_sum = 0.0;
        let mut weight_sq_sum = 0.0;
        let mut numer = [0.0; 2];
        for (&cost, draw) in costs.iter().zip(first_noise) {
            let w = (-(cost - min_cost) / self.temperature).exp();
            weight_sum += w;
            weight_sq_sum += w * w;
            numer[0] += w * draw[0];
            numer[1] += w * draw[1];
        }

        if !(weight_sum.is_finite() && weight_sum > 0.0) {
            return Err(ControlError::Degenerate(format!("weight sum is {weight_sum}")));
        }

        let control = Control {
            acceleration: self.gain * numer[0] / weight_sum,
            yaw_rate: self.gain * numer[1] / weight_sum,
        };
        if !(control.acceleration.is_finite() && control.yaw_rate.is_finite()) {
            return Err(ControlError::Degenerate(format!("control {control:?} is not finite")));
        }

        Ok((
            control,
            WeightStats {
                min_cost,
                effective_samples: weight_sum * weight_sum / weight_sq_sum,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_returns_scaled_noise() {
        let extractor = ControlExtractor::new(0.1, 0.01, 0.01);
        let (u, stats) = extractor.extract(&[3.0], [[1.0, -2.0]]).unwrap();
        assert!((u.acceleration - 1.0).abs() < 1e-12);
        assert!((u.yaw_rate + 2.0).abs() < 1e-12);
        assert!((stats.effective_samples - 1.0).abs() < 1e-12);
    }

    #[test]
    fn nan_cost_is_degenerate() {
        let extractor = ControlExtractor::new(0.1, 0.1, 0.01);
        let result = extractor.extract(&[f64::NAN, f64::NAN], [[1.0, 1.0], [0.0, 0.0]]);
        assert!(matches!(result, Err(ControlError::Degenerate(_))));
    }
}
