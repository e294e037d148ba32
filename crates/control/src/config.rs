//! Controller configuration.

use compute::ExecutionTarget;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, Result};
use crate::rollout::path_buffer_len;

/// Cost and noise tuning shared by the rollout and the control law.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Variance σ² of the control noise.
    pub noise_variance: f64,
    /// `a` in the temperature λ = a·σ².
    pub temperature_scale: f64,
    /// Weight `b` of the running cost `dt·b·‖p‖²`.
    pub running_weight: f64,
    /// Weight `d` of the terminal cost `d·‖p‖²`.
    pub terminal_weight: f64,
    /// `e` in the decay constant k = −e/T.
    pub decay_rate: f64,
    /// One-time penalty η charged when a sample first leaves the free region.
    pub collision_penalty: f64,
    /// Also decay the position channels toward the origin.
    pub damp_position: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            noise_variance: 0.01,
            temperature_scale: 1.0,
            running_weight: 1e-4,
            terminal_weight: 1e-4,
            decay_rate: 2.0,
            collision_penalty: 1.0,
            damp_position: false,
        }
    }
}

impl Tuning {
    /// σ, the noise standard deviation.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.noise_variance.sqrt()
    }

    /// λ = a·σ².
    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature_scale * self.noise_variance
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Duration of one step in seconds.
    pub dt: f64,
    /// Horizon duration `T` in seconds.
    pub horizon: f64,
    pub sample_count: usize,
    /// Half-width of the admissible outer square.
    pub border_radius: f64,
    /// Half-width of every obstacle square.
    pub box_radius: f64,
    pub target: ExecutionTarget,
    pub seed: u64,
    pub tuning: Tuning,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            horizon: 10.0,
            sample_count: 10_000,
            border_radius: 5.0,
            box_radius: 0.5,
            target: ExecutionTarget::default(),
            seed: 0,
            tuning: Tuning::default(),
        }
    }
}

// Absorbs representation error in T/dt, e.g. 10.0 / 0.1 = 99.999... gives
// 100 steps. This intentionally departs from plain truncation: 0.3 / 0.1
// gives 3 steps here, not 2.
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

// 2^53; past this T/dt no longer resolves whole steps.
const MAX_STEP_RATIO: f64 = 9_007_199_254_740_992.0;

impl ControllerConfig {
    /// The obstacle-avoidance scenario the controller was tuned on: start at
    /// (3, 3), one obstacle at (−2, −2), positions damped toward the origin.
    #[must_use]
    pub fn navigation_scenario() -> Self {
        Self {
            tuning: Tuning { damp_position: true, ..Tuning::default() },
            ..Self::default()
        }
    }

    /// Horizon length N = ⌊T/dt⌋ in steps.
    #[must_use]
    pub fn num_steps(&self) -> usize {
        let ratio = self.horizon / self.dt;
        if !ratio.is_finite() || ratio <= 0.0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (ratio + STEP_COUNT_TOLERANCE).floor() as usize;
        steps
    }

    /// Checks every field, reporting the first invalid one.
    ///
    /// # Errors
    ///
    /// [`ControlError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        positive("dt", self.dt)?;
        positive("horizon", self.horizon)?;
        if self.sample_count == 0 {
            return Err(ControlError::config("sample_count", "must be at least 1"));
        }
        positive("border_radius", self.border_radius)?;
        non_negative("box_radius", self.box_radius)?;
        if self.num_steps() == 0 {
            return Err(ControlError::config(
                "horizon",
                format!("{} is shorter than one step of {}", self.horizon, self.dt),
            ));
        }
        if self.horizon / self.dt > MAX_STEP_RATIO {
            return Err(ControlError::config(
                "horizon",
                format!("{} at steps of {} is too many steps", self.horizon, self.dt),
            ));
        }
        if path_buffer_len(self.sample_count, self.num_steps()).is_none() {
            return Err(ControlError::config(
                "sample_count",
                format!(
                    "{} samples over {} steps overflow the rollout buffer",
                    self.sample_count,
                    self.num_steps()
                ),
            ));
        }

        let t = &self.tuning;
        positive("tuning.noise_variance", t.noise_variance)?;
        positive("tuning.temperature_scale", t.temperature_scale)?;
        non_negative("tuning.running_weight", t.running_weight)?;
        non_negative("tuning.terminal_weight", t.terminal_weight)?;
        non_negative("tuning.decay_rate", t.decay_rate)?;
        non_negative("tuning.collision_penalty", t.collision_penalty)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ControlError::config(field, format!("must be positive and finite, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ControlError::config(field, format!("must be non-negative and finite, got {value}")))
    }
}
