//! # Dynamics Model
//!
//! Drift `f(x)` of the planar agent: speed and heading relax exponentially
//! toward zero while the position advances along the heading at the current
//! speed (unicycle kinematics). Control and noise enter only through the
//! speed and heading channels.

use crate::config::ControllerConfig;
use crate::observation::State;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DynamicsModel {
    /// k = −e/T applied to speed and heading.
    decay: f64,
    /// Decay applied to x and y; zero unless position damping is enabled.
    position_decay: f64,
}

impl DynamicsModel {
    #[must_use]
    pub fn new(decay_rate: f64, horizon: f64, damp_position: bool) -> Self {
        let decay = -decay_rate / horizon;
        Self {
            decay,
            position_decay: if damp_position { decay } else { 0.0 },
        }
    }

    #[must_use]
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.tuning.decay_rate, config.horizon, config.tuning.damp_position)
    }

    #[must_use]
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Time derivative of `state`.
    #[must_use]
    pub fn drift(&self, state: &State) -> State {
        let (sin, cos) = state.theta.sin_cos();
        State {
            x: self.position_decay.mul_add(state.x, state.v * cos),
            y: self.position_decay.mul_add(state.y, state.v * sin),
            v: self.decay * state.v,
            theta: self.decay * state.theta,
        }
    }

    /// One explicit Euler step: `state + f(state)·dt + G·input`, where `G`
    /// routes `input` onto the speed and heading channels.
    #[must_use]
    pub fn advance(&self, state: &State, dt: f64, input: [f64; 2]) -> State {
        let d = self.drift(state);
        State {
            x: d.x.mul_add(dt, state.x),
            y: d.y.mul_add(dt, state.y),
            v: d.v.mul_add(dt, state.v) + input[0],
            theta: d.theta.mul_add(dt, state.theta) + input[1],
        }
    }
}
