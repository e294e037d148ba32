//! # Rollout Engine
//!
//! Forward-simulates the noise-perturbed sample batch from the current real
//! state to the end of the horizon and accumulates each sample's cost.
//!
//! Samples are independent, so the whole horizon of one sample is a single
//! kernel invocation on the compute backend. A sample that leaves the free
//! region is absorbed: it pays the collision penalty once, stops
//! accumulating cost and never receives terminal cost. Its remaining path
//! entries are frozen at the absorbing state.

use std::ops::Range;

use compute::ComputeBackend;

use crate::collision::CollisionEvaluator;
use crate::dynamics::DynamicsModel;
use crate::error::{ControlError, Result};
use crate::noise::{Noise, NoiseBatch};
use crate::observation::State;
use crate::trajectory::TrajectoryView;

/// States held by `samples` paths over `horizon` steps, or `None` when the
/// buffer size overflows what a `Vec` can address.
#[must_use]
pub fn path_buffer_len(samples: usize, horizon: usize) -> Option<usize> {
    let len = horizon.checked_add(1)?.checked_mul(samples)?;
    let bytes = len.checked_mul(std::mem::size_of::<State>())?;
    isize::try_from(bytes).ok().map(|_| len)
}

/// Per-sample buffers for one horizon, reused across steps.
#[derive(Clone, Debug)]
pub struct RolloutBuffers {
    /// `samples` contiguous paths of `horizon + 1` states each.
    states: Vec<State>,
    costs: Vec<f64>,
    active: Vec<bool>,
    horizon: usize,
}

impl RolloutBuffers {
    /// # Errors
    ///
    /// [`ControlError::InvalidConfig`] if the path buffer size overflows.
    pub fn new(samples: usize, horizon: usize) -> Result<Self> {
        let len = path_buffer_len(samples, horizon).ok_or_else(|| {
            ControlError::config(
                "sample_count",
                format!("{samples} samples over {horizon} steps overflow the rollout buffer"),
            )
        })?;
        Ok(Self {
            states: vec![State::default(); len],
            costs: vec![0.0; samples],
            active: vec![true; samples],
            horizon,
        })
    }

    /// Zeroes paths and costs and marks every sample active.
    pub fn clear(&mut self) {
        self.states.fill(State::default());
        self.costs.fill(0.0);
        self.active.fill(true);
    }

    #[must_use]
    pub fn samples(&self) -> usize {
        self.costs.len()
    }

    #[must_use]
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    #[must_use]
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    #[must_use]
    pub fn active(&self) -> &[bool] {
        &self.active
    }

    /// State of `sample` at absolute horizon step `step`.
    #[must_use]
    pub fn state(&self, step: usize, sample: usize) -> &State {
        &self.states[sample * (self.horizon + 1) + step]
    }

    /// View of every path from `first_step` to the end of the horizon.
    #[must_use]
    pub fn view(&self, first_step: usize) -> TrajectoryView<'_> {
        TrajectoryView::new(&self.states, self.horizon + 1, first_step)
    }
}

/// Quadratic pull toward the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostWeights {
    /// `b` in the running cost `dt·b·‖p‖²`.
    pub running: f64,
    /// `d` in the terminal cost `d·‖p‖²`.
    pub terminal: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RolloutSummary {
    /// Samples that stayed collision-free for the whole horizon.
    pub surviving: usize,
    pub min_cost: f64,
}

struct Lane<'a> {
    path: &'a mut [State],
    cost: &'a mut f64,
    active: &'a mut bool,
    noise: &'a [Noise],
}

pub struct RolloutEngine<'a> {
    dynamics: &'a DynamicsModel,
    collision: &'a CollisionEvaluator,
    weights: CostWeights,
    dt: f64,
    /// σ·√dt, the scale applied to each standard normal draw.
    noise_scale: f64,
}

impl<'a> RolloutEngine<'a> {
    #[must_use]
    pub fn new(
        dynamics: &'a DynamicsModel,
        collision: &'a CollisionEvaluator,
        weights: CostWeights,
        dt: f64,
        sigma: f64,
    ) -> Self {
        Self {
            dynamics,
            collision,
            weights,
            dt,
            noise_scale: sigma * dt.sqrt(),
        }
    }

    /// Rolls every sample from `start` over horizon steps `steps`.
    ///
    /// # Panics
    ///
    /// If `steps` is empty or ends past the buffers' horizon, or if `noise`
    /// does not hold `steps.len()` draws for each of `buffers.samples()`
    /// samples.
    pub fn run<B: ComputeBackend>(
        &self,
        backend: &B,
        start: State,
        steps: Range<usize>,
        buffers: &mut RolloutBuffers,
        noise: &NoiseBatch,
    ) -> RolloutSummary {
        assert!(
            steps.start < steps.end && steps.end <= buffers.horizon,
            "rollout steps {steps:?} outside horizon {}",
            buffers.horizon
        );
        assert_eq!(noise.steps(), steps.len(), "noise batch does not cover the rollout");
        assert_eq!(noise.samples(), buffers.samples(), "noise batch sample count mismatch");

        let path_len = buffers.horizon + 1;
        let mut lanes: Vec<Lane<'_>> = buffers
            .states
            .chunks_exact_mut(path_len)
            .zip(buffers.costs.iter_mut())
            .zip(buffers.active.iter_mut())
            .zip(noise.per_sample())
            .map(|(((path, cost), active), noise)| Lane { path, cost, active, noise })
            .collect();

        backend.map_lanes(&mut lanes, |_, lane| self.roll_sample(lane, start, steps.clone()));
        drop(lanes);

        RolloutSummary {
            surviving: buffers.active.iter().filter(|&&a| a).count(),
            min_cost: buffers.costs.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }

    fn roll_sample(&self, lane: &mut Lane<'_>, start: State, steps: Range<usize>) {
        let end = steps.end;
        lane.path[steps.start] = start;
        *lane.cost = 0.0;
        *lane.active = true;

        for (i, draw) in steps.zip(lane.noise) {
            let current = lane.path[i];
            *lane.cost += self.dt * self.weights.running * current.position_norm_sq();

            let input = [self.noise_scale * draw[0], self.noise_scale * draw[1]];
            let next = self.dynamics.advance(&current, self.dt, input);
            lane.path[i + 1] = next;

            let (still_active, penalty) = self.collision.transition(next.position(), true);
            *lane.cost += penalty;
            if !still_active {
                *lane.active = false;
                lane.path[i + 2..=end].fill(next);
                return;
            }
        }

        *lane.cost += self.weights.terminal * lane.path[end].position_norm_sq();
    }
}
