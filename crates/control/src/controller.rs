//! # Path-Integral Controller
//!
//! Owns the horizon buffers and drives the reset/step protocol. Each `step`
//! re-plans the remaining horizon from the current real state with a fresh
//! sample batch, extracts one control, and advances the real state by one
//! `dt` under the realized disturbance drawn at `reset`.

use compute::{Backend, ComputeBackend};
use tracing::{debug, info, warn};

use crate::collision::CollisionEvaluator;
use crate::config::ControllerConfig;
use crate::dynamics::DynamicsModel;
use crate::error::{ControlError, Result};
use crate::extract::{Control, ControlExtractor};
use crate::noise::{Noise, NoiseBatch, NoiseSource};
use crate::observation::{decode_obstacles, decode_state, State};
use crate::rollout::{CostWeights, RolloutBuffers, RolloutEngine};
use crate::trajectory::{TrajectoryObserver, TrajectoryView};

/// Protocol state of a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, never reset.
    Uninitialized,
    /// Ready to take horizon step `step`.
    Ready { step: usize },
    /// Horizon exhausted; only `reset` is accepted.
    Terminal,
}

/// Diagnostics for one applied step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepStats {
    pub min_cost: f64,
    /// Samples that survived the remaining horizon without collision.
    pub surviving: usize,
    pub effective_samples: f64,
}

/// Result of one controller step.
#[derive(Clone, Copy, Debug)]
pub struct StepOutput<'a> {
    /// Real state after applying the control.
    pub state: State,
    pub control: Control,
    pub stats: StepStats,
    /// Sample paths used to compute `control`, from the step they were
    /// planned at to the end of the horizon.
    pub samples: TrajectoryView<'a>,
}

pub struct PathIntegralController<B: ComputeBackend = Backend> {
    config: ControllerConfig,
    horizon: usize,
    dynamics: DynamicsModel,
    extractor: ControlExtractor,
    weights: CostWeights,
    backend: B,
    noise_source: NoiseSource,
    state: Option<State>,
    /// Realized disturbance, one draw per horizon step.
    nominal_noise: Vec<Noise>,
    buffers: RolloutBuffers,
    sample_noise: NoiseBatch,
    step: usize,
}

impl PathIntegralController<Backend> {
    /// Builds a controller on the backend named by `config.target`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration or an unavailable backend.
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        let backend = Backend::for_target(config.target)?;
        Self::with_backend(config, backend)
    }
}

impl<B: ComputeBackend> PathIntegralController<B> {
    /// Builds a controller on an explicit backend.
    ///
    /// # Errors
    ///
    /// [`ControlError::InvalidConfig`] if `config` does not validate.
    pub fn with_backend(config: ControllerConfig, backend: B) -> Result<Self> {
        config.validate()?;
        let horizon = config.num_steps();
        let tuning = config.tuning;
        Ok(Self {
            dynamics: DynamicsModel::from_config(&config),
            extractor: ControlExtractor::new(tuning.sigma(), config.dt, tuning.temperature()),
            weights: CostWeights {
                running: tuning.running_weight,
                terminal: tuning.terminal_weight,
            },
            noise_source: NoiseSource::new(config.seed),
            state: None,
            nominal_noise: Vec::new(),
            buffers: RolloutBuffers::new(config.sample_count, horizon)?,
            sample_noise: NoiseBatch::default(),
            step: 0,
            horizon,
            backend,
            config,
        })
    }

    /// Starts a new episode from `observation`.
    ///
    /// Re-derives the real state, draws a fresh realized disturbance for the
    /// whole horizon and clears every buffer.
    ///
    /// # Errors
    ///
    /// Precondition errors for a malformed observation.
    pub fn reset(&mut self, observation: &[f64]) -> Result<()> {
        let state = decode_state(observation)?;
        let obstacles = decode_obstacles(observation, self.config.box_radius)?;

        self.nominal_noise = self.noise_source.trajectory(self.horizon);
        self.buffers.clear();
        self.state = Some(state);
        self.step = 0;

        info!(
            "Controller reset at ({:.3}, {:.3}) with {} obstacles, horizon {} steps, {} samples on {}",
            state.x,
            state.y,
            obstacles.len(),
            self.horizon,
            self.config.sample_count,
            self.backend.name()
        );
        Ok(())
    }

    /// Plans the remaining horizon and applies one control step.
    ///
    /// # Errors
    ///
    /// [`ControlError::NotInitialized`] before the first reset,
    /// [`ControlError::HorizonExhausted`] once all N steps were taken,
    /// observation precondition errors, or [`ControlError::Degenerate`] if no
    /// finite control could be computed. A failed step leaves the real state
    /// and step counter untouched.
    pub fn step(&mut self, observation: &[f64]) -> Result<StepOutput<'_>> {
        let state = self.state.ok_or(ControlError::NotInitialized)?;
        if self.step >= self.horizon {
            return Err(ControlError::HorizonExhausted { horizon: self.horizon });
        }
        let obstacles = decode_obstacles(observation, self.config.box_radius)?;
        let collision = CollisionEvaluator::new(
            self.config.border_radius,
            obstacles,
            self.config.tuning.collision_penalty,
        );

        let planned_at = self.step;
        self.noise_source.fill_batch(
            &mut self.sample_noise,
            self.config.sample_count,
            self.horizon - planned_at,
        );
        let engine = RolloutEngine::new(
            &self.dynamics,
            &collision,
            self.weights,
            self.config.dt,
            self.config.tuning.sigma(),
        );
        let summary = engine.run(
            &self.backend,
            state,
            planned_at..self.horizon,
            &mut self.buffers,
            &self.sample_noise,
        );
        if summary.surviving == 0 {
            warn!("Every rollout collided at step {planned_at}");
        }

        let (control, weights) = self
            .extractor
            .extract(self.buffers.costs(), self.sample_noise.first_steps())?;

        let dt = self.config.dt;
        let disturbance = self.nominal_noise[planned_at];
        let scale = self.config.tuning.sigma() * dt.sqrt();
        let input = [
            control.acceleration.mul_add(dt, scale * disturbance[0]),
            control.yaw_rate.mul_add(dt, scale * disturbance[1]),
        ];
        let next = self.dynamics.advance(&state, dt, input);
        self.state = Some(next);
        self.step += 1;

        let stats = StepStats {
            min_cost: weights.min_cost,
            surviving: summary.surviving,
            effective_samples: weights.effective_samples,
        };
        debug!(
            step = planned_at,
            acceleration = control.acceleration,
            yaw_rate = control.yaw_rate,
            min_cost = stats.min_cost,
            surviving = stats.surviving,
            ess = stats.effective_samples,
            "Controller step applied"
        );

        Ok(StepOutput {
            state: next,
            control,
            stats,
            samples: self.buffers.view(planned_at),
        })
    }

    /// [`step`](Self::step), then hands the sample batch to `observer`.
    ///
    /// # Errors
    ///
    /// Same as [`step`](Self::step); the observer is not called on failure.
    pub fn step_observed(
        &mut self,
        observation: &[f64],
        observer: &mut dyn TrajectoryObserver,
    ) -> Result<(State, Control, StepStats)> {
        let out = self.step(observation)?;
        observer.observe(out.samples.first_step(), &out.samples);
        Ok((out.state, out.control, out.stats))
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.state {
            None => Phase::Uninitialized,
            Some(_) if self.step >= self.horizon => Phase::Terminal,
            Some(_) => Phase::Ready { step: self.step },
        }
    }

    /// Current real state, if reset.
    #[must_use]
    pub fn state(&self) -> Option<State> {
        self.state
    }

    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step
    }

    /// N, the number of steps per episode.
    #[must_use]
    pub fn horizon_steps(&self) -> usize {
        self.horizon
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn nominal_noise(&self) -> &[Noise] {
        &self.nominal_noise
    }

    /// Active flags of the most recent rollout.
    #[must_use]
    pub fn active_flags(&self) -> &[bool] {
        self.buffers.active()
    }

    /// Accumulated costs of the most recent rollout.
    #[must_use]
    pub fn accumulated_costs(&self) -> &[f64] {
        self.buffers.costs()
    }

    /// Paths of the most recent rollout, from horizon step `first_step`.
    ///
    /// # Panics
    ///
    /// If `first_step` exceeds the horizon.
    #[must_use]
    pub fn rollout_states(&self, first_step: usize) -> TrajectoryView<'_> {
        assert!(first_step <= self.horizon, "step {first_step} beyond horizon {}", self.horizon);
        self.buffers.view(first_step)
    }
}
