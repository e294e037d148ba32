#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Path-Integral Navigation Controller
//!
//! A sampling-based receding-horizon controller that steers a planar agent
//! toward the origin while avoiding axis-aligned square obstacles.
//!
//! ## Key Components
//!
//! -   **Observation codec:** [`observation`] decodes the simulator's flat
//!     observation vector into a [`State`] and a list of [`Obstacle`]s.
//! -   **Dynamics:** [`DynamicsModel`] gives the drift of speed, heading and
//!     position used both for rollouts and for the real state.
//! -   **Collision:** [`CollisionEvaluator`] absorbs samples that leave the
//!     free region and charges the one-time penalty.
//! -   **Rollouts:** [`RolloutEngine`] simulates the noise-perturbed sample
//!     batch on a [`compute`] backend and accumulates per-sample cost.
//! -   **Control law:** [`ControlExtractor`] turns costs into importance
//!     weights and averages the first-step noise.
//! -   **Controller:** [`PathIntegralController`] owns the horizon buffers and
//!     the reset/step protocol.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use control::{ControllerConfig, ObservationBuilder, PathIntegralController};
//!
//! let obs = ObservationBuilder::new().position(3.0, 3.0).obstacle(-2.0, -2.0).build();
//! let mut controller = PathIntegralController::new(ControllerConfig::navigation_scenario())?;
//! controller.reset(&obs)?;
//! for _ in 0..controller.horizon_steps() {
//!     let out = controller.step(&obs)?;
//!     println!("{:?} -> {:?}", out.control, out.state);
//! }
//! # Ok::<(), control::ControlError>(())
//! ```

pub mod collision;
pub mod config;
pub mod controller;
pub mod dynamics;
pub mod error;
pub mod extract;
pub mod noise;
pub mod observation;
pub mod rollout;
pub mod trajectory;

pub use collision::CollisionEvaluator;
pub use config::{ControllerConfig, Tuning};
pub use controller::{PathIntegralController, Phase, StepOutput, StepStats};
pub use dynamics::DynamicsModel;
pub use error::{ControlError, Result};
pub use extract::{Control, ControlExtractor, WeightStats};
pub use noise::{Noise, NoiseBatch, NoiseSource};
pub use observation::{
    decode_obstacles, decode_state, obstacle_count, Obstacle, ObservationBuilder, State,
};
pub use rollout::{path_buffer_len, CostWeights, RolloutBuffers, RolloutEngine, RolloutSummary};
pub use trajectory::{TrajectoryObserver, TrajectoryView};

pub use compute::{Backend, ComputeBackend, CpuBackend, ExecutionTarget};
