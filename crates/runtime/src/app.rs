//! # Trial Loop
//!
//! Runs independent trials of the navigation scene. Each trial builds a
//! fresh controller seeded `seed + trial`, resets it on the scene
//! observation and applies up to N − 1 steps. After every step the real
//! agent position is checked against the scene; leaving the free region
//! ends the trial as a failure.

use std::path::PathBuf;

use anyhow::{Context, Result};
use compute::Backend;
use control::{
    decode_obstacles, CollisionEvaluator, ControllerConfig, PathIntegralController, State,
};
use serde::Serialize;

use crate::recorder::MarkerRecorder;
use crate::scene::Scene;

#[derive(Clone, Debug)]
pub struct RunSettings {
    pub config: ControllerConfig,
    pub scene: Scene,
    pub trials: usize,
    pub threads: Option<usize>,
    pub record: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TrialOutcome {
    pub seed: u64,
    pub collided: bool,
    pub steps: usize,
    pub final_state: [f64; 4],
    pub error: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub trials: usize,
    pub failures: usize,
    pub success_rate: f64,
    pub mean_error: f64,
    pub outcomes: Vec<TrialOutcome>,
}

#[cfg(feature = "parallel")]
fn backend_for(settings: &RunSettings) -> Result<Backend> {
    match (settings.threads, settings.config.target) {
        (Some(threads), compute::ExecutionTarget::Parallel) => Ok(Backend::Parallel(
            compute::ParallelBackend::with_threads(threads)?,
        )),
        _ => Ok(Backend::for_target(settings.config.target)?),
    }
}

#[cfg(not(feature = "parallel"))]
fn backend_for(settings: &RunSettings) -> Result<Backend> {
    if settings.threads.is_some() {
        tracing::warn!("--threads ignored: built without the `parallel` feature");
    }
    Ok(Backend::for_target(settings.config.target)?)
}

/// Runs every trial and logs the success rate.
///
/// # Errors
///
/// Returns controller, backend or recorder errors; collisions are reported
/// in the result, not as errors.
#[allow(clippy::cast_precision_loss)]
pub fn run(settings: &RunSettings) -> Result<RunReport> {
    let obs = settings.scene.observation();
    let backend = backend_for(settings)?;
    let collision = CollisionEvaluator::new(
        settings.config.border_radius,
        decode_obstacles(&obs, settings.config.box_radius)?,
        settings.config.tuning.collision_penalty,
    );

    tracing::info!(
        "Running {} trials: {} samples, horizon {} s at dt {} on {} backend",
        settings.trials,
        settings.config.sample_count,
        settings.config.horizon,
        settings.config.dt,
        settings.config.target
    );

    let mut outcomes = Vec::with_capacity(settings.trials);
    for trial in 0..settings.trials {
        let config = ControllerConfig {
            seed: settings.config.seed.wrapping_add(trial as u64),
            ..settings.config.clone()
        };
        let mut controller = PathIntegralController::with_backend(config, backend.clone())?;
        let mut recorder = match (&settings.record, trial) {
            (Some(path), 0) => Some(
                MarkerRecorder::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?,
            ),
            _ => None,
        };

        let outcome = run_trial(&mut controller, &obs, &collision, recorder.as_mut())?;
        if let Some(recorder) = recorder {
            let (frames, _) = recorder.finish().context("failed to write marker file")?;
            tracing::info!("Recorded {frames} marker frames");
        }

        if outcome.collided {
            tracing::info!("Trial {trial}: collision after {} steps", outcome.steps);
        }
        tracing::info!(
            "Trial {trial}: final state {:?}, error {:.4}",
            outcome.final_state,
            outcome.error
        );
        outcomes.push(outcome);
    }

    let failures = outcomes.iter().filter(|o| o.collided).count();
    let count = outcomes.len().max(1) as f64;
    let report = RunReport {
        trials: outcomes.len(),
        failures,
        success_rate: 1.0 - failures as f64 / count,
        mean_error: outcomes.iter().map(|o| o.error).sum::<f64>() / count,
        outcomes,
    };
    tracing::info!(
        "Success rate: {:.3} ({} of {} trials collided), mean error {:.4}",
        report.success_rate,
        report.failures,
        report.trials,
        report.mean_error
    );
    Ok(report)
}

fn run_trial(
    controller: &mut PathIntegralController,
    obs: &[f64],
    collision: &CollisionEvaluator,
    mut recorder: Option<&mut MarkerRecorder>,
) -> Result<TrialOutcome> {
    controller.reset(obs)?;
    let mut state = controller.state().unwrap_or_default();
    let mut steps = 0;
    let mut collided = false;

    // A trial applies N - 1 steps.
    for _ in 0..controller.horizon_steps().saturating_sub(1) {
        state = match recorder.as_deref_mut() {
            Some(observer) => controller.step_observed(obs, observer)?.0,
            None => controller.step(obs)?.state,
        };
        steps += 1;
        if !collision.is_admissible(state.x, state.y) {
            collided = true;
            break;
        }
    }

    Ok(TrialOutcome {
        seed: controller.config().seed,
        collided,
        steps,
        final_state: state_array(&state),
        error: state.position_norm(),
    })
}

fn state_array(state: &State) -> [f64; 4] {
    [state.x, state.y, state.v, state.theta]
}
