#![allow(dead_code)]

use control::{ControllerConfig, ExecutionTarget, ObservationBuilder, Tuning};

pub fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Agent at (3, 3), heading 0, at rest, one obstacle at (−2, −2).
pub fn scenario_observation() -> Vec<f64> {
    ObservationBuilder::new()
        .position(3.0, 3.0)
        .obstacle(-2.0, -2.0)
        .build()
}

/// A small configuration that keeps debug-build tests fast.
pub fn small_config(seed: u64) -> ControllerConfig {
    ControllerConfig {
        dt: 0.1,
        horizon: 2.0,
        sample_count: 128,
        target: ExecutionTarget::Cpu,
        seed,
        tuning: Tuning::default(),
        ..ControllerConfig::default()
    }
}
