// End-to-end runs of the obstacle-avoidance scenario: agent at (3, 3),
// heading 0, at rest, one obstacle at (-2, -2) inside a border of 5.

mod common;

use common::scenario_observation;
use control::{
    decode_obstacles, CollisionEvaluator, ControllerConfig, ObservationBuilder,
    PathIntegralController,
};

fn drive(config: ControllerConfig, obs: &[f64]) -> (f64, bool) {
    let collision = CollisionEvaluator::new(
        config.border_radius,
        decode_obstacles(obs, config.box_radius).unwrap(),
        config.tuning.collision_penalty,
    );
    let mut controller = PathIntegralController::new(config).unwrap();
    controller.reset(obs).unwrap();

    let mut collided = false;
    let mut state = controller.state().unwrap();
    for _ in 0..controller.horizon_steps() - 1 {
        let out = controller.step(obs).unwrap();
        state = out.state;
        assert!(state.is_finite());
        assert!(out.stats.effective_samples >= 1.0 - 1e-9);
        if !collision.is_admissible(state.x, state.y) {
            collided = true;
            break;
        }
    }
    (state.position_norm(), collided)
}

#[test]
fn agent_approaches_origin_without_touching_the_obstacle() {
    let initial = 3.0 * 2.0_f64.sqrt();
    for seed in [0, 1] {
        let config = ControllerConfig {
            sample_count: 500,
            seed,
            ..ControllerConfig::navigation_scenario()
        };
        let (final_norm, collided) = drive(config, &scenario_observation());
        assert!(!collided, "seed {seed}: real path entered an obstacle or left the border");
        assert!(final_norm < initial, "seed {seed}: final norm {final_norm} >= {initial}");
    }
}

#[test]
fn unconstrained_regulator_reduces_distance() {
    let obs = ObservationBuilder::new().position(3.0, 3.0).build();
    let config = ControllerConfig {
        sample_count: 300,
        box_radius: 0.0,
        seed: 3,
        ..ControllerConfig::navigation_scenario()
    };
    let (final_norm, collided) = drive(config, &obs);
    assert!(!collided);
    assert!(final_norm < 3.0 * 2.0_f64.sqrt() / 2.0, "final norm {final_norm}");
}
