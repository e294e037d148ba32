use std::path::Path;
use std::process::{Command, Output};

fn run_main(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_runtime_main"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to launch runtime_main")
}

const SMALL_RUN: &[&str] = &[
    "--trials", "2", "--samples", "64", "--horizon", "1.0", "--target", "cpu",
];

#[test]
fn test_runtime_main_executes_successfully() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_main(&[SMALL_RUN, &["--report", "report.json"]].concat(), dir.path());
    assert!(
        output.status.success(),
        "runtime_main failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["trials"], 2);
    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["seed"], 0);
    assert_eq!(outcomes[1]["seed"], 1);
    for outcome in outcomes {
        // Horizon of 10 steps, 9 applied unless the agent collides first.
        assert!(outcome["steps"].as_u64().unwrap() <= 9);
    }
    let rate = report["success_rate"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&rate));
}

#[test]
fn records_marker_frames_for_the_first_trial() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_main(&[SMALL_RUN, &["--record", "markers.bin"]].concat(), dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let bytes = std::fs::read(dir.path().join("markers.bin")).unwrap();
    let first_count = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
    assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 0);
    // 11 path states per sample at step 0.
    assert_eq!(first_count, 11 * 64);
    assert!(bytes.len() >= 8 + first_count * 12);
}

#[test]
fn reads_config_file_and_applies_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let config = serde_json::json!({
        "dt": 0.1,
        "horizon": 0.5,
        "sample_count": 16,
        "target": "sequential",
        "seed": 40,
        "tuning": { "damp_position": true }
    });
    std::fs::write(dir.path().join("pic.json"), config.to_string()).unwrap();

    let output = run_main(
        &["--config", "pic.json", "--trials", "1", "--seed", "7", "--report", "out.json"],
        dir.path(),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("out.json")).unwrap())
            .unwrap();
    assert_eq!(report["outcomes"][0]["seed"], 7);
    assert!(report["outcomes"][0]["steps"].as_u64().unwrap() <= 4);
}

#[test]
fn invalid_configuration_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_main(&["--trials", "1", "--dt", "0"], dir.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid controller configuration"), "stderr: {stderr}");
}

#[test]
fn custom_scene_obstacles_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_main(
        &[SMALL_RUN, &["--start", "-3,2", "--obstacle", "0,1", "--obstacle", "-1.5,-1"]].concat(),
        dir.path(),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}
