#![deny(clippy::all, clippy::pedantic)]
//! # Navigation Runtime
//!
//! Headless driver for the path-integral controller. Runs a batch of
//! independent trials of the obstacle-avoidance scene, reports the success
//! rate, and can record the sampled trajectories of the first trial as
//! marker points for an external visualizer.
//!
//! ```text
//! runtime_main --trials 20 --samples 2000 --record markers.bin
//! RUST_LOG=control=debug runtime_main --trials 1 --target cpu
//! ```

mod app;
mod recorder;
mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use compute::ExecutionTarget;
use control::ControllerConfig;

use crate::app::RunSettings;
use crate::scene::{parse_point, Scene};

#[derive(Parser, Debug)]
#[command(name = "runtime_main")]
#[command(about = "Drive the path-integral navigation controller through repeated trials")]
struct Cli {
    /// JSON controller configuration; command-line flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of independent trials
    #[arg(long, default_value_t = 100)]
    trials: usize,
    /// Rollout samples per step
    #[arg(long)]
    samples: Option<usize>,
    /// Step duration in seconds
    #[arg(long)]
    dt: Option<f64>,
    /// Horizon duration in seconds
    #[arg(long)]
    horizon: Option<f64>,
    /// Base seed; trial k uses seed + k
    #[arg(long)]
    seed: Option<u64>,
    /// Execution target: cpu or parallel
    #[arg(long)]
    target: Option<ExecutionTarget>,
    /// Worker threads for the parallel target (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
    /// Obstacle half-width
    #[arg(long)]
    box_radius: Option<f64>,
    /// Agent start position as x,y
    #[arg(long, value_parser = parse_point, default_value = "3,3", allow_hyphen_values = true)]
    start: [f64; 2],
    /// Obstacle center as x,y; repeatable
    #[arg(long = "obstacle", value_parser = parse_point, allow_hyphen_values = true)]
    obstacles: Vec<[f64; 2]>,
    /// Write the first trial's sample markers to this file
    #[arg(long)]
    record: Option<PathBuf>,
    /// Write the run summary as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn controller_config(&self) -> Result<ControllerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => ControllerConfig::navigation_scenario(),
        };
        if let Some(samples) = self.samples {
            config.sample_count = samples;
        }
        if let Some(dt) = self.dt {
            config.dt = dt;
        }
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(box_radius) = self.box_radius {
            config.box_radius = box_radius;
        }
        config.validate().context("invalid controller configuration")?;
        Ok(config)
    }

    fn scene(&self) -> Scene {
        let obstacles = if self.obstacles.is_empty() {
            vec![[-2.0, -2.0]]
        } else {
            self.obstacles.clone()
        };
        Scene { start: self.start, obstacles }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = RunSettings {
        config: cli.controller_config()?,
        scene: cli.scene(),
        trials: cli.trials,
        threads: cli.threads,
        record: cli.record.clone(),
    };

    let report = app::run(&settings)?;
    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }
    Ok(())
}
