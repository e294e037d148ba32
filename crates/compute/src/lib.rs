#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Compute Backends
//!
//! A thin abstraction over the strategies used to execute per-sample batch
//! work. Every controller rollout is embarrassingly parallel across samples,
//! so a backend only has to know how to run a pure kernel once per lane.
//!
//! -   [`CpuBackend`] runs lanes sequentially on the calling thread.
//! -   [`ParallelBackend`] (feature `parallel`) spreads lanes over a rayon
//!     thread pool.
//!
//! [`Backend`] wraps whichever backends were compiled in and is what callers
//! normally hold. Kernels never reduce across lanes, so all backends produce
//! bit-identical results for the same input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
mod cpu_backend;
#[cfg(feature = "parallel")]
mod parallel_backend;

pub use backend::ComputeBackend;
pub use cpu_backend::CpuBackend;
#[cfg(feature = "parallel")]
pub use parallel_backend::ParallelBackend;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("backend not available: {0}")]
    BackendUnavailable(&'static str),
    #[error("unknown execution target `{0}`")]
    UnknownTarget(String),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

/// Where batch kernels are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionTarget {
    /// Sequential execution on the calling thread.
    #[serde(alias = "sequential")]
    Cpu,
    /// Work-stealing execution across all cores.
    #[default]
    #[serde(alias = "rayon")]
    Parallel,
}

impl FromStr for ExecutionTarget {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" | "sequential" => Ok(Self::Cpu),
            "parallel" | "rayon" => Ok(Self::Parallel),
            other => Err(ComputeError::UnknownTarget(other.to_owned())),
        }
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("cpu"),
            Self::Parallel => f.write_str("parallel"),
        }
    }
}

/// The backends compiled into this build.
#[derive(Debug, Clone)]
pub enum Backend {
    Cpu(CpuBackend),
    #[cfg(feature = "parallel")]
    Parallel(ParallelBackend),
}

impl Backend {
    /// Selects the backend for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::BackendUnavailable`] when the target was
    /// compiled out.
    pub fn for_target(target: ExecutionTarget) -> Result<Self, ComputeError> {
        match target {
            ExecutionTarget::Cpu => Ok(Self::Cpu(CpuBackend::new())),
            #[cfg(feature = "parallel")]
            ExecutionTarget::Parallel => Ok(Self::Parallel(ParallelBackend::new())),
            #[cfg(not(feature = "parallel"))]
            ExecutionTarget::Parallel => Err(ComputeError::BackendUnavailable(
                "compiled without the `parallel` feature",
            )),
        }
    }

    #[must_use]
    pub fn target(&self) -> ExecutionTarget {
        match self {
            Self::Cpu(_) => ExecutionTarget::Cpu,
            #[cfg(feature = "parallel")]
            Self::Parallel(_) => ExecutionTarget::Parallel,
        }
    }
}

impl ComputeBackend for Backend {
    fn name(&self) -> &'static str {
        match self {
            Self::Cpu(b) => b.name(),
            #[cfg(feature = "parallel")]
            Self::Parallel(b) => b.name(),
        }
    }

    fn map_lanes<T, K>(&self, lanes: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(usize, &mut T) + Send + Sync,
    {
        match self {
            Self::Cpu(b) => b.map_lanes(lanes, kernel),
            #[cfg(feature = "parallel")]
            Self::Parallel(b) => b.map_lanes(lanes, kernel),
        }
    }
}

/// Returns the fastest backend compiled into this build.
#[cfg(feature = "parallel")]
#[must_use]
pub fn default_backend() -> Backend {
    tracing::debug!("Using parallel compute backend");
    Backend::Parallel(ParallelBackend::new())
}

/// Returns the fastest backend compiled into this build.
#[cfg(not(feature = "parallel"))]
#[must_use]
pub fn default_backend() -> Backend {
    tracing::debug!("Using sequential CPU compute backend");
    Backend::Cpu(CpuBackend::new())
}
