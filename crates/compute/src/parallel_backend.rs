use crate::{ComputeBackend, ComputeError};
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

/// Lanes handed to a single rayon task at minimum.
const MIN_LANES_PER_TASK: usize = 64;

/// Runs lanes on rayon's work-stealing pool.
///
/// Uses the global pool unless built with [`ParallelBackend::with_threads`].
#[derive(Default, Clone)]
pub struct ParallelBackend {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ParallelBackend {
    #[must_use]
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Builds a backend with a dedicated pool of `threads` workers.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::ThreadPool`] if rayon cannot spawn the pool.
    pub fn with_threads(threads: usize) -> Result<Self, ComputeError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("compute-{i}"))
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;
        tracing::debug!("Built dedicated compute pool with {} threads", pool.current_num_threads());
        Ok(Self { pool: Some(Arc::new(pool)) })
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads())
    }
}

impl fmt::Debug for ParallelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelBackend")
            .field("threads", &self.threads())
            .field("dedicated_pool", &self.pool.is_some())
            .finish()
    }
}

impl ComputeBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn map_lanes<T, K>(&self, lanes: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(usize, &mut T) + Send + Sync,
    {
        let mut run = || {
            lanes
                .par_iter_mut()
                .with_min_len(MIN_LANES_PER_TASK)
                .enumerate()
                .for_each(|(index, lane)| kernel(index, lane));
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CpuBackend;

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn matches_cpu_backend_bit_for_bit() {
        let input: Vec<f64> = (0..1000).map(|i| f64::from(i) * 0.37).collect();
        let kernel = |i: usize, x: &mut f64| {
            *x = (*x).sin() * (i as f64).sqrt() + (*x * 0.01).exp();
        };

        let mut sequential = input.clone();
        CpuBackend::new().map_lanes(&mut sequential, kernel);
        let mut parallel = input;
        ParallelBackend::new().map_lanes(&mut parallel, kernel);

        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn dedicated_pool_reports_thread_count() {
        let backend = ParallelBackend::with_threads(2).unwrap();
        assert_eq!(backend.threads(), 2);
        let mut lanes = vec![1u32; 300];
        backend.map_lanes(&mut lanes, |i, lane| *lane += u32::try_from(i).unwrap());
        assert_eq!(lanes[299], 300);
    }
}
