//! Seeded Gaussian noise for rollouts and the realized disturbance.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// One 2-D standard normal draw, (speed channel, heading channel).
pub type Noise = [f64; 2];

/// Generator owned by a single controller instance.
#[derive(Clone, Debug)]
pub struct NoiseSource {
    rng: StdRng,
}

impl NoiseSource {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn standard_pair(&mut self) -> Noise {
        [
            StandardNormal.sample(&mut self.rng),
            StandardNormal.sample(&mut self.rng),
        ]
    }

    /// A fresh sequence of `steps` draws.
    pub fn trajectory(&mut self, steps: usize) -> Vec<Noise> {
        (0..steps).map(|_| self.standard_pair()).collect()
    }

    /// Redraws `batch` for `samples` rollouts of `steps` steps each.
    ///
    /// # Panics
    ///
    /// If the batch exceeds `isize::MAX` bytes.
    pub fn fill_batch(&mut self, batch: &mut NoiseBatch, samples: usize, steps: usize) {
        batch.steps = steps;
        batch.data.clear();
        batch.data.reserve(samples.saturating_mul(steps));
        for _ in 0..samples {
            for _ in 0..steps {
                let pair = self.standard_pair();
                batch.data.push(pair);
            }
        }
    }
}

/// Optimization noise for one rollout batch, stored sample-major.
#[derive(Clone, Debug, Default)]
pub struct NoiseBatch {
    data: Vec<Noise>,
    steps: usize,
}

impl NoiseBatch {
    /// Steps covered per sample.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[must_use]
    pub fn samples(&self) -> usize {
        if self.steps == 0 {
            0
        } else {
            self.data.len() / self.steps
        }
    }

    /// Noise sequence of one sample.
    #[must_use]
    pub fn sample(&self, sample: usize) -> &[Noise] {
        &self.data[sample * self.steps..(sample + 1) * self.steps]
    }

    /// Per-sample sequences in sample order.
    pub fn per_sample(&self) -> impl Iterator<Item = &[Noise]> {
        self.data.chunks_exact(self.steps.max(1))
    }

    /// First-step draw of every sample, the perturbations the control law
    /// averages over.
    pub fn first_steps(&self) -> impl Iterator<Item = Noise> + '_ {
        self.per_sample().map(|seq| seq[0])
    }
}
