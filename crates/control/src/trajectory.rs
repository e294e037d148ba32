//! Read-only access to the sampled trajectory batch for diagnostics and
//! visualization.

use crate::observation::State;

/// The rollout batch from one step to the end of the horizon.
///
/// Step `0` of the view is the horizon step the batch was computed from, so
/// every sample's first state equals the real state at that time.
#[derive(Clone, Copy, Debug)]
pub struct TrajectoryView<'a> {
    states: &'a [State],
    path_len: usize,
    first_step: usize,
}

impl<'a> TrajectoryView<'a> {
    /// `states` holds one contiguous path of `path_len` states per sample.
    pub(crate) fn new(states: &'a [State], path_len: usize, first_step: usize) -> Self {
        debug_assert!(first_step < path_len);
        Self { states, path_len, first_step }
    }

    /// Absolute horizon index of the view's first step.
    #[must_use]
    pub fn first_step(&self) -> usize {
        self.first_step
    }

    /// Steps covered, including the pinned initial state.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.path_len - self.first_step
    }

    #[must_use]
    pub fn samples(&self) -> usize {
        self.states.len() / self.path_len
    }

    /// State of `sample` at view step `step`.
    #[must_use]
    pub fn state(&self, step: usize, sample: usize) -> &'a State {
        &self.sample_path(sample)[step]
    }

    #[must_use]
    pub fn sample_path(&self, sample: usize) -> &'a [State] {
        let start = sample * self.path_len;
        &self.states[start + self.first_step..start + self.path_len]
    }

    /// Every sampled position as an `(x, y, height)` marker, step-major.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn marker_points(&self, height: f32) -> Vec<[f32; 3]> {
        let mut points = Vec::with_capacity(self.steps() * self.samples());
        for step in 0..self.steps() {
            for sample in 0..self.samples() {
                let s = self.state(step, sample);
                points.push([s.x as f32, s.y as f32, height]);
            }
        }
        points
    }

    /// [`marker_points`](Self::marker_points) as native-endian `f32` bytes.
    #[must_use]
    pub fn to_bytes(&self, height: f32) -> Vec<u8> {
        bytemuck::cast_slice(&self.marker_points(height)).to_vec()
    }
}

/// External consumer of the per-step trajectory batch.
pub trait TrajectoryObserver {
    /// Called after horizon step `step` has been applied.
    fn observe(&mut self, step: usize, samples: &TrajectoryView<'_>);
}
