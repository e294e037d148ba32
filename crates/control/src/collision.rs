//! # Collision Evaluator
//!
//! Decides whether sampled positions lie in the free region (strictly inside
//! the outer border, outside every obstacle square) and charges the one-time
//! penalty on the step a sample is absorbed. The evaluator is stateless: the
//! caller owns the active flags and threads them through every call.

use crate::observation::Obstacle;

#[derive(Clone, Debug, PartialEq)]
pub struct CollisionEvaluator {
    border_radius: f64,
    obstacles: Vec<Obstacle>,
    penalty: f64,
}

impl CollisionEvaluator {
    #[must_use]
    pub fn new(border_radius: f64, obstacles: Vec<Obstacle>, penalty: f64) -> Self {
        Self { border_radius, obstacles, penalty }
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[must_use]
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// True iff `(x, y)` is strictly inside the border and outside every
    /// obstacle square (obstacle boundaries are blocked).
    #[must_use]
    pub fn is_admissible(&self, x: f64, y: f64) -> bool {
        let b = self.border_radius;
        let inside_border = -b < x && x < b && -b < y && y < b;
        inside_border && !self.obstacles.iter().any(|ob| ob.contains(x, y))
    }

    /// Flag transition for a single sample.
    ///
    /// Returns the new active flag and the penalty to add, which is non-zero
    /// only when an active sample lands outside the free region.
    #[must_use]
    pub fn transition(&self, position: [f64; 2], active: bool) -> (bool, f64) {
        if !active {
            return (false, 0.0);
        }
        if self.is_admissible(position[0], position[1]) {
            (true, 0.0)
        } else {
            (false, self.penalty)
        }
    }

    /// Batch form of [`transition`](Self::transition).
    ///
    /// `positions` and `active` are indexed by sample and must have the same
    /// length.
    #[must_use]
    pub fn evaluate(&self, positions: &[[f64; 2]], active: &[bool]) -> (Vec<bool>, Vec<f64>) {
        debug_assert_eq!(positions.len(), active.len());
        positions
            .iter()
            .zip(active)
            .map(|(&p, &flag)| self.transition(p, flag))
            .unzip()
    }
}
