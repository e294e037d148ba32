//! # Observation Codec
//!
//! Decodes the flat observation vector produced by the simulator into the
//! controller's internal [`State`] and the list of [`Obstacle`]s.
//!
//! | offset | field |
//! |---|---|
//! | 0, 1, 2 | agent position (z unused) |
//! | 3 | heading |
//! | 4, 5, 6 | linear velocity (speed is the norm of x, y) |
//! | 7, 8, 9 | angular velocity (unused) |
//! | 10 + 3k .. 10 + 3k + 2 | k-th obstacle center (z unused) |

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, Result};

pub const POS_X: usize = 0;
pub const POS_Y: usize = 1;
pub const HEADING: usize = 3;
pub const LIN_VEL_X: usize = 4;
pub const LIN_VEL_Y: usize = 5;
/// Length of the fixed observation prefix before the obstacle tail.
pub const OBSERVATION_PREFIX: usize = 10;
/// Scalars per obstacle pose in the tail.
pub const OBSTACLE_STRIDE: usize = 3;

/// Planar agent state: position, speed and heading.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct State {
    pub x: f64,
    pub y: f64,
    pub v: f64,
    pub theta: f64,
}

impl State {
    #[must_use]
    pub const fn new(x: f64, y: f64, v: f64, theta: f64) -> Self {
        Self { x, y, v, theta }
    }

    #[must_use]
    pub const fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    #[must_use]
    pub fn position_norm_sq(&self) -> f64 {
        self.x.mul_add(self.x, self.y * self.y)
    }

    #[must_use]
    pub fn position_norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.v.is_finite() && self.theta.is_finite()
    }
}

/// Axis-aligned square obstacle.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: [f64; 2],
    pub half_width: f64,
}

impl Obstacle {
    #[must_use]
    pub const fn new(center: [f64; 2], half_width: f64) -> Self {
        Self { center, half_width }
    }

    /// True when `(x, y)` lies inside the square or on its boundary.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let [cx, cy] = self.center;
        let r = self.half_width;
        (cx - r..=cx + r).contains(&x) && (cy - r..=cy + r).contains(&y)
    }

    /// Corners in the order (−,−), (−,+), (+,−), (+,+).
    #[must_use]
    pub fn corners(&self) -> [[f64; 2]; 4] {
        let [cx, cy] = self.center;
        let r = self.half_width;
        [
            [cx - r, cy - r],
            [cx - r, cy + r],
            [cx + r, cy - r],
            [cx + r, cy + r],
        ]
    }
}

fn require_prefix(obs: &[f64]) -> Result<()> {
    if obs.len() < OBSERVATION_PREFIX {
        return Err(ControlError::ObservationTooShort {
            len: obs.len(),
            required: OBSERVATION_PREFIX,
        });
    }
    Ok(())
}

/// Decodes `(x, y, speed, heading)` from an observation.
///
/// # Errors
///
/// [`ControlError::ObservationTooShort`] if the fixed prefix is incomplete.
pub fn decode_state(obs: &[f64]) -> Result<State> {
    require_prefix(obs)?;
    Ok(State {
        x: obs[POS_X],
        y: obs[POS_Y],
        v: obs[LIN_VEL_X].hypot(obs[LIN_VEL_Y]),
        theta: obs[HEADING],
    })
}

/// Number of obstacle triples in the observation tail.
///
/// # Errors
///
/// Fails if the prefix is incomplete or the tail is not a multiple of three.
pub fn obstacle_count(obs: &[f64]) -> Result<usize> {
    require_prefix(obs)?;
    let tail = obs.len() - OBSERVATION_PREFIX;
    if tail % OBSTACLE_STRIDE != 0 {
        return Err(ControlError::ObstacleLayout { tail });
    }
    Ok(tail / OBSTACLE_STRIDE)
}

/// Decodes every obstacle center, giving each square the same half-width.
///
/// # Errors
///
/// Same conditions as [`obstacle_count`].
pub fn decode_obstacles(obs: &[f64], half_width: f64) -> Result<Vec<Obstacle>> {
    obstacle_count(obs)?;
    Ok(obs[OBSERVATION_PREFIX..]
        .chunks_exact(OBSTACLE_STRIDE)
        .map(|pose| Obstacle::new([pose[0], pose[1]], half_width))
        .collect())
}

/// Builds observation vectors in the simulator's layout.
#[derive(Clone, Debug)]
pub struct ObservationBuilder {
    data: Vec<f64>,
}

impl Default for ObservationBuilder {
    fn default() -> Self {
        Self { data: vec![0.0; OBSERVATION_PREFIX] }
    }
}

impl ObservationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.data[POS_X] = x;
        self.data[POS_Y] = y;
        self
    }

    #[must_use]
    pub fn heading(mut self, heading: f64) -> Self {
        self.data[HEADING] = heading;
        self
    }

    #[must_use]
    pub fn linear_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.data[LIN_VEL_X] = vx;
        self.data[LIN_VEL_Y] = vy;
        self
    }

    #[must_use]
    pub fn obstacle(mut self, x: f64, y: f64) -> Self {
        self.data.extend_from_slice(&[x, y, 0.0]);
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<f64> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_span_the_square() {
        let corners = Obstacle::new([-2.0, 1.0], 0.5).corners();
        assert_eq!(corners[0], [-2.5, 0.5]);
        assert_eq!(corners[3], [-1.5, 1.5]);
    }

    #[test]
    fn obstacle_boundary_counts_as_inside() {
        let ob = Obstacle::new([0.0, 0.0], 1.0);
        assert!(ob.contains(1.0, -1.0));
        assert!(!ob.contains(1.0 + 1e-9, 0.0));
    }
}
