use compute::ComputeError;
use thiserror::Error;

/// Errors raised by the controller.
///
/// Precondition violations are fatal to the current episode: the caller has
/// to `reset` (or rebuild the controller) before stepping again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("observation has {len} elements, at least {required} required")]
    ObservationTooShort { len: usize, required: usize },
    #[error("obstacle tail of {tail} elements is not a whole number of (x, y, z) triples")]
    ObstacleLayout { tail: usize },
    #[error("horizon of {horizon} steps exhausted; reset before stepping again")]
    HorizonExhausted { horizon: usize },
    #[error("controller stepped before the first reset")]
    NotInitialized,
    #[error("degenerate control estimate: {0}")]
    Degenerate(String),
    #[error(transparent)]
    Backend(#[from] ComputeError),
}

impl ControlError {
    /// True for caller protocol and input violations.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::ObservationTooShort { .. }
                | Self::ObstacleLayout { .. }
                | Self::HorizonExhausted { .. }
                | Self::NotInitialized
        )
    }

    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig { field, reason: reason.into() }
    }
}

pub type Result<T, E = ControlError> = std::result::Result<T, E>;
