//! Physics backend error types

use std::fmt;

/// Errors reported by a physics backend.
///
/// Backend failures are never recovered locally; they propagate and abort
/// the current grasp attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Body handle does not name a loaded body
    InvalidBody { id: u32 },
    /// Constraint handle does not name a live constraint
    InvalidConstraint { id: u32 },
    /// Body descriptor could not be loaded
    LoadFailure { descriptor: String, details: String },
    /// Failure inside the simulation step itself
    Simulation { details: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::InvalidBody { id } => {
                write!(f, "invalid body handle {}", id)
            }
            BackendError::InvalidConstraint { id } => {
                write!(f, "invalid constraint handle {}", id)
            }
            BackendError::LoadFailure { descriptor, details } => {
                write!(f, "failed to load body '{}': {}", descriptor, details)
            }
            BackendError::Simulation { details } => {
                write!(f, "simulation step failed: {}", details)
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
