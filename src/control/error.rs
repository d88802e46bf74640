//! Grasp execution error taxonomy

use crate::gripper::GripperError;
use crate::physics::BackendError;
use crate::sampling::GeometryError;
use std::fmt;

/// Errors that abort a grasp attempt.
///
/// None of these are retried: a precondition violation is a programming
/// error, degenerate geometry invalidates the pose, and backend failures
/// are outside the generator's control.
#[derive(Debug, Clone, PartialEq)]
pub enum GraspError {
    /// An actuation command was issued on an unattached gripper
    NotAttached { operation: &'static str },
    /// The pose admits no well-defined approach orientation
    Geometry { source: GeometryError },
    /// The physics backend failed
    Backend { source: BackendError },
}

impl fmt::Display for GraspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraspError::NotAttached { operation } => {
                write!(f, "precondition violation: '{}' on unattached gripper", operation)
            }
            GraspError::Geometry { source } => {
                write!(f, "geometry error: {}", source)
            }
            GraspError::Backend { source } => {
                write!(f, "backend error: {}", source)
            }
        }
    }
}

impl std::error::Error for GraspError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraspError::Geometry { source } => Some(source),
            GraspError::Backend { source } => Some(source),
            _ => None,
        }
    }
}

impl From<GeometryError> for GraspError {
    fn from(source: GeometryError) -> Self {
        GraspError::Geometry { source }
    }
}

impl From<BackendError> for GraspError {
    fn from(source: BackendError) -> Self {
        GraspError::Backend { source }
    }
}

impl From<GripperError> for GraspError {
    fn from(error: GripperError) -> Self {
        match error {
            GripperError::NotAttached { operation } => GraspError::NotAttached { operation },
            GripperError::Backend { source } => GraspError::Backend { source },
        }
    }
}

/// Result type for grasp execution
pub type GraspResult<T> = Result<T, GraspError>;
