//! Gripper actuation error types

use crate::physics::BackendError;
use std::fmt;

/// Errors raised by gripper operations
#[derive(Debug, Clone, PartialEq)]
pub enum GripperError {
    /// Operation requires the gripper to be loaded and attached first.
    /// Fatal for the current attempt; the caller must not retry.
    NotAttached { operation: &'static str },
    /// The physics backend rejected a command
    Backend { source: BackendError },
}

impl fmt::Display for GripperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GripperError::NotAttached { operation } => {
                write!(f, "gripper must be attached before '{}'", operation)
            }
            GripperError::Backend { source } => {
                write!(f, "backend error: {}", source)
            }
        }
    }
}

impl std::error::Error for GripperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GripperError::Backend { source } => Some(source),
            _ => None,
        }
    }
}

impl From<BackendError> for GripperError {
    fn from(source: BackendError) -> Self {
        GripperError::Backend { source }
    }
}

/// Result type for gripper operations
pub type GripperResult<T> = Result<T, GripperError>;
