//! Geometry error types for pose sampling and orientation solving

use nalgebra::Vector3;
use std::fmt;

/// Geometry errors raised while deriving an approach orientation
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The final approach vector between the approach point and the biased
    /// target had zero length, so pitch and yaw are undefined. Reachable only
    /// when the approach point coincides with the offset target; failing fast
    /// keeps NaN orientations out of the dataset.
    DegenerateDirection {
        approach: Vector3<f64>,
        target: Vector3<f64>,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::DegenerateDirection { approach, target } => {
                write!(
                    f,
                    "degenerate approach direction: approach point ({:.4}, {:.4}, {:.4}) coincides with target ({:.4}, {:.4}, {:.4})",
                    approach.x, approach.y, approach.z, target.x, target.y, target.z
                )
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Result type for geometry operations
pub type GeometryResult<T> = Result<T, GeometryError>;
