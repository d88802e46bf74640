//! Approach orientation solving
//!
//! The gripper descends from above, but its target is biased laterally away
//! from the object center by a fixed offset so that the closing fingers
//! straddle the object instead of landing on top of it. Pitch and yaw fall
//! out of the resulting approach vector; roll is always π (inverted gripper).

use crate::core::{EulerAngles, DEFAULT_APPROACH_Z_OFFSET, DEFAULT_LATERAL_OFFSET};
use crate::sampling::error::{GeometryError, GeometryResult};
use nalgebra::Vector3;

/// Derives the gripper orientation for a sampled position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSolver {
    approach_z_offset: f64,
    lateral_offset: f64,
}

impl Default for OrientationSolver {
    fn default() -> Self {
        Self {
            approach_z_offset: DEFAULT_APPROACH_Z_OFFSET,
            lateral_offset: DEFAULT_LATERAL_OFFSET,
        }
    }
}

impl OrientationSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_approach_z_offset(mut self, offset: f64) -> Self {
        self.approach_z_offset = offset;
        self
    }

    pub fn with_lateral_offset(mut self, offset: f64) -> Self {
        self.lateral_offset = offset;
        self
    }

    /// Solve the roll/pitch/yaw the gripper must assume at
    /// `gripper_position` to approach the object with the lateral bias.
    ///
    /// A gripper exactly above the object gets a zero lateral bias (the
    /// lateral direction is undefined there) and approaches straight down.
    /// Fails with [`GeometryError::DegenerateDirection`] if the approach
    /// point coincides with the biased target, which would leave pitch and
    /// yaw undefined.
    pub fn solve(
        &self,
        gripper_position: &Vector3<f64>,
        object_position: &Vector3<f64>,
    ) -> GeometryResult<EulerAngles> {
        let approach = gripper_position + Vector3::new(0.0, 0.0, self.approach_z_offset);

        // Lateral direction from object to approach point. The z component is
        // zeroed: the bias must not depend on the height difference.
        let mut lateral = approach - object_position;
        lateral.z = 0.0;

        let offset = if lateral.norm() > f64::EPSILON {
            lateral.normalize() * self.lateral_offset
        } else {
            Vector3::zeros()
        };

        let target = object_position + offset;
        let direction = target - approach;
        let norm = direction.norm();
        if !norm.is_finite() || norm <= f64::EPSILON {
            return Err(GeometryError::DegenerateDirection { approach, target });
        }
        let direction = direction / norm;

        let pitch = (-direction.z).asin();
        let yaw = direction.y.atan2(direction.x);
        Ok(EulerAngles::inverted(pitch, yaw))
    }
}
