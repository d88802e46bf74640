//! Core data types for the grasp data generator

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Gripper orientation as Euler angles in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Inverted-gripper orientation: roll is fixed to π, pitch and yaw
    /// come from the approach geometry.
    pub fn inverted(pitch: f64, yaw: f64) -> Self {
        Self {
            roll: PI,
            pitch,
            yaw,
        }
    }

    /// Yaw-only orientation used for constraint targets during motion.
    pub fn yaw_only(yaw: f64) -> Self {
        Self {
            roll: 0.0,
            pitch: 0.0,
            yaw,
        }
    }
}

/// Candidate gripper pose: sampled position plus solved approach orientation.
///
/// Immutable once constructed; the sampler and orientation solver are the
/// only producers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    position: Vector3<f64>,
    orientation: EulerAngles,
}

impl Pose {
    pub fn new(position: Vector3<f64>, orientation: EulerAngles) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn orientation(&self) -> EulerAngles {
        self.orientation
    }
}

/// Object shapes available for simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectShape {
    Cube,
    Cylinder,
}

impl ObjectShape {
    /// Body descriptor handed to the physics backend.
    pub fn descriptor(&self) -> &'static str {
        match self {
            ObjectShape::Cube => "cube_small.urdf",
            ObjectShape::Cylinder => "cylinder_small.urdf",
        }
    }
}

/// Target object the gripper attempts to pick up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetObject {
    pub shape: ObjectShape,
    pub position: Vector3<f64>,
    /// Height at which the fingers should close around the object
    pub grasp_height: f64,
}

impl TargetObject {
    pub fn new(shape: ObjectShape, position: Vector3<f64>, grasp_height: f64) -> Self {
        Self {
            shape,
            position,
            grasp_height,
        }
    }
}

/// One grasp attempt: the pose that was tried and its judged outcome.
///
/// `success` stays `None` until the controller has run the full script and
/// read the object's final height back from the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraspAttempt {
    pub pose: Pose,
    pub success: Option<bool>,
}

impl GraspAttempt {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            success: None,
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }
}
