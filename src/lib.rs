//! Synthetic robotic-grasp data generator
//!
//! Samples candidate gripper poses on a noisy hemisphere around a target
//! object, derives an approach orientation for each, and drives a gripper
//! through a scripted approach, descend, close and lift sequence against a
//! pluggable physics backend, recording one `(x, y, z, roll, pitch, yaw,
//! success)` row per attempt.

pub mod control;
pub mod core;
pub mod dataset;
pub mod gripper;
pub mod physics;
pub mod sampling;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use control::{GraspController, GraspError, GraspEvent, GraspOutcome, GraspPhase, GraspScript};
pub use self::core::{EulerAngles, GraspAttempt, ObjectShape, Pose, TargetObject};
pub use dataset::{CsvFormatter, GraspDataset, GraspRecord};
pub use gripper::{Gripper, GripperError, TwoFingerGripper};
pub use physics::{
    BackendError, BodyHandle, ConstraintHandle, GraspRule, MockPhysicsBackend, PhysicsBackend,
};
pub use sampling::{GeometryError, OrientationSolver, PoseSampler};
pub use session::GraspSession;
pub use utils::config::{ConfigError, GripperKind, SimulationConfig};
