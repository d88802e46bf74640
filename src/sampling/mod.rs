//! Candidate pose generation
//!
//! Two stages: [`PoseSampler`] draws noisy positions on a hemisphere around
//! the object, [`OrientationSolver`] turns each position into the
//! roll/pitch/yaw the gripper must assume to approach it.

pub mod error;
pub mod orientation;
pub mod sampler;

pub use error::{GeometryError, GeometryResult};
pub use orientation::OrientationSolver;
pub use sampler::PoseSampler;
