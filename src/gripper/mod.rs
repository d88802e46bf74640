//! Gripper capability interface
//!
//! Grippers are plugged in behind the [`Gripper`] trait rather than sharing
//! a base implementation, so a new gripper kind only has to provide the
//! capability set the controller drives: load, attach, move, open, close,
//! grip, detach.

pub mod error;
pub mod two_finger;

pub use error::{GripperError, GripperResult};
pub use two_finger::TwoFingerGripper;

use crate::physics::{BodyHandle, PhysicsBackend};
use nalgebra::Vector3;

/// Capability interface the grasp controller drives.
///
/// All actuation goes through the backend passed to each call; the gripper
/// only owns its handles and commanded state.
pub trait Gripper {
    /// Load the gripper body into the world and put its joints into the
    /// starting configuration.
    fn load(&mut self, backend: &mut dyn PhysicsBackend) -> GripperResult<()>;

    /// Pin the gripper to the world with a fixed constraint at `offset`.
    /// Must be called after [`Gripper::load`]; required before any motion.
    fn attach_fixed(
        &mut self,
        backend: &mut dyn PhysicsBackend,
        offset: Vector3<f64>,
    ) -> GripperResult<()>;

    /// Command the constraint to a new height and yaw. Fails with
    /// [`GripperError::NotAttached`] before attachment, without touching
    /// the backend.
    fn move_to(&mut self, backend: &mut dyn PhysicsBackend, z: f64, yaw: f64) -> GripperResult<()>;

    /// Open the fingers gently
    fn open(&mut self, backend: &mut dyn PhysicsBackend) -> GripperResult<()>;

    /// Close the fingers gently
    fn close(&mut self, backend: &mut dyn PhysicsBackend) -> GripperResult<()>;

    /// Command both fingers toward `target` with the given force and
    /// velocity cap. Used for the strong grasp closure and the per-tick
    /// hold during lifting.
    fn set_grip(
        &mut self,
        backend: &mut dyn PhysicsBackend,
        target: f64,
        force: f64,
        max_velocity: f64,
    ) -> GripperResult<()>;

    /// Release the constraint. Idempotent: detaching an unattached gripper
    /// is a no-op, so every exit path can call it.
    fn detach(&mut self, backend: &mut dyn PhysicsBackend) -> GripperResult<()>;

    /// Body handle, once loaded
    fn body(&self) -> Option<BodyHandle>;

    /// Whether a constraint is currently held
    fn is_attached(&self) -> bool;

    /// Last commanded constraint height
    fn current_height(&self) -> f64;
}
