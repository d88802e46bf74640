//! Physics backend trait and handle types

use crate::core::{EulerAngles, SIM_TIMESTEP_S};
use crate::physics::error::BackendResult;
use nalgebra::Vector3;

/// Opaque handle to a rigid body owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(u32);

impl BodyHandle {
    pub fn new(id: u32) -> Self {
        BodyHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Opaque handle to a fixed constraint owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintHandle(u32);

impl ConstraintHandle {
    pub fn new(id: u32) -> Self {
        ConstraintHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Abstraction over the rigid-body simulator.
///
/// The generator only issues commands and reads body state back; contact and
/// friction resolution, constraint solving and integration all live behind
/// this trait. Joint actuation is position-controlled: the backend drives
/// each commanded joint toward its target, limited by the given force and
/// velocity caps.
pub trait PhysicsBackend {
    /// Load a rigid body from a descriptor (e.g. a URDF name) at a world
    /// position.
    fn load_body(&mut self, descriptor: &str, position: Vector3<f64>) -> BackendResult<BodyHandle>;

    /// Pin a body to the world with a fixed constraint. The constraint's
    /// child frame starts at `child_frame`; moving the constraint target
    /// drags the body along.
    fn create_fixed_constraint(
        &mut self,
        body: BodyHandle,
        parent_offset: Vector3<f64>,
        child_frame: Vector3<f64>,
    ) -> BackendResult<ConstraintHandle>;

    /// Retarget a fixed constraint. The backend pulls the constrained body
    /// toward the target with at most `max_force`.
    fn update_constraint(
        &mut self,
        constraint: ConstraintHandle,
        target_position: Vector3<f64>,
        target_orientation: EulerAngles,
        max_force: f64,
    ) -> BackendResult<()>;

    /// Command one joint to a position target under force and velocity caps.
    fn set_joint_target(
        &mut self,
        body: BodyHandle,
        joint: usize,
        target: f64,
        max_force: f64,
        max_velocity: f64,
    ) -> BackendResult<()>;

    /// Set contact friction coefficients on a body's base link.
    fn set_friction(
        &mut self,
        body: BodyHandle,
        lateral: f64,
        rolling: f64,
        spinning: f64,
    ) -> BackendResult<()>;

    /// Overwrite a joint's state directly. Setup only, bypasses dynamics.
    fn reset_joint_state(
        &mut self,
        body: BodyHandle,
        joint: usize,
        value: f64,
    ) -> BackendResult<()>;

    /// Destroy a constraint, releasing the body.
    fn remove_constraint(&mut self, constraint: ConstraintHandle) -> BackendResult<()>;

    /// Clear all bodies and constraints, returning the world to its empty
    /// state. Called between attempts; outstanding handles become invalid.
    fn reset_world(&mut self) -> BackendResult<()>;

    /// Advance the simulation by one fixed timestep.
    fn step_simulation(&mut self) -> BackendResult<()>;

    /// Current world position of a body's base.
    fn body_position(&self, body: BodyHandle) -> BackendResult<Vector3<f64>>;

    /// Fixed timestep the backend advances per step (seconds).
    fn timestep(&self) -> f64 {
        SIM_TIMESTEP_S
    }
}
