//! Two-finger parallel gripper

use crate::core::{
    EulerAngles, CLOSE_TARGET, FINGER_JOINTS, GENTLE_FORCE, GENTLE_MAX_VELOCITY,
    INITIAL_FINGER_POSITIONS, MOVE_MAX_FORCE, OPEN_TARGET, TWO_FINGER_DESCRIPTOR,
};
use crate::gripper::{Gripper, GripperError, GripperResult};
use crate::physics::{BodyHandle, ConstraintHandle, PhysicsBackend};
use nalgebra::Vector3;

/// Two-finger gripper actuated through joints 0 and 2.
///
/// Owns at most one live constraint; the constraint handle is created in
/// [`Gripper::attach_fixed`] and destroyed in [`Gripper::detach`].
pub struct TwoFingerGripper {
    descriptor: &'static str,
    base_position: Vector3<f64>,
    body: Option<BodyHandle>,
    constraint: Option<ConstraintHandle>,
    current_height: f64,
    current_yaw: f64,
}

impl TwoFingerGripper {
    pub fn new(base_position: Vector3<f64>) -> Self {
        Self {
            descriptor: TWO_FINGER_DESCRIPTOR,
            base_position,
            body: None,
            constraint: None,
            current_height: base_position.z,
            current_yaw: 0.0,
        }
    }

    pub fn base_position(&self) -> Vector3<f64> {
        self.base_position
    }

    pub fn current_yaw(&self) -> f64 {
        self.current_yaw
    }

    fn require_body(&self, operation: &'static str) -> GripperResult<BodyHandle> {
        self.body.ok_or(GripperError::NotAttached { operation })
    }

    fn require_constraint(&self, operation: &'static str) -> GripperResult<ConstraintHandle> {
        self.constraint.ok_or(GripperError::NotAttached { operation })
    }

    fn command_fingers(
        &self,
        backend: &mut dyn PhysicsBackend,
        target: f64,
        force: f64,
        max_velocity: f64,
    ) -> GripperResult<()> {
        let body = self.require_body("finger command")?;
        for joint in FINGER_JOINTS {
            backend.set_joint_target(body, joint, target, force, max_velocity)?;
        }
        Ok(())
    }
}

impl Gripper for TwoFingerGripper {
    fn load(&mut self, backend: &mut dyn PhysicsBackend) -> GripperResult<()> {
        let body = backend.load_body(self.descriptor, self.base_position)?;
        for (joint, &value) in INITIAL_FINGER_POSITIONS.iter().enumerate() {
            backend.reset_joint_state(body, joint, value)?;
        }
        self.body = Some(body);
        Ok(())
    }

    fn attach_fixed(
        &mut self,
        backend: &mut dyn PhysicsBackend,
        offset: Vector3<f64>,
    ) -> GripperResult<()> {
        let body = self.require_body("attach_fixed")?;
        let constraint = backend.create_fixed_constraint(body, offset, self.base_position)?;
        self.constraint = Some(constraint);
        self.current_height = self.base_position.z;
        Ok(())
    }

    fn move_to(&mut self, backend: &mut dyn PhysicsBackend, z: f64, yaw: f64) -> GripperResult<()> {
        let constraint = self.require_constraint("move_to")?;
        backend.update_constraint(
            constraint,
            Vector3::new(self.base_position.x, self.base_position.y, z),
            EulerAngles::yaw_only(yaw),
            MOVE_MAX_FORCE,
        )?;
        self.current_height = z;
        self.current_yaw = yaw;
        Ok(())
    }

    fn open(&mut self, backend: &mut dyn PhysicsBackend) -> GripperResult<()> {
        self.command_fingers(backend, OPEN_TARGET, GENTLE_FORCE, GENTLE_MAX_VELOCITY)
    }

    fn close(&mut self, backend: &mut dyn PhysicsBackend) -> GripperResult<()> {
        self.command_fingers(backend, CLOSE_TARGET, GENTLE_FORCE, GENTLE_MAX_VELOCITY)
    }

    fn set_grip(
        &mut self,
        backend: &mut dyn PhysicsBackend,
        target: f64,
        force: f64,
        max_velocity: f64,
    ) -> GripperResult<()> {
        self.command_fingers(backend, target, force, max_velocity)
    }

    fn detach(&mut self, backend: &mut dyn PhysicsBackend) -> GripperResult<()> {
        if let Some(constraint) = self.constraint.take() {
            backend.remove_constraint(constraint)?;
        }
        Ok(())
    }

    fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    fn is_attached(&self) -> bool {
        self.constraint.is_some()
    }

    fn current_height(&self) -> f64 {
        self.current_height
    }
}
