//! Mock physics backend for testing and development
//!
//! Records every command it receives so tests can assert on the exact
//! actuation sequence, and models just enough kinematics for the grasp
//! script to be meaningful: constrained bodies follow their constraint
//! targets, and an optional grasp rule couples a free body to a gripper
//! whose fingers are closed on it.

use crate::core::EulerAngles;
use crate::physics::backend::{BodyHandle, ConstraintHandle, PhysicsBackend};
use crate::physics::error::{BackendError, BackendResult};
use nalgebra::Vector3;
use std::collections::HashMap;

/// One recorded backend command
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    LoadBody {
        descriptor: String,
        position: Vector3<f64>,
    },
    CreateConstraint {
        body: BodyHandle,
    },
    UpdateConstraint {
        constraint: ConstraintHandle,
        target_position: Vector3<f64>,
        target_orientation: EulerAngles,
        max_force: f64,
    },
    SetJointTarget {
        body: BodyHandle,
        joint: usize,
        target: f64,
        max_force: f64,
        max_velocity: f64,
    },
    SetFriction {
        body: BodyHandle,
        lateral: f64,
        rolling: f64,
        spinning: f64,
    },
    ResetJointState {
        body: BodyHandle,
        joint: usize,
        value: f64,
    },
    RemoveConstraint {
        constraint: ConstraintHandle,
    },
    ResetWorld,
    Step,
}

/// Rule deciding when a closing gripper captures a nearby free body.
///
/// A gripper counts as gripping when at least two of its joints are
/// commanded to `grip_target_min` or beyond with at least `grip_force_min`.
/// The nearest unconstrained body within `capture_radius` of the gripper
/// base is then dragged along with it until the grip is released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraspRule {
    pub grip_target_min: f64,
    pub grip_force_min: f64,
    pub capture_radius: f64,
}

impl Default for GraspRule {
    fn default() -> Self {
        Self {
            grip_target_min: 0.1,
            grip_force_min: 100.0,
            capture_radius: 0.06,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct JointCommand {
    target: f64,
    max_force: f64,
}

#[derive(Debug, Clone)]
struct MockBody {
    descriptor: String,
    position: Vector3<f64>,
    joint_states: HashMap<usize, f64>,
    joint_commands: HashMap<usize, JointCommand>,
    friction: Option<(f64, f64, f64)>,
}

#[derive(Debug, Clone)]
struct MockConstraint {
    body: BodyHandle,
    target_position: Vector3<f64>,
    alive: bool,
}

#[derive(Debug, Clone, Copy)]
struct Coupling {
    leader: BodyHandle,
    follower: BodyHandle,
    offset: Vector3<f64>,
}

/// Command-recording mock backend with simple kinematics
pub struct MockPhysicsBackend {
    bodies: Vec<MockBody>,
    constraints: Vec<MockConstraint>,
    commands: Vec<BackendCommand>,
    steps: u64,
    grasp_rule: Option<GraspRule>,
    couplings: Vec<Coupling>,
    simulate_errors: bool,
    error_probability: f32,
}

impl Default for MockPhysicsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPhysicsBackend {
    /// Create a mock backend with no grasp rule: objects never follow the
    /// gripper, so every attempt fails.
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            constraints: Vec::new(),
            commands: Vec::new(),
            steps: 0,
            grasp_rule: None,
            couplings: Vec::new(),
            simulate_errors: false,
            error_probability: 0.0,
        }
    }

    /// Enable the grasp-capture rule
    pub fn with_grasp_rule(mut self, rule: GraspRule) -> Self {
        self.grasp_rule = Some(rule);
        self
    }

    /// Enable error simulation with given probability (0.0 to 1.0)
    pub fn simulate_errors(&mut self, enable: bool, probability: f32) {
        self.simulate_errors = enable;
        self.error_probability = probability.clamp(0.0, 1.0);
    }

    /// All commands received so far, in order
    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of simulation steps taken
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Number of constraints that have not been removed
    pub fn live_constraint_count(&self) -> usize {
        self.constraints.iter().filter(|c| c.alive).count()
    }

    /// Current target of a live constraint
    pub fn constraint_target(&self, constraint: ConstraintHandle) -> Option<Vector3<f64>> {
        self.constraints
            .get(constraint.id() as usize)
            .filter(|c| c.alive)
            .map(|c| c.target_position)
    }

    /// Overwrite a body position directly (test setup)
    pub fn set_body_position(
        &mut self,
        body: BodyHandle,
        position: Vector3<f64>,
    ) -> BackendResult<()> {
        self.body_mut(body)?.position = position;
        Ok(())
    }

    /// Descriptor the body was loaded from
    pub fn body_descriptor(&self, body: BodyHandle) -> BackendResult<&str> {
        Ok(self.body_ref(body)?.descriptor.as_str())
    }

    /// Current state of a joint
    pub fn joint_state(&self, body: BodyHandle, joint: usize) -> BackendResult<f64> {
        let b = self.body_ref(body)?;
        Ok(b.joint_states.get(&joint).copied().unwrap_or(0.0))
    }

    /// Friction last set on a body, if any
    pub fn friction(&self, body: BodyHandle) -> BackendResult<Option<(f64, f64, f64)>> {
        Ok(self.body_ref(body)?.friction)
    }

    fn body_ref(&self, handle: BodyHandle) -> BackendResult<&MockBody> {
        self.bodies
            .get(handle.id() as usize)
            .ok_or(BackendError::InvalidBody { id: handle.id() })
    }

    fn body_mut(&mut self, handle: BodyHandle) -> BackendResult<&mut MockBody> {
        self.bodies
            .get_mut(handle.id() as usize)
            .ok_or(BackendError::InvalidBody { id: handle.id() })
    }

    fn constraint_ref(&self, handle: ConstraintHandle) -> BackendResult<&MockConstraint> {
        self.constraints
            .get(handle.id() as usize)
            .filter(|c| c.alive)
            .ok_or(BackendError::InvalidConstraint { id: handle.id() })
    }

    fn should_simulate_error(&self) -> bool {
        if !self.simulate_errors {
            return false;
        }

        use rand::Rng;
        let mut rng = rand::thread_rng();
        rng.gen::<f32>() < self.error_probability
    }

    /// True when the body's commanded joints amount to a closed grip
    fn grip_engaged(&self, body: BodyHandle, rule: &GraspRule) -> bool {
        let Ok(b) = self.body_ref(body) else {
            return false;
        };
        let closing = b
            .joint_commands
            .values()
            .filter(|c| c.target >= rule.grip_target_min && c.max_force >= rule.grip_force_min)
            .count();
        closing >= 2
    }

    fn update_couplings(&mut self) {
        let Some(rule) = self.grasp_rule else {
            return;
        };

        let leaders: Vec<BodyHandle> = self
            .constraints
            .iter()
            .filter(|c| c.alive)
            .map(|c| c.body)
            .collect();

        for leader in leaders {
            let engaged = self.grip_engaged(leader, &rule);

            if !engaged {
                self.couplings.retain(|c| c.leader != leader);
                continue;
            }
            if self.couplings.iter().any(|c| c.leader == leader) {
                continue;
            }

            let leader_pos = match self.body_ref(leader) {
                Ok(b) => b.position,
                Err(_) => continue,
            };
            let constrained: Vec<BodyHandle> = self
                .constraints
                .iter()
                .filter(|c| c.alive)
                .map(|c| c.body)
                .collect();

            // Nearest free body within reach gets captured
            let candidate = self
                .bodies
                .iter()
                .enumerate()
                .map(|(i, b)| (BodyHandle::new(i as u32), b.position))
                .filter(|(h, _)| !constrained.contains(h))
                .filter(|(h, _)| !self.couplings.iter().any(|c| c.follower == *h))
                .map(|(h, p)| (h, p, (p - leader_pos).norm()))
                .filter(|(_, _, d)| *d <= rule.capture_radius)
                .min_by(|a, b| a.2.total_cmp(&b.2));

            if let Some((follower, follower_pos, _)) = candidate {
                self.couplings.push(Coupling {
                    leader,
                    follower,
                    offset: follower_pos - leader_pos,
                });
            }
        }
    }
}

impl PhysicsBackend for MockPhysicsBackend {
    fn load_body(&mut self, descriptor: &str, position: Vector3<f64>) -> BackendResult<BodyHandle> {
        if descriptor.is_empty() {
            return Err(BackendError::LoadFailure {
                descriptor: descriptor.to_string(),
                details: "empty descriptor".to_string(),
            });
        }

        self.commands.push(BackendCommand::LoadBody {
            descriptor: descriptor.to_string(),
            position,
        });
        self.bodies.push(MockBody {
            descriptor: descriptor.to_string(),
            position,
            joint_states: HashMap::new(),
            joint_commands: HashMap::new(),
            friction: None,
        });
        Ok(BodyHandle::new((self.bodies.len() - 1) as u32))
    }

    fn create_fixed_constraint(
        &mut self,
        body: BodyHandle,
        _parent_offset: Vector3<f64>,
        child_frame: Vector3<f64>,
    ) -> BackendResult<ConstraintHandle> {
        self.body_ref(body)?;

        self.commands.push(BackendCommand::CreateConstraint { body });
        self.constraints.push(MockConstraint {
            body,
            target_position: child_frame,
            alive: true,
        });
        Ok(ConstraintHandle::new((self.constraints.len() - 1) as u32))
    }

    fn update_constraint(
        &mut self,
        constraint: ConstraintHandle,
        target_position: Vector3<f64>,
        target_orientation: EulerAngles,
        max_force: f64,
    ) -> BackendResult<()> {
        self.constraint_ref(constraint)?;

        self.commands.push(BackendCommand::UpdateConstraint {
            constraint,
            target_position,
            target_orientation,
            max_force,
        });
        self.constraints[constraint.id() as usize].target_position = target_position;
        Ok(())
    }

    fn set_joint_target(
        &mut self,
        body: BodyHandle,
        joint: usize,
        target: f64,
        max_force: f64,
        max_velocity: f64,
    ) -> BackendResult<()> {
        self.body_ref(body)?;

        self.commands.push(BackendCommand::SetJointTarget {
            body,
            joint,
            target,
            max_force,
            max_velocity,
        });
        self.bodies[body.id() as usize]
            .joint_commands
            .insert(joint, JointCommand { target, max_force });
        Ok(())
    }

    fn set_friction(
        &mut self,
        body: BodyHandle,
        lateral: f64,
        rolling: f64,
        spinning: f64,
    ) -> BackendResult<()> {
        self.body_ref(body)?;

        self.commands.push(BackendCommand::SetFriction {
            body,
            lateral,
            rolling,
            spinning,
        });
        self.bodies[body.id() as usize].friction = Some((lateral, rolling, spinning));
        Ok(())
    }

    fn reset_joint_state(
        &mut self,
        body: BodyHandle,
        joint: usize,
        value: f64,
    ) -> BackendResult<()> {
        self.body_ref(body)?;

        self.commands.push(BackendCommand::ResetJointState { body, joint, value });
        self.bodies[body.id() as usize].joint_states.insert(joint, value);
        Ok(())
    }

    fn remove_constraint(&mut self, constraint: ConstraintHandle) -> BackendResult<()> {
        self.constraint_ref(constraint)?;

        self.commands
            .push(BackendCommand::RemoveConstraint { constraint });
        let body = self.constraints[constraint.id() as usize].body;
        self.constraints[constraint.id() as usize].alive = false;
        // Releasing the constraint also releases anything it was dragging
        self.couplings.retain(|c| c.leader != body);
        Ok(())
    }

    fn reset_world(&mut self) -> BackendResult<()> {
        self.commands.push(BackendCommand::ResetWorld);
        self.bodies.clear();
        self.constraints.clear();
        self.couplings.clear();
        Ok(())
    }

    fn step_simulation(&mut self) -> BackendResult<()> {
        if self.should_simulate_error() {
            return Err(BackendError::Simulation {
                details: "simulated step failure".to_string(),
            });
        }

        self.commands.push(BackendCommand::Step);
        self.steps += 1;

        // Joints settle to their commanded targets within one step
        for body in &mut self.bodies {
            for (&joint, command) in &body.joint_commands {
                body.joint_states.insert(joint, command.target);
            }
        }

        // Constrained bodies track their constraint targets
        let moves: Vec<(BodyHandle, Vector3<f64>)> = self
            .constraints
            .iter()
            .filter(|c| c.alive)
            .map(|c| (c.body, c.target_position))
            .collect();
        for (handle, target) in moves {
            self.body_mut(handle)?.position = target;
        }

        self.update_couplings();

        let drags: Vec<(BodyHandle, BodyHandle, Vector3<f64>)> = self
            .couplings
            .iter()
            .map(|c| (c.leader, c.follower, c.offset))
            .collect();
        for (leader, follower, offset) in drags {
            let leader_pos = self.body_ref(leader)?.position;
            self.body_mut(follower)?.position = leader_pos + offset;
        }

        Ok(())
    }

    fn body_position(&self, body: BodyHandle) -> BackendResult<Vector3<f64>> {
        Ok(self.body_ref(body)?.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_read_back() {
        let mut backend = MockPhysicsBackend::new();
        let body = backend
            .load_body("cube_small.urdf", Vector3::new(0.5, 0.3, 0.0))
            .unwrap();
        assert_eq!(
            backend.body_position(body).unwrap(),
            Vector3::new(0.5, 0.3, 0.0)
        );
        assert_eq!(backend.body_descriptor(body).unwrap(), "cube_small.urdf");
        assert_eq!(backend.commands().len(), 1);
    }

    #[test]
    fn test_invalid_handles_are_rejected() {
        let mut backend = MockPhysicsBackend::new();
        let bogus = BodyHandle::new(17);
        assert!(matches!(
            backend.body_position(bogus),
            Err(BackendError::InvalidBody { id: 17 })
        ));
        assert!(backend
            .create_fixed_constraint(bogus, Vector3::zeros(), Vector3::zeros())
            .is_err());
    }

    #[test]
    fn test_constrained_body_follows_target() {
        let mut backend = MockPhysicsBackend::new();
        let body = backend
            .load_body("pr2_gripper.urdf", Vector3::new(0.5, 0.3, 0.7))
            .unwrap();
        let constraint = backend
            .create_fixed_constraint(body, Vector3::zeros(), Vector3::new(0.5, 0.3, 0.7))
            .unwrap();

        backend
            .update_constraint(
                constraint,
                Vector3::new(0.5, 0.3, 0.1),
                EulerAngles::yaw_only(0.0),
                50.0,
            )
            .unwrap();
        backend.step_simulation().unwrap();

        assert_eq!(
            backend.constraint_target(constraint),
            Some(Vector3::new(0.5, 0.3, 0.1))
        );
        assert_eq!(
            backend.body_position(body).unwrap(),
            Vector3::new(0.5, 0.3, 0.1)
        );
    }

    #[test]
    fn test_rejected_commands_are_not_recorded() {
        let mut backend = MockPhysicsBackend::new();
        let bogus = BodyHandle::new(3);

        assert!(backend.set_joint_target(bogus, 0, 0.12, 300.0, 2.0).is_err());
        assert!(backend.set_friction(bogus, 2.0, 0.1, 0.1).is_err());
        assert!(backend.reset_joint_state(bogus, 0, 0.5).is_err());
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_removed_constraint_is_dead() {
        let mut backend = MockPhysicsBackend::new();
        let body = backend.load_body("pr2_gripper.urdf", Vector3::zeros()).unwrap();
        let constraint = backend
            .create_fixed_constraint(body, Vector3::zeros(), Vector3::zeros())
            .unwrap();

        assert_eq!(backend.live_constraint_count(), 1);
        backend.remove_constraint(constraint).unwrap();
        assert_eq!(backend.live_constraint_count(), 0);
        assert_eq!(backend.constraint_target(constraint), None);
        assert!(backend
            .update_constraint(constraint, Vector3::zeros(), EulerAngles::yaw_only(0.0), 50.0)
            .is_err());
    }

    #[test]
    fn test_grasp_rule_captures_and_lifts_object() {
        let mut backend = MockPhysicsBackend::new().with_grasp_rule(GraspRule::default());
        let gripper = backend
            .load_body("pr2_gripper.urdf", Vector3::new(0.5, 0.3, 0.05))
            .unwrap();
        let object = backend
            .load_body("cube_small.urdf", Vector3::new(0.5, 0.3, 0.0))
            .unwrap();
        let constraint = backend
            .create_fixed_constraint(gripper, Vector3::zeros(), Vector3::new(0.5, 0.3, 0.05))
            .unwrap();

        // Close both fingers hard, then lift
        backend.set_joint_target(gripper, 0, 0.12, 300.0, 2.0).unwrap();
        backend.set_joint_target(gripper, 2, 0.12, 300.0, 2.0).unwrap();
        backend.step_simulation().unwrap();

        backend
            .update_constraint(
                constraint,
                Vector3::new(0.5, 0.3, 0.4),
                EulerAngles::yaw_only(0.0),
                50.0,
            )
            .unwrap();
        backend.step_simulation().unwrap();

        let lifted = backend.body_position(object).unwrap();
        assert!((lifted.z - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_no_capture_beyond_reach() {
        let mut backend = MockPhysicsBackend::new().with_grasp_rule(GraspRule::default());
        let gripper = backend
            .load_body("pr2_gripper.urdf", Vector3::new(0.5, 0.3, 0.05))
            .unwrap();
        let object = backend
            .load_body("cube_small.urdf", Vector3::new(0.8, 0.3, 0.0))
            .unwrap();
        let constraint = backend
            .create_fixed_constraint(gripper, Vector3::zeros(), Vector3::new(0.5, 0.3, 0.05))
            .unwrap();

        backend.set_joint_target(gripper, 0, 0.12, 300.0, 2.0).unwrap();
        backend.set_joint_target(gripper, 2, 0.12, 300.0, 2.0).unwrap();
        backend.step_simulation().unwrap();
        backend
            .update_constraint(
                constraint,
                Vector3::new(0.5, 0.3, 0.4),
                EulerAngles::yaw_only(0.0),
                50.0,
            )
            .unwrap();
        backend.step_simulation().unwrap();

        assert_eq!(
            backend.body_position(object).unwrap(),
            Vector3::new(0.8, 0.3, 0.0)
        );
    }

    #[test]
    fn test_weak_grip_does_not_capture() {
        let mut backend = MockPhysicsBackend::new().with_grasp_rule(GraspRule::default());
        let gripper = backend
            .load_body("pr2_gripper.urdf", Vector3::new(0.5, 0.3, 0.05))
            .unwrap();
        let object = backend
            .load_body("cube_small.urdf", Vector3::new(0.5, 0.3, 0.0))
            .unwrap();
        backend
            .create_fixed_constraint(gripper, Vector3::zeros(), Vector3::new(0.5, 0.3, 0.05))
            .unwrap();

        // Gentle close stays below the grip force threshold
        backend.set_joint_target(gripper, 0, 0.1, 10.0, 1.0).unwrap();
        backend.set_joint_target(gripper, 2, 0.1, 10.0, 1.0).unwrap();
        backend.step_simulation().unwrap();

        assert_eq!(
            backend.body_position(object).unwrap(),
            Vector3::new(0.5, 0.3, 0.0)
        );
    }

    #[test]
    fn test_reset_world_invalidates_handles() {
        let mut backend = MockPhysicsBackend::new();
        let body = backend.load_body("cube_small.urdf", Vector3::zeros()).unwrap();
        backend
            .create_fixed_constraint(body, Vector3::zeros(), Vector3::zeros())
            .unwrap();

        backend.reset_world().unwrap();
        assert_eq!(backend.live_constraint_count(), 0);
        assert!(backend.body_position(body).is_err());
    }

    #[test]
    fn test_error_simulation() {
        let mut backend = MockPhysicsBackend::new();
        backend.simulate_errors(true, 1.0);
        assert!(matches!(
            backend.step_simulation(),
            Err(BackendError::Simulation { .. })
        ));
    }
}
