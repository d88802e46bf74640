//! Four-phase grasp execution state machine

use crate::control::error::{GraspError, GraspResult};
use crate::control::events::{GraspEvent, GraspEventCallback};
use crate::core::{
    TargetObject, DEFAULT_APPROACH_CLEARANCE, DEFAULT_LIFT_HEIGHT, DEFAULT_LIFT_STEPS,
    DEFAULT_PHASE_TICKS, DEFAULT_SUCCESS_FRACTION, GRASP_CLOSE_FORCE, GRASP_CLOSE_TARGET,
    GRASP_HOLD_FORCE, GRASP_MAX_VELOCITY, LATERAL_FRICTION, ROLLING_FRICTION, SPINNING_FRICTION,
};
use crate::gripper::{Gripper, GripperError};
use crate::physics::{BodyHandle, PhysicsBackend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Controller phase. The script is fixed: every phase runs its full tick
/// budget, there are no early exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraspPhase {
    Idle,
    AboveObject,
    Descending,
    Closing,
    Lifting,
    Done,
    Failed,
}

impl fmt::Display for GraspPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraspPhase::Idle => "idle",
            GraspPhase::AboveObject => "above_object",
            GraspPhase::Descending => "descending",
            GraspPhase::Closing => "closing",
            GraspPhase::Lifting => "lifting",
            GraspPhase::Done => "done",
            GraspPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tick budgets, forces and heights of the scripted sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraspScript {
    /// Ticks holding position above the object
    pub approach_ticks: u32,
    /// Ticks lowering onto the object
    pub descend_ticks: u32,
    /// Ticks letting contact form after the strong closure
    pub close_ticks: u32,
    /// Height increments during the lift
    pub lift_steps: u32,
    /// Final constraint height (meters)
    pub lift_height: f64,
    /// Clearance above the object during the approach (meters)
    pub approach_clearance: f64,
    /// Finger target for the strong closure
    pub close_target: f64,
    /// Force for the strong closure (N)
    pub close_force: f64,
    /// Force reapplied every lifting tick (N)
    pub hold_force: f64,
    /// Velocity cap for closure commands
    pub finger_velocity_limit: f64,
    /// Fraction of the grasp-to-lift span the object must rise to count
    /// as a success
    pub success_fraction: f64,
    /// Sleep one timestep of wall clock per tick. Off for batch runs.
    pub pacing: bool,
}

impl Default for GraspScript {
    fn default() -> Self {
        Self {
            approach_ticks: DEFAULT_PHASE_TICKS,
            descend_ticks: DEFAULT_PHASE_TICKS,
            close_ticks: DEFAULT_PHASE_TICKS,
            lift_steps: DEFAULT_LIFT_STEPS,
            lift_height: DEFAULT_LIFT_HEIGHT,
            approach_clearance: DEFAULT_APPROACH_CLEARANCE,
            close_target: GRASP_CLOSE_TARGET,
            close_force: GRASP_CLOSE_FORCE,
            hold_force: GRASP_HOLD_FORCE,
            finger_velocity_limit: GRASP_MAX_VELOCITY,
            success_fraction: DEFAULT_SUCCESS_FRACTION,
            pacing: false,
        }
    }
}

/// Outcome of one completed grasp attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraspOutcome {
    /// Whether the object rose past the success threshold
    pub success: bool,
    /// Object height read back after the lift
    pub object_height: f64,
    /// Total simulation ticks spent
    pub ticks: u64,
}

/// Drives a gripper through approach, descent, closure and lift against a
/// physics backend.
///
/// The controller re-issues the grip command on every lifting tick: discrete
/// constraint solvers let contact force decay between steps, and a stale
/// command lets the object slip out while the gripper rises.
pub struct GraspController {
    script: GraspScript,
    phase: GraspPhase,
    event_callback: Option<GraspEventCallback>,
}

impl GraspController {
    pub fn new(script: GraspScript) -> Self {
        Self {
            script,
            phase: GraspPhase::Idle,
            event_callback: None,
        }
    }

    pub fn script(&self) -> &GraspScript {
        &self.script
    }

    pub fn phase(&self) -> GraspPhase {
        self.phase
    }

    /// Register an observer for phase transitions and attempt outcomes
    pub fn set_event_callback(&mut self, callback: GraspEventCallback) {
        self.event_callback = Some(callback);
    }

    /// Run the full scripted sequence for one attempt.
    ///
    /// The gripper must already be loaded and attached. Whatever happens,
    /// the constraint is released before this returns, so the backend never
    /// leaks a constraint across attempts.
    pub fn execute(
        &mut self,
        backend: &mut dyn PhysicsBackend,
        gripper: &mut dyn Gripper,
        object: &TargetObject,
        object_body: BodyHandle,
        yaw: f64,
    ) -> GraspResult<GraspOutcome> {
        self.phase = GraspPhase::Idle;

        let result = self.run_script(backend, gripper, object, object_body, yaw);

        // Release the constraint on every exit path
        let detach = gripper.detach(backend);

        match result {
            Ok(outcome) => {
                detach.map_err(GraspError::from)?;
                self.phase = GraspPhase::Done;
                self.emit(GraspEvent::AttemptFinished {
                    success: outcome.success,
                    object_height: outcome.object_height,
                });
                Ok(outcome)
            }
            Err(error) => {
                if let Err(detach_error) = detach {
                    tracing::warn!(error = %detach_error, "detach failed after aborted attempt");
                }
                self.phase = GraspPhase::Failed;
                tracing::warn!(error = %error, "grasp attempt aborted");
                self.emit(GraspEvent::AttemptFailed {
                    reason: error.to_string(),
                });
                Err(error)
            }
        }
    }

    fn run_script(
        &mut self,
        backend: &mut dyn PhysicsBackend,
        gripper: &mut dyn Gripper,
        object: &TargetObject,
        object_body: BodyHandle,
        yaw: f64,
    ) -> GraspResult<GraspOutcome> {
        let script = self.script;
        let gripper_body = gripper.body().ok_or(GripperError::NotAttached {
            operation: "set_friction",
        })?;

        // Contact friction, once per attempt, on both sides of the grasp
        backend.set_friction(object_body, LATERAL_FRICTION, ROLLING_FRICTION, SPINNING_FRICTION)?;
        backend.set_friction(gripper_body, LATERAL_FRICTION, ROLLING_FRICTION, SPINNING_FRICTION)?;

        let mut ticks: u64 = 0;

        // Phase 1: hold above the object
        self.enter(GraspPhase::AboveObject, script.approach_ticks);
        gripper.move_to(backend, object.position.z + script.approach_clearance, yaw)?;
        self.run_ticks(backend, script.approach_ticks, &mut ticks)?;
        self.complete(GraspPhase::AboveObject, script.approach_ticks);

        // Phase 2: lower onto the object
        self.enter(GraspPhase::Descending, script.descend_ticks);
        gripper.move_to(backend, object.grasp_height, yaw)?;
        self.run_ticks(backend, script.descend_ticks, &mut ticks)?;
        self.complete(GraspPhase::Descending, script.descend_ticks);

        // Phase 3: close hard and let contact form
        self.enter(GraspPhase::Closing, script.close_ticks);
        gripper.set_grip(
            backend,
            script.close_target,
            script.close_force,
            script.finger_velocity_limit,
        )?;
        self.run_ticks(backend, script.close_ticks, &mut ticks)?;
        self.complete(GraspPhase::Closing, script.close_ticks);

        // Phase 4: lift in fixed increments, refreshing the grip every tick
        self.enter(GraspPhase::Lifting, script.lift_steps);
        let mut height = object.grasp_height;
        let step = (script.lift_height - object.grasp_height) / script.lift_steps as f64;
        for _ in 0..script.lift_steps {
            height += step;
            gripper.move_to(backend, height, yaw)?;
            gripper.set_grip(
                backend,
                script.close_target,
                script.hold_force,
                script.finger_velocity_limit,
            )?;
            self.tick(backend, &mut ticks)?;
        }
        self.complete(GraspPhase::Lifting, script.lift_steps);

        // Judge the attempt from the object's final height
        let object_height = backend.body_position(object_body)?.z;
        let threshold = object.grasp_height
            + script.success_fraction * (script.lift_height - object.grasp_height);
        let success = object_height >= threshold;

        Ok(GraspOutcome {
            success,
            object_height,
            ticks,
        })
    }

    fn enter(&mut self, phase: GraspPhase, tick_budget: u32) {
        self.phase = phase;
        tracing::debug!(phase = %phase, tick_budget, "phase started");
        self.emit(GraspEvent::PhaseStarted { phase, tick_budget });
    }

    fn complete(&mut self, phase: GraspPhase, ticks: u32) {
        tracing::debug!(phase = %phase, ticks, "phase completed");
        self.emit(GraspEvent::PhaseCompleted { phase, ticks });
    }

    fn run_ticks(
        &mut self,
        backend: &mut dyn PhysicsBackend,
        count: u32,
        total: &mut u64,
    ) -> GraspResult<()> {
        for _ in 0..count {
            self.tick(backend, total)?;
        }
        Ok(())
    }

    /// One tick: advance the backend, then optionally pace wall clock
    fn tick(&mut self, backend: &mut dyn PhysicsBackend, total: &mut u64) -> GraspResult<()> {
        backend.step_simulation()?;
        *total += 1;
        if self.script.pacing {
            std::thread::sleep(Duration::from_secs_f64(backend.timestep()));
        }
        Ok(())
    }

    fn emit(&self, event: GraspEvent) {
        if let Some(callback) = &self.event_callback {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ObjectShape;
    use crate::gripper::TwoFingerGripper;
    use crate::physics::{BackendCommand, GraspRule, MockPhysicsBackend};
    use nalgebra::Vector3;
    use std::sync::mpsc;

    fn test_object() -> TargetObject {
        TargetObject::new(ObjectShape::Cube, Vector3::new(0.5, 0.3, 0.0), 0.05)
    }

    /// Object loaded, gripper loaded and attached at the given base
    fn rig(
        backend: &mut MockPhysicsBackend,
        base: Vector3<f64>,
    ) -> (TwoFingerGripper, BodyHandle) {
        let object_body = backend
            .load_body("cube_small.urdf", Vector3::new(0.5, 0.3, 0.0))
            .unwrap();
        let mut gripper = TwoFingerGripper::new(base);
        gripper.load(backend).unwrap();
        gripper.attach_fixed(backend, Vector3::zeros()).unwrap();
        (gripper, object_body)
    }

    #[test]
    fn test_total_tick_count() {
        let mut backend = MockPhysicsBackend::new();
        let (mut gripper, object_body) = rig(&mut backend, Vector3::new(0.5, 0.3, 0.7));
        let mut controller = GraspController::new(GraspScript::default());

        let outcome = controller
            .execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0)
            .unwrap();

        // 100 + 100 + 100 + 150
        assert_eq!(outcome.ticks, 450);
        assert_eq!(backend.step_count(), 450);
        assert_eq!(controller.phase(), GraspPhase::Done);
    }

    #[test]
    fn test_lifting_reissues_grip_every_tick() {
        let mut backend = MockPhysicsBackend::new();
        let (mut gripper, object_body) = rig(&mut backend, Vector3::new(0.5, 0.3, 0.7));
        let mut controller = GraspController::new(GraspScript::default());

        controller
            .execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0)
            .unwrap();

        let hold_commands = backend
            .commands()
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    BackendCommand::SetJointTarget { max_force, .. } if *max_force == 400.0
                )
            })
            .count();
        // Two fingers, one command each per lifting tick
        assert_eq!(hold_commands, 2 * 150);
    }

    #[test]
    fn test_lift_heights_monotone_to_target() {
        let mut backend = MockPhysicsBackend::new();
        let (mut gripper, object_body) = rig(&mut backend, Vector3::new(0.5, 0.3, 0.7));
        let mut controller = GraspController::new(GraspScript::default());

        controller
            .execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0)
            .unwrap();

        let heights: Vec<f64> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                BackendCommand::UpdateConstraint { target_position, .. } => {
                    Some(target_position.z)
                }
                _ => None,
            })
            .collect();

        // Approach, descend, then 150 lift updates
        assert_eq!(heights.len(), 2 + 150);
        let lift = &heights[2..];
        assert_eq!(lift.len(), 150);
        for pair in lift.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!((lift[0] - (0.05 + (0.4 - 0.05) / 150.0)).abs() < 1e-12);
        assert!((lift[149] - 0.4).abs() < 1e-9);
        assert!((gripper.current_height() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_friction_set_once_on_both_bodies() {
        let mut backend = MockPhysicsBackend::new();
        let (mut gripper, object_body) = rig(&mut backend, Vector3::new(0.5, 0.3, 0.7));
        let gripper_body = gripper.body().unwrap();
        let mut controller = GraspController::new(GraspScript::default());

        controller
            .execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0)
            .unwrap();

        let friction_commands = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, BackendCommand::SetFriction { .. }))
            .count();
        assert_eq!(friction_commands, 2);
        assert_eq!(
            backend.friction(object_body).unwrap(),
            Some((2.0, 0.1, 0.1))
        );
        assert_eq!(
            backend.friction(gripper_body).unwrap(),
            Some((2.0, 0.1, 0.1))
        );
    }

    #[test]
    fn test_unattached_gripper_fails_without_backend_calls() {
        let mut backend = MockPhysicsBackend::new();
        let object_body = backend
            .load_body("cube_small.urdf", Vector3::new(0.5, 0.3, 0.0))
            .unwrap();
        let mut gripper = TwoFingerGripper::new(Vector3::new(0.5, 0.3, 0.7));
        let mut controller = GraspController::new(GraspScript::default());

        let result =
            controller.execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0);

        assert!(matches!(result, Err(GraspError::NotAttached { .. })));
        assert_eq!(controller.phase(), GraspPhase::Failed);
        // Only the object load is on record; the script never reached the
        // backend
        assert_eq!(backend.commands().len(), 1);
        assert_eq!(backend.step_count(), 0);
    }

    #[test]
    fn test_constraint_released_on_success_and_failure() {
        // Success path
        let mut backend = MockPhysicsBackend::new();
        let (mut gripper, object_body) = rig(&mut backend, Vector3::new(0.5, 0.3, 0.7));
        let mut controller = GraspController::new(GraspScript::default());
        controller
            .execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0)
            .unwrap();
        assert_eq!(backend.live_constraint_count(), 0);
        assert!(!gripper.is_attached());

        // Failure path: backend dies mid-script
        let mut backend = MockPhysicsBackend::new();
        let (mut gripper, object_body) = rig(&mut backend, Vector3::new(0.5, 0.3, 0.7));
        backend.simulate_errors(true, 1.0);
        let mut controller = GraspController::new(GraspScript::default());
        let result =
            controller.execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0);
        assert!(matches!(result, Err(GraspError::Backend { .. })));
        assert!(!gripper.is_attached());
    }

    #[test]
    fn test_success_when_object_tracks_lift() {
        let mut backend = MockPhysicsBackend::new().with_grasp_rule(GraspRule::default());
        let (mut gripper, object_body) = rig(&mut backend, Vector3::new(0.5, 0.3, 0.7));
        let mut controller = GraspController::new(GraspScript::default());

        let outcome = controller
            .execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0)
            .unwrap();

        assert!(outcome.success);
        // Captured at grasp height with the object 0.05 below the gripper
        assert!((outcome.object_height - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_failure_without_grasp_coupling() {
        let mut backend = MockPhysicsBackend::new();
        let (mut gripper, object_body) = rig(&mut backend, Vector3::new(0.5, 0.3, 0.7));
        let mut controller = GraspController::new(GraspScript::default());

        let outcome = controller
            .execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0)
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.object_height, 0.0);
    }

    #[test]
    fn test_phase_events_in_order() {
        let mut backend = MockPhysicsBackend::new();
        let (mut gripper, object_body) = rig(&mut backend, Vector3::new(0.5, 0.3, 0.7));
        let mut controller = GraspController::new(GraspScript::default());

        let (tx, rx) = mpsc::channel();
        controller.set_event_callback(Box::new(move |event| {
            let _ = tx.send(event);
        }));

        controller
            .execute(&mut backend, &mut gripper, &test_object(), object_body, 0.0)
            .unwrap();

        let events: Vec<GraspEvent> = rx.try_iter().collect();
        let started: Vec<GraspPhase> = events
            .iter()
            .filter_map(|e| match e {
                GraspEvent::PhaseStarted { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            started,
            vec![
                GraspPhase::AboveObject,
                GraspPhase::Descending,
                GraspPhase::Closing,
                GraspPhase::Lifting
            ]
        );
        assert!(matches!(
            events.last(),
            Some(GraspEvent::AttemptFinished { .. })
        ));
    }
}
