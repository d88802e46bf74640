//! Batch grasp-data generation
//!
//! [`GraspSession`] wires the sampler, orientation solver and controller
//! together: each attempt draws a pose, spawns the gripper there, runs the
//! scripted grasp and appends the judged row to the dataset.

use crate::control::{GraspController, GraspError, GraspResult};
use crate::core::{GraspAttempt, Pose, TargetObject};
use crate::dataset::{GraspDataset, GraspRecord};
use crate::gripper::{Gripper, TwoFingerGripper};
use crate::physics::PhysicsBackend;
use crate::sampling::{GeometryError, OrientationSolver, PoseSampler};
use crate::utils::config::{ConfigError, GripperKind, SimulationConfig};
use nalgebra::Vector3;

/// Orchestrates a batch of grasp attempts against one backend.
pub struct GraspSession {
    backend: Box<dyn PhysicsBackend>,
    sampler: PoseSampler,
    solver: OrientationSolver,
    controller: GraspController,
    config: SimulationConfig,
    dataset: GraspDataset,
}

impl GraspSession {
    /// Create a session; fails if the configuration is invalid.
    pub fn new(
        backend: Box<dyn PhysicsBackend>,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let sampler = match config.sampling.seed {
            Some(seed) => PoseSampler::from_seed(seed),
            None => PoseSampler::new(),
        }
        .with_radius(config.sampling.radius)
        .with_height_floor(config.sampling.height_floor)
        .with_noise_std(config.sampling.noise_std);

        let solver = OrientationSolver::new()
            .with_approach_z_offset(config.sampling.approach_z_offset)
            .with_lateral_offset(config.sampling.lateral_offset);

        let controller = GraspController::new(config.script);

        Ok(Self {
            backend,
            sampler,
            solver,
            controller,
            config,
            dataset: GraspDataset::new(),
        })
    }

    pub fn controller_mut(&mut self) -> &mut GraspController {
        &mut self.controller
    }

    pub fn dataset(&self) -> &GraspDataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> GraspDataset {
        self.dataset
    }

    /// Run `attempts` grasp attempts, appending one row per attempt.
    ///
    /// A degenerate pose (no well-defined approach orientation) is dropped
    /// and redrawn; any other failure aborts the batch.
    pub fn run(&mut self, attempts: usize) -> GraspResult<()> {
        let object = self.target_object();

        for trial in 0..attempts {
            let pose = self.draw_pose(&object)?;
            tracing::info!(
                trial,
                x = pose.position().x,
                y = pose.position().y,
                z = pose.position().z,
                "running grasp attempt"
            );

            let attempt = self.run_attempt(&object, pose)?;
            self.dataset.push(GraspRecord::from_attempt(&attempt));
        }

        if let Some(rate) = self.dataset.success_rate() {
            tracing::info!(attempts = self.dataset.len(), success_rate = rate, "batch finished");
        }
        Ok(())
    }

    fn target_object(&self) -> TargetObject {
        TargetObject::new(
            self.config.object.shape,
            Vector3::from(self.config.object.position),
            self.config.object.grasp_height,
        )
    }

    /// Draw candidate positions until one admits an orientation.
    fn draw_pose(&mut self, object: &TargetObject) -> GraspResult<Pose> {
        loop {
            let Some(position) = self
                .sampler
                .sample(&object.position, 1)
                .into_iter()
                .next()
            else {
                continue; // rejected by the height floor, draw again
            };

            match self.solver.solve(&position, &object.position) {
                Ok(orientation) => return Ok(Pose::new(position, orientation)),
                Err(GeometryError::DegenerateDirection { .. }) => {
                    // Measure-zero pose with no usable approach; redraw
                    tracing::warn!("degenerate approach direction, redrawing pose");
                    continue;
                }
            }
        }
    }

    fn run_attempt(&mut self, object: &TargetObject, pose: Pose) -> GraspResult<GraspAttempt> {
        let backend = self.backend.as_mut();

        // Fresh world per attempt; leftovers from the previous trial would
        // interfere with contact and with the success judgment
        backend.reset_world()?;
        let object_body = backend.load_body(object.shape.descriptor(), object.position)?;

        let mut gripper = make_gripper(self.config.gripper, pose.position());
        gripper.load(backend).map_err(GraspError::from)?;
        gripper
            .attach_fixed(backend, Vector3::zeros())
            .map_err(GraspError::from)?;
        gripper.open(backend).map_err(GraspError::from)?;

        let outcome = self.controller.execute(
            backend,
            gripper.as_mut(),
            object,
            object_body,
            pose.orientation().yaw,
        )?;

        Ok(GraspAttempt::new(pose).with_success(outcome.success))
    }
}

/// Construct a gripper of the configured kind at a spawn position
pub fn make_gripper(kind: GripperKind, base_position: Vector3<f64>) -> Box<dyn Gripper> {
    match kind {
        GripperKind::TwoFinger => Box::new(TwoFingerGripper::new(base_position)),
    }
}
