//! Physical constants and script parameters

/// Nominal physics timestep (seconds), 240 Hz
pub const SIM_TIMESTEP_S: f64 = 1.0 / 240.0;

// --- Pose sampling defaults ---

/// Radius of the sampling sphere around the object (meters)
pub const DEFAULT_SAMPLE_RADIUS: f64 = 0.5;
/// Minimum z for a sampled point, relative to the object (upper hemisphere)
pub const DEFAULT_HEIGHT_FLOOR: f64 = 0.0;
/// Standard deviation of the per-axis positional noise (meters)
pub const DEFAULT_POSITION_NOISE_STD: f64 = 0.01;

// --- Orientation solving defaults ---

/// Vertical offset above the gripper position used as the approach point
pub const DEFAULT_APPROACH_Z_OFFSET: f64 = 0.1;
/// Lateral bias from the object center so closing fingers straddle it
pub const DEFAULT_LATERAL_OFFSET: f64 = 0.04;

// --- Grasp script ---

/// Ticks spent in each of the approach, descend and close phases
pub const DEFAULT_PHASE_TICKS: u32 = 100;
/// Number of height increments during the lift
pub const DEFAULT_LIFT_STEPS: u32 = 150;
/// Final constraint height at the end of the lift (meters)
pub const DEFAULT_LIFT_HEIGHT: f64 = 0.4;
/// Clearance above the object during the approach phase (meters)
pub const DEFAULT_APPROACH_CLEARANCE: f64 = 0.1;
/// Fraction of the grasp-to-lift span the object must rise to count as a success
pub const DEFAULT_SUCCESS_FRACTION: f64 = 0.5;

// --- Actuation limits ---

/// Maximum force for constraint-driven gripper motion (N)
pub const MOVE_MAX_FORCE: f64 = 50.0;
/// Finger joint target when the gripper is fully open
pub const OPEN_TARGET: f64 = 0.0;
/// Finger joint target for a gentle close
pub const CLOSE_TARGET: f64 = 0.1;
/// Force and velocity cap for gentle open/close commands
pub const GENTLE_FORCE: f64 = 10.0;
pub const GENTLE_MAX_VELOCITY: f64 = 1.0;
/// Finger joint target for the strong grasp closure
pub const GRASP_CLOSE_TARGET: f64 = 0.12;
/// Force applied while closing onto the object (N)
pub const GRASP_CLOSE_FORCE: f64 = 300.0;
/// Force reapplied every tick while lifting to resist slip (N)
pub const GRASP_HOLD_FORCE: f64 = 400.0;
/// Velocity cap for strong closure commands
pub const GRASP_MAX_VELOCITY: f64 = 2.0;

// --- Contact friction, set once per attempt on object and gripper ---

pub const LATERAL_FRICTION: f64 = 2.0;
pub const ROLLING_FRICTION: f64 = 0.1;
pub const SPINNING_FRICTION: f64 = 0.1;

// --- Two-finger gripper geometry ---

/// Joint indices of the two finger joints
pub const FINGER_JOINTS: [usize; 2] = [0, 2];
/// Initial joint positions applied right after loading the gripper body
pub const INITIAL_FINGER_POSITIONS: [f64; 4] = [0.550569, 0.0, 0.549657, 0.0];
/// Body descriptor for the two-finger gripper
pub const TWO_FINGER_DESCRIPTOR: &str = "pr2_gripper.urdf";
