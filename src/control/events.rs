//! Observability hook for grasp execution
//!
//! Phase transitions are reported through a callback instead of being
//! printed from inside the control loop, so consumers can log, collect or
//! ignore them without touching control flow.

use crate::control::controller::GraspPhase;

/// Events emitted while a grasp attempt runs
#[derive(Debug, Clone, PartialEq)]
pub enum GraspEvent {
    /// A phase began; `tick_budget` ticks will be spent in it
    PhaseStarted { phase: GraspPhase, tick_budget: u32 },
    /// A phase ran its full tick budget
    PhaseCompleted { phase: GraspPhase, ticks: u32 },
    /// The attempt finished and was judged
    AttemptFinished { success: bool, object_height: f64 },
    /// The attempt aborted
    AttemptFailed { reason: String },
}

/// Callback invoked for every [`GraspEvent`]
pub type GraspEventCallback = Box<dyn Fn(GraspEvent) + Send>;
