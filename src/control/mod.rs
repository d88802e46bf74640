//! Grasp execution
//!
//! [`GraspController`] runs the fixed four-phase script against a physics
//! backend; [`GraspEvent`] reports progress, [`GraspError`] is the attempt
//! failure taxonomy.

pub mod controller;
pub mod error;
pub mod events;

pub use controller::{GraspController, GraspOutcome, GraspPhase, GraspScript};
pub use error::{GraspError, GraspResult};
pub use events::{GraspEvent, GraspEventCallback};
