//! Physics backend abstraction
//!
//! The generator treats the rigid-body simulator as an external collaborator
//! behind [`PhysicsBackend`]. [`MockPhysicsBackend`] is the test double used
//! by the test suite and the batch binary.

pub mod backend;
pub mod error;
pub mod mock;

pub use backend::{BodyHandle, ConstraintHandle, PhysicsBackend};
pub use error::{BackendError, BackendResult};
pub use mock::{BackendCommand, GraspRule, MockPhysicsBackend};
