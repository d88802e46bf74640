//! Shared utilities

pub mod config;

pub use config::{ConfigError, GripperKind, ObjectConfig, SamplingConfig, SimulationConfig};
