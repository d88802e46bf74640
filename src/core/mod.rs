//! Core types and constants for the grasp data generator

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::*;
