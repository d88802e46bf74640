//! Run configuration with JSON file support

use crate::control::GraspScript;
use crate::core::{
    ObjectShape, DEFAULT_APPROACH_Z_OFFSET, DEFAULT_HEIGHT_FLOOR, DEFAULT_LATERAL_OFFSET,
    DEFAULT_POSITION_NOISE_STD, DEFAULT_SAMPLE_RADIUS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Gripper kinds selectable at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GripperKind {
    TwoFinger,
}

/// Target object configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub shape: ObjectShape,
    /// World position of the object
    pub position: [f64; 3],
    /// Height at which the fingers close around the object
    pub grasp_height: f64,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            shape: ObjectShape::Cube,
            position: [0.5, 0.3, 0.0],
            grasp_height: 0.05,
        }
    }
}

/// Pose sampling and orientation solving parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Radius of the sampling sphere (meters)
    pub radius: f64,
    /// Minimum z relative to the object for a sampled point
    pub height_floor: f64,
    /// Standard deviation of per-axis positional noise (meters)
    pub noise_std: f64,
    /// Vertical offset of the approach point above the gripper
    pub approach_z_offset: f64,
    /// Lateral bias from the object center
    pub lateral_offset: f64,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_SAMPLE_RADIUS,
            height_floor: DEFAULT_HEIGHT_FLOOR,
            noise_std: DEFAULT_POSITION_NOISE_STD,
            approach_z_offset: DEFAULT_APPROACH_Z_OFFSET,
            lateral_offset: DEFAULT_LATERAL_OFFSET,
            seed: None,
        }
    }
}

/// Top-level configuration for a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimulationConfig {
    pub object: ObjectConfig,
    pub gripper: GripperKind,
    pub sampling: SamplingConfig,
    pub script: GraspScript,
}

impl Default for GripperKind {
    fn default() -> Self {
        GripperKind::TwoFinger
    }
}

impl SimulationConfig {
    /// Load and validate a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            message: e.to_string(),
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|e| ConfigError::Serialization {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
            message: e.to_string(),
        })?;
        fs::write(path, text).map_err(|e| ConfigError::Io {
            message: e.to_string(),
        })
    }

    /// Check parameter ranges before a run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.radius <= 0.0 {
            return Err(self.invalid("sampling.radius", self.sampling.radius, "must be positive"));
        }
        if self.sampling.height_floor >= self.sampling.radius {
            // Pre-noise draws lie on the sampling sphere, so z never exceeds
            // the radius; a floor at or above it rejects every candidate
            return Err(self.invalid(
                "sampling.height_floor",
                self.sampling.height_floor,
                "must be below the sampling radius",
            ));
        }
        if self.sampling.noise_std < 0.0 {
            return Err(self.invalid(
                "sampling.noise_std",
                self.sampling.noise_std,
                "must be non-negative",
            ));
        }
        if self.sampling.lateral_offset < 0.0 {
            return Err(self.invalid(
                "sampling.lateral_offset",
                self.sampling.lateral_offset,
                "must be non-negative",
            ));
        }
        if self.script.lift_steps == 0 {
            return Err(self.invalid("script.lift_steps", 0.0, "must be at least 1"));
        }
        if self.script.lift_height <= self.object.grasp_height {
            return Err(self.invalid(
                "script.lift_height",
                self.script.lift_height,
                "must exceed the grasp height",
            ));
        }
        if self.script.close_force <= 0.0 || self.script.hold_force <= 0.0 {
            return Err(self.invalid(
                "script.close_force",
                self.script.close_force,
                "closure forces must be positive",
            ));
        }
        if !(0.0 < self.script.success_fraction && self.script.success_fraction <= 1.0) {
            return Err(self.invalid(
                "script.success_fraction",
                self.script.success_fraction,
                "must be in (0, 1]",
            ));
        }
        Ok(())
    }

    fn invalid(&self, parameter: &str, value: f64, reason: &str) -> ConfigError {
        ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Parameter value out of range
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    Io { message: String },
    /// JSON serialization/deserialization error
    Serialization { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "invalid {} = {}: {}", parameter, value, reason)
            }
            ConfigError::Io { message } => write!(f, "config I/O error: {}", message),
            ConfigError::Serialization { message } => {
                write!(f, "config serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
