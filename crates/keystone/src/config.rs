//! # Simulation Configuration
//!
//! A single TOML file, every field optional:
//!
//! ```toml
//! target_fps = 60
//! max_delta_secs = 0.1
//! enable_timing_logs = false
//! frames = 600
//!
//! [registry]
//! membership = "reevaluate"   # or "admit_once"
//! entity_capacity = 256
//! pool_capacity = 64
//! ```

use std::path::Path;
use std::time::Duration;

use keystone_core::RegistryConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for a [`GameLoop`](crate::GameLoop) run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Registry tuning.
    pub registry: RegistryConfig,
    /// Upper bound on a single frame's delta time, in seconds.
    pub max_delta_secs: f32,
    /// Target frames per second.
    pub target_fps: u32,
    /// Warn about frames that exceed twice the frame budget.
    pub enable_timing_logs: bool,
    /// Frames the demo binary runs before exiting.
    pub frames: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            max_delta_secs: 0.1,
            target_fps: 60,
            enable_timing_logs: false,
            frames: 600,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`SimulationConfig::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be positive".into()));
        }
        if !(self.max_delta_secs.is_finite() && self.max_delta_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_delta_secs must be a positive number, got {}",
                self.max_delta_secs
            )));
        }
        Ok(())
    }

    /// Frame budget derived from `target_fps`.
    #[must_use]
    pub fn target_frame_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }

    /// Fixed delta time, in seconds, for one frame at `target_fps`.
    #[must_use]
    pub fn fixed_delta_secs(&self) -> f32 {
        self.target_frame_time().as_secs_f32()
    }
}
