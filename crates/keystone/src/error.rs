//! # Simulation Error Types
//!
//! Configuration loading failures and everything a frame can fail with.

use std::path::PathBuf;

use keystone_core::EcsError;
use thiserror::Error;

/// Errors raised while loading a [`SimulationConfig`](crate::SimulationConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can stop the simulation.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The registry rejected an operation.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for simulation operations.
pub type SimulationResult<T> = Result<T, SimulationError>;
