//! Error types for simulation setup and configuration.

use thiserror::Error;

/// Errors raised while building or configuring a simulation.
///
/// Nothing raised while stepping the simulation is an error; those
/// conditions are logged and the offending operation is skipped.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration file could not be read or written.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document was not valid JSON for [SimConfig](crate::SimConfig).
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// An unrecognised spawn scheduler mode name.
    #[error("Unknown spawn mode: {0}")]
    UnknownSpawnMode(String),

    /// An unrecognised traffic signal state name.
    #[error("Unknown signal state: {0}")]
    UnknownSignalState(String),

    /// An unrecognised time of day name.
    #[error("Unknown day time: {0}")]
    UnknownDayTime(String),

    /// A configuration value outside its valid range.
    #[error("Invalid config value for {field}: {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    /// A path whose length is zero (or which has fewer than two control points).
    #[error("Path is degenerate")]
    DegeneratePath,
}

/// A specialised result type for simulation setup.
pub type Result<T> = std::result::Result<T, Error>;
