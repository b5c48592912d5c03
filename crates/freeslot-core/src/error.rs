//! Core error types for freeslot-core.
//!
//! Construction and parsing of engine inputs return these errors; the
//! engine computations themselves are total over validated input.

use std::path::PathBuf;
use thiserror::Error;

use crate::time::TimeOfDay;

/// Core error type for freeslot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
///
/// Raised when an entity handed to the engine is malformed. The offending
/// entity is rejected and nothing else is affected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Window whose start is not before its end
    #[error("Invalid time range: end ({end}) must be later than start ({start})")]
    InvalidTimeRange { start: TimeOfDay, end: TimeOfDay },

    /// Unparseable or out-of-range time of day
    #[error("Invalid time of day '{0}': expected HH:MM between 00:00 and 23:59")]
    InvalidTimeOfDay(String),

    /// Day outside Monday..Friday or unknown name
    #[error("Unsupported weekday '{0}': only Mon-Fri can be scheduled")]
    UnsupportedWeekday(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Recommendation and task do not refer to the same task
    #[error("Recommendation is for task '{expected}' but task '{actual}' was given")]
    TaskMismatch { expected: String, actual: String },

    /// Two tasks share an id
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),

    /// No task with this id
    #[error("Unknown task id: {0}")]
    UnknownTask(String),
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
