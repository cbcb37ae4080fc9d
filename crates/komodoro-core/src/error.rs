//! Core error types for komodoro-core.
//!
//! Configuration problems are the only errors a caller is expected to handle;
//! every control operation on a constructed engine is total.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for komodoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Countdown clock errors
    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),

    /// The engine was constructed outside of a tokio runtime
    #[error("No tokio runtime available to drive the timer")]
    NoRuntime,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization errors
    #[error("TOML write error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
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
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised when creating a [`PhaseClock`](crate::timer::PhaseClock).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The countdown must start from a positive duration
    #[error("countdown duration must be positive")]
    ZeroDuration,

    /// The tick interval must be positive
    #[error("tick interval must be positive")]
    ZeroTick,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
