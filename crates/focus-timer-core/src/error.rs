//! Core error types for focus-timer-core.
//!
//! Engine operations are total apart from a single recoverable case, so most
//! of the hierarchy concerns settings persistence and the audio cue.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::TimerMode;

/// Core error type for focus-timer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer command rejected
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The only way an engine command can be refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// Mode switch on a running timer without the user's go-ahead.
    #[error("timer is running; switching to {target} requires interruption confirmation")]
    InterruptionNotConfirmed { target: TimerMode },
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

    /// Key not present in the settings document
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Audio cue playback errors. Never propagated into engine state.
#[derive(Error, Debug)]
pub enum CueError {
    #[error("cue output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cue player unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for core operations.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_error_converts_into_core_error() {
        let err: CoreError = TimerError::InterruptionNotConfirmed {
            target: TimerMode::LongBreak,
        }
        .into();
        assert!(err.to_string().contains("long_break"));
        assert!(matches!(err, CoreError::Timer(_)));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::UnknownKey("timer.nap_seconds".into());
        assert_eq!(err.to_string(), "unknown config key: timer.nap_seconds");
    }
}
