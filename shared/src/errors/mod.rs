//! Shared error types for configuration loading and validation.

use thiserror::Error;

/// Errors raised while loading or validating configuration at startup.
///
/// Configuration problems are fatal: the server refuses to boot rather
/// than run with silently-clamped or missing values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration value: {key}")]
    Missing { key: String },

    #[error("Invalid value for {key}: {value} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Value out of range for {key}: {value} (allowed: {min}..={max})")]
    OutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl ConfigError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing { key: key.into() }
    }

    pub fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn out_of_range(key: impl Into<String>, value: i64, min: i64, max: i64) -> Self {
        Self::OutOfRange {
            key: key.into(),
            value,
            min,
            max,
        }
    }
}

/// Check that a numeric configuration value falls inside an inclusive range.
pub fn check_range(key: &str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::out_of_range(key, value, min, max));
    }
    Ok(())
}
