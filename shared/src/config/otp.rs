//! One-time passcode configuration module

use serde::{Deserialize, Serialize};

use crate::errors::{check_range, ConfigError};

/// OTP challenge lifecycle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Seconds a challenge stays verifiable after creation
    #[serde(default = "default_code_ttl")]
    pub code_ttl_seconds: i64,

    /// Maximum failed verification attempts before the challenge is destroyed
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Minimum seconds between challenge requests for the same
    /// (identifier, purpose) pair
    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_seconds: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: default_code_ttl(),
            max_attempts: default_max_attempts(),
            resend_cooldown_seconds: default_resend_cooldown(),
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let code_ttl_seconds = parse_env("OTP_CODE_TTL_SECONDS")?.unwrap_or_else(default_code_ttl);
        let max_attempts = parse_env("OTP_MAX_ATTEMPTS")?.unwrap_or_else(default_max_attempts);
        let resend_cooldown_seconds =
            parse_env("OTP_RESEND_COOLDOWN_SECONDS")?.unwrap_or_else(default_resend_cooldown);

        let config = Self {
            code_ttl_seconds,
            max_attempts,
            resend_cooldown_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Bounds-check the configuration. Called at startup; failures are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("OTP_CODE_TTL_SECONDS", self.code_ttl_seconds, 60, 1_800)?;
        check_range("OTP_MAX_ATTEMPTS", self.max_attempts as i64, 1, 10)?;
        check_range(
            "OTP_RESEND_COOLDOWN_SECONDS",
            self.resend_cooldown_seconds,
            10,
            600,
        )?;
        if self.resend_cooldown_seconds >= self.code_ttl_seconds {
            return Err(ConfigError::invalid(
                "OTP_RESEND_COOLDOWN_SECONDS",
                self.resend_cooldown_seconds.to_string(),
                "cooldown must be shorter than the code lifetime",
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::invalid(key, raw, "not a valid number")),
        Err(_) => Ok(None),
    }
}

fn default_code_ttl() -> i64 {
    300 // 5 minutes
}

fn default_max_attempts() -> u32 {
    5
}

fn default_resend_cooldown() -> i64 {
    60
}
