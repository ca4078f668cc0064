//! Cache (expiring store) configuration module

use serde::{Deserialize, Serialize};

use crate::errors::{check_range, ConfigError};

/// Redis-backed expiring store configuration
///
/// Every store operation carries a bounded timeout so an unavailable
/// cache degrades into a typed error instead of a hung request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Per-operation timeout in milliseconds
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Maximum number of retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (exponential backoff)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            operation_timeout_ms: default_operation_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let operation_timeout_ms = parse_env("REDIS_OPERATION_TIMEOUT_MS")?
            .unwrap_or_else(default_operation_timeout_ms);
        let max_retries = parse_env("REDIS_MAX_RETRIES")?.unwrap_or_else(default_max_retries);
        let retry_delay_ms = parse_env("REDIS_RETRY_DELAY_MS")?.unwrap_or_else(default_retry_delay_ms);

        let config = Self {
            url,
            operation_timeout_ms,
            max_retries,
            retry_delay_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Bounds-check numeric fields. Called at startup; failures are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::missing("REDIS_URL"));
        }
        check_range(
            "REDIS_OPERATION_TIMEOUT_MS",
            self.operation_timeout_ms as i64,
            50,
            30_000,
        )?;
        check_range("REDIS_MAX_RETRIES", self.max_retries as i64, 0, 10)?;
        check_range("REDIS_RETRY_DELAY_MS", self.retry_delay_ms as i64, 10, 10_000)?;
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

fn default_operation_timeout_ms() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}
