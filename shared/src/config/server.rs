//! HTTP server configuration module

use serde::{Deserialize, Serialize};

use crate::errors::{check_range, ConfigError};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host/interface to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Comma-separated list of allowed CORS origins (production)
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Max age in seconds for CORS preflight caching
    #[serde(default = "default_cors_max_age")]
    pub cors_max_age: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
            cors_max_age: default_cors_max_age(),
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid("SERVER_PORT", raw, "not a valid port"))?,
            Err(_) => 8080,
        };
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let cors_max_age = std::env::var("CORS_MAX_AGE")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(default_cors_max_age);

        let config = Self {
            host,
            port,
            allowed_origins,
            cors_max_age,
        };
        config.validate()?;
        Ok(config)
    }

    /// Bounds-check numeric fields. Called at startup; failures are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::missing("SERVER_HOST"));
        }
        check_range("CORS_MAX_AGE", self.cors_max_age as i64, 0, 86_400)?;
        Ok(())
    }

    /// Bind address in `host:port` form
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_cors_max_age() -> usize {
    3600
}
