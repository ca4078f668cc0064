//! Authentication and JWT configuration module

use serde::{Deserialize, Serialize};

use crate::errors::{check_range, ConfigError};

/// Minimum length accepted for the JWT signing secret
const MIN_SECRET_LENGTH: usize = 32;

/// JWT signing and lifetime configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Symmetric signing secret (HS256)
    pub secret: String,

    /// Token issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Token audience claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_seconds: i64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_seconds: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: default_issuer(),
            audience: default_audience(),
            access_token_ttl_seconds: default_access_ttl(),
            refresh_token_ttl_seconds: default_refresh_ttl(),
        }
    }
}

impl JwtConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::missing("JWT_SECRET"))?;
        let issuer = std::env::var("JWT_ISSUER").unwrap_or_else(|_| default_issuer());
        let audience = std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| default_audience());
        let access_token_ttl_seconds =
            parse_env("JWT_ACCESS_TTL_SECONDS")?.unwrap_or_else(default_access_ttl);
        let refresh_token_ttl_seconds =
            parse_env("JWT_REFRESH_TTL_SECONDS")?.unwrap_or_else(default_refresh_ttl);

        let config = Self {
            secret,
            issuer,
            audience,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Bounds-check the configuration. Called at startup; failures are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                "***",
                format!("secret must be at least {} bytes", MIN_SECRET_LENGTH),
            ));
        }
        // Access tokens: 1 minute to 24 hours
        check_range(
            "JWT_ACCESS_TTL_SECONDS",
            self.access_token_ttl_seconds,
            60,
            86_400,
        )?;
        // Refresh tokens: 1 hour to 90 days, and strictly longer than access
        check_range(
            "JWT_REFRESH_TTL_SECONDS",
            self.refresh_token_ttl_seconds,
            3_600,
            90 * 86_400,
        )?;
        if self.refresh_token_ttl_seconds <= self.access_token_ttl_seconds {
            return Err(ConfigError::invalid(
                "JWT_REFRESH_TTL_SECONDS",
                self.refresh_token_ttl_seconds.to_string(),
                "refresh token lifetime must exceed access token lifetime",
            ));
        }
        Ok(())
    }
}

fn parse_env(key: &str) -> Result<Option<i64>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConfigError::invalid(key, raw, "not a valid number")),
        Err(_) => Ok(None),
    }
}

fn default_issuer() -> String {
    "serena".to_string()
}

fn default_audience() -> String {
    "serena-api".to_string()
}

fn default_access_ttl() -> i64 {
    3600 // 1 hour
}

fn default_refresh_ttl() -> i64 {
    7 * 86_400 // 7 days
}
