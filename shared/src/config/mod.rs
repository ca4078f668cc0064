//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT signing and token lifetimes
//! - `cache` - Expiring store (Redis) connection and timeouts
//! - `environment` - Environment detection and log filtering
//! - `otp` - One-time passcode lifecycle
//! - `rate_limit` - Multi-window rate limits and the global budget
//! - `server` - HTTP server and CORS
//!
//! Every struct is validated at load time with explicit numeric bounds;
//! the server refuses to start on an out-of-range value.

pub mod auth;
pub mod cache;
pub mod environment;
pub mod otp;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

// Re-export commonly used types
pub use auth::JwtConfig;
pub use cache::CacheConfig;
pub use environment::Environment;
pub use otp::OtpConfig;
pub use rate_limit::{GlobalRateLimits, LeadRateLimits, OtpRateLimits, RateLimitConfig};
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// OTP configuration
    pub otp: OtpConfig,

    /// Expiring store configuration
    pub cache: CacheConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load and validate the full configuration from the environment.
    ///
    /// Each sub-config validates its own bounds; the first violation
    /// aborts the load.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            otp: OtpConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
        })
    }

    /// Re-validate every section (useful for configs built in code).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.jwt.validate()?;
        self.otp.validate()?;
        self.cache.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }
}
