//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use crate::errors::{check_range, ConfigError};

/// Rate limiting configuration
///
/// Each public-facing scope carries one counter per time window; a request
/// is admitted only when every window for its scope agrees.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Lead-intake limits (keyed by client IP)
    pub lead: LeadRateLimits,

    /// OTP request limits (keyed by identifier)
    pub otp: OtpRateLimits,

    /// Global request budget for the whole public surface
    pub global: GlobalRateLimits,
}

/// Lead-intake limits, per client IP
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeadRateLimits {
    /// Max lead submissions per IP per hour
    pub per_ip_per_hour: u32,

    /// Max lead submissions per IP per day
    pub per_ip_per_day: u32,
}

impl Default for LeadRateLimits {
    fn default() -> Self {
        Self {
            per_ip_per_hour: 1000,
            per_ip_per_day: 5000,
        }
    }
}

/// OTP request limits, per identifier
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpRateLimits {
    /// Max OTP challenge requests per identifier per hour
    pub per_identifier_per_hour: u32,
}

impl Default for OtpRateLimits {
    fn default() -> Self {
        Self {
            per_identifier_per_hour: 5,
        }
    }
}

/// Global request budget, independent of per-client behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalRateLimits {
    /// Max public requests across all clients per minute
    pub requests_per_minute: u32,
}

impl Default for GlobalRateLimits {
    fn default() -> Self {
        Self {
            requests_per_minute: 10_000,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            lead: LeadRateLimits::default(),
            otp: OtpRateLimits::default(),
            global: GlobalRateLimits::default(),
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|raw| raw != "false" && raw != "0")
            .unwrap_or_else(|_| default_enabled());

        let config = Self {
            enabled,
            lead: LeadRateLimits {
                per_ip_per_hour: parse_env("RATE_LIMIT_LEAD_PER_IP_PER_HOUR")?
                    .unwrap_or(LeadRateLimits::default().per_ip_per_hour),
                per_ip_per_day: parse_env("RATE_LIMIT_LEAD_PER_IP_PER_DAY")?
                    .unwrap_or(LeadRateLimits::default().per_ip_per_day),
            },
            otp: OtpRateLimits {
                per_identifier_per_hour: parse_env("RATE_LIMIT_OTP_PER_HOUR")?
                    .unwrap_or(OtpRateLimits::default().per_identifier_per_hour),
            },
            global: GlobalRateLimits {
                requests_per_minute: parse_env("RATE_LIMIT_GLOBAL_PER_MINUTE")?
                    .unwrap_or(GlobalRateLimits::default().requests_per_minute),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Bounds-check the configuration. Called at startup; failures are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "RATE_LIMIT_LEAD_PER_IP_PER_HOUR",
            self.lead.per_ip_per_hour as i64,
            1,
            1_000_000,
        )?;
        check_range(
            "RATE_LIMIT_LEAD_PER_IP_PER_DAY",
            self.lead.per_ip_per_day as i64,
            1,
            10_000_000,
        )?;
        if self.lead.per_ip_per_day < self.lead.per_ip_per_hour {
            return Err(ConfigError::invalid(
                "RATE_LIMIT_LEAD_PER_IP_PER_DAY",
                self.lead.per_ip_per_day.to_string(),
                "daily limit cannot be lower than the hourly limit",
            ));
        }
        check_range(
            "RATE_LIMIT_OTP_PER_HOUR",
            self.otp.per_identifier_per_hour as i64,
            1,
            1_000,
        )?;
        check_range(
            "RATE_LIMIT_GLOBAL_PER_MINUTE",
            self.global.requests_per_minute as i64,
            1,
            10_000_000,
        )?;
        Ok(())
    }
}

fn parse_env(key: &str) -> Result<Option<u32>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ConfigError::invalid(key, raw, "not a valid number")),
        Err(_) => Ok(None),
    }
}

fn default_enabled() -> bool {
    true
}
