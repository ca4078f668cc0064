//! API process configuration: the validated application config plus the
//! wiring choices (which store, delivery, and credential backends).

use sn_shared::config::AppConfig;
use sn_shared::errors::ConfigError;

/// Backend selector for the expiring store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

/// Backend selector for OTP delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsProvider {
    Twilio,
    Mock,
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Validated application configuration
    pub app: AppConfig,

    /// Expiring store backend (`STORE_BACKEND`: "redis" | "memory")
    pub store_backend: StoreBackend,

    /// OTP delivery provider (`SMS_PROVIDER`: "twilio" | "mock")
    pub sms_provider: SmsProvider,

    /// MySQL connection string; absent means in-memory dev accounts
    pub database_url: Option<String>,

    /// Pool size for the MySQL credential store
    pub database_max_connections: u32,
}

impl Config {
    /// Load and validate everything. A bad value refuses to boot.
    pub fn from_env() -> Result<Self, ConfigError> {
        let app = AppConfig::from_env()?;

        let store_backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "redis".to_string())
            .to_lowercase()
            .as_str()
        {
            "redis" => StoreBackend::Redis,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::invalid(
                    "STORE_BACKEND",
                    other,
                    "expected \"redis\" or \"memory\"",
                ))
            }
        };

        let sms_provider = match std::env::var("SMS_PROVIDER")
            .unwrap_or_else(|_| "mock".to_string())
            .to_lowercase()
            .as_str()
        {
            "twilio" => SmsProvider::Twilio,
            "mock" => SmsProvider::Mock,
            other => {
                return Err(ConfigError::invalid(
                    "SMS_PROVIDER",
                    other,
                    "expected \"twilio\" or \"mock\"",
                ))
            }
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        let database_max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|_| {
                ConfigError::invalid("DATABASE_MAX_CONNECTIONS", raw, "not a valid number")
            })?,
            Err(_) => 10,
        };

        // The production store is Redis; memory is a single-instance dev
        // convenience and must never carry production revocations
        if app.environment.is_production() && store_backend == StoreBackend::Memory {
            return Err(ConfigError::invalid(
                "STORE_BACKEND",
                "memory",
                "the in-memory store cannot be used in production",
            ));
        }

        Ok(Self {
            app,
            store_backend,
            sms_provider,
            database_url,
            database_max_connections,
        })
    }
}
