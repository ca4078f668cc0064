//! # Serena Shared
//!
//! Shared configuration, error types, and utilities used across the
//! Serena backend crates. This crate has no I/O of its own; it holds the
//! validated configuration structs and small helpers the other layers
//! agree on.

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{
    AppConfig, CacheConfig, Environment, JwtConfig, OtpConfig, RateLimitConfig, ServerConfig,
};
pub use errors::ConfigError;
