//! # Serena Infrastructure
//!
//! Concrete implementations of the core's collaborator interfaces: the
//! Redis-backed expiring store (plus an in-memory variant for development
//! and tests), SMS delivery of one-time passcodes, and the MySQL
//! credential store.

pub mod cache;
pub mod database;
pub mod sms;

use thiserror::Error;

/// Infrastructure setup and connection errors.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
