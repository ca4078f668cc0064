//! Domain-specific error types and error handling.

mod types;

// Re-export all error types and utilities
pub use types::{AuthError, ErrorResponse, OtpError, RateLimitExceeded, TokenError};

use thiserror::Error;

use crate::store::StoreError;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// The expiring store could not be reached. Infrastructure fault,
    /// never a client error: reads fail open where documented, writes
    /// surface this as a 5xx.
    #[error("Security state store unavailable: {message}")]
    StoreUnavailable { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    RateLimit(#[from] RateLimitExceeded),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::StoreUnavailable {
            message: err.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
