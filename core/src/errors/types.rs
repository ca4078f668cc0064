//! Specific error families for authentication, OTP, token, and
//! rate-limiting operations, plus the unified API error payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid identifier format: {identifier}")]
    InvalidIdentifierFormat { identifier: String },
}

/// One-time passcode errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    /// No pending challenge. Also covers an already-consumed challenge;
    /// the two cases are indistinguishable on purpose.
    #[error("No pending verification code")]
    NotFound,

    #[error("Verification code expired")]
    Expired,

    #[error("Verification code mismatch")]
    CodeMismatch { remaining_attempts: u32 },

    #[error("Maximum verification attempts exceeded")]
    TooManyAttempts,

    #[error("A code was sent recently; retry in {retry_after_seconds} seconds")]
    CooldownActive { retry_after_seconds: i64 },
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token format")]
    Malformed,

    #[error("Token signature verification failed")]
    SignatureInvalid,

    #[error("Token expired")]
    Expired,

    #[error("Token not yet valid")]
    NotYetValid,

    #[error("Token revoked")]
    Revoked,

    #[error("Wrong token type for this operation")]
    WrongTokenUse,

    #[error("Token generation failed")]
    GenerationFailed,
}

/// Rate limit denial, carrying which window tripped so the caller can
/// report an accurate retry-after.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Rate limit exceeded for {scope} ({window} window); retry in {retry_after_seconds} seconds")]
pub struct RateLimitExceeded {
    /// Scope the limit belongs to (e.g. "lead", "global")
    pub scope: String,

    /// Window that tripped ("minute", "hourly", "daily")
    pub window: String,

    /// Seconds until the window rolls over
    pub retry_after_seconds: u64,
}

/// Unified error response structure for API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a single detail to the error response
    pub fn with_detail(mut self, key: impl ToString, value: serde_json::Value) -> Self {
        let mut details = self.details.unwrap_or_default();
        details.insert(key.to_string(), value);
        self.details = Some(details);
        self
    }
}

impl From<&crate::errors::DomainError> for ErrorResponse {
    /// Build the client-facing payload for a domain error.
    ///
    /// `NotFound`, `Expired`, and `CodeMismatch` collapse into one
    /// `INVALID_OTP` payload: a failed verification must not reveal
    /// whether a challenge exists for the identifier.
    fn from(err: &crate::errors::DomainError) -> Self {
        use crate::errors::DomainError;

        match err {
            DomainError::Validation { message } => Self::new("VALIDATION_ERROR", message),
            DomainError::Internal { .. } => {
                Self::new("INTERNAL_ERROR", "An internal error occurred")
            }
            DomainError::StoreUnavailable { .. } => Self::new(
                "SERVICE_UNAVAILABLE",
                "Service temporarily unavailable, please retry",
            ),
            DomainError::Auth(auth) => match auth {
                AuthError::InvalidCredentials => Self::new("INVALID_CREDENTIALS", auth.to_string()),
                AuthError::InvalidIdentifierFormat { .. } => {
                    Self::new("INVALID_IDENTIFIER", auth.to_string())
                }
            },
            DomainError::Otp(otp) => match otp {
                OtpError::NotFound | OtpError::Expired | OtpError::CodeMismatch { .. } => {
                    Self::new("INVALID_OTP", "Invalid or expired verification code")
                }
                OtpError::TooManyAttempts => Self::new("OTP_MAX_ATTEMPTS", otp.to_string()),
                OtpError::CooldownActive {
                    retry_after_seconds,
                } => Self::new("OTP_COOLDOWN", otp.to_string())
                    .with_detail("retry_after_seconds", serde_json::json!(retry_after_seconds)),
            },
            DomainError::Token(token) => match token {
                TokenError::Expired => Self::new("TOKEN_EXPIRED", token.to_string()),
                TokenError::Revoked => Self::new("TOKEN_REVOKED", token.to_string()),
                _ => Self::new("INVALID_TOKEN", "Invalid authentication token"),
            },
            DomainError::RateLimit(limit) => Self::new("RATE_LIMIT_EXCEEDED", limit.to_string())
                .with_detail("window", serde_json::json!(limit.window))
                .with_detail(
                    "retry_after_seconds",
                    serde_json::json!(limit.retry_after_seconds),
                ),
        }
    }
}
