//! Authentication response value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, Role};

/// Public account details attached to a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Result of a successful login, OTP verification, or token refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Short-lived bearer token
    pub access_token: String,

    /// Long-lived refresh token
    pub refresh_token: String,

    /// Token type for the Authorization header ("Bearer")
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Access token expiry instant
    pub expires_at: DateTime<Utc>,

    /// Authenticated account details
    pub user: UserInfo,
}

/// Acknowledgement of an accepted OTP challenge request.
///
/// Deliberately does not echo the code; the only way to learn it is the
/// delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpTicket {
    /// Identifier the code was sent to (masked for display)
    pub identifier: String,

    /// Purpose of the pending challenge
    pub purpose: OtpPurpose,

    /// When the pending challenge expires
    pub expires_at: DateTime<Utc>,

    /// Earliest instant a new code may be requested
    pub next_request_at: DateTime<Utc>,
}
