//! Token entities for JWT-based authentication.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::Role;

/// Token type reported to clients
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Discriminates access tokens from refresh tokens.
///
/// Both token kinds share one signing key, so the claim set itself must
/// say which protocol step a token is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Staff role
    pub role: Role,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token; revocation handle)
    pub jti: String,

    /// Whether this is an access or refresh token
    pub token_use: TokenUse,
}

impl Claims {
    /// Creates a fresh claim set with a random `jti`.
    pub fn new(
        user_id: Uuid,
        role: Role,
        token_use: TokenUse,
        ttl_seconds: i64,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_seconds,
            nbf: now.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_use,
        }
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Expiry instant of this token
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Seconds of lifetime left; zero or negative once expired
    pub fn remaining_lifetime_seconds(&self) -> i64 {
        self.exp - Utc::now().timestamp()
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signed token pair handed to the client after authentication.
///
/// The server keeps no copy of the token bodies; only revocation facts
/// keyed by `jti` are ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer token
    pub access_token: String,

    /// Long-lived token used solely to mint new access tokens
    pub refresh_token: String,

    /// Token type for the Authorization header
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Access token expiry instant
    pub access_expires_at: DateTime<Utc>,

    /// Refresh token expiry instant
    pub refresh_expires_at: DateTime<Utc>,
}

/// One issued session in the per-subject index.
///
/// Kept under `SUBJECT_TOKENS:<userId>` so logout can reach the refresh
/// token paired with an access token, and password changes can revoke
/// every outstanding session without holding the token bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// JWT ID of the access token
    pub access_jti: String,

    /// JWT ID of the paired refresh token
    pub refresh_jti: String,

    /// Access token expiry timestamp
    pub access_exp: i64,

    /// Refresh token expiry timestamp
    pub refresh_exp: i64,
}

impl SessionRecord {
    /// Whether any token of this session could still be accepted.
    pub fn is_live(&self, now: i64) -> bool {
        self.refresh_exp > now || self.access_exp > now
    }
}
