//! One-time passcode challenge entity.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the one-time passcode
pub const CODE_LENGTH: usize = 6;

/// What a challenge authorizes once verified.
///
/// A challenge is stored under a key derived from `(purpose, identifier)`,
/// so a login code can never be replayed to confirm a phone change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpPurpose {
    Login,
    ResetPassword,
    VerifyAccount,
    ChangePhone,
    ChangeEmail,
}

impl OtpPurpose {
    /// Stable key segment for this purpose, used in cache key layout.
    pub fn as_key_segment(&self) -> &'static str {
        match self {
            OtpPurpose::Login => "LOGIN",
            OtpPurpose::ResetPassword => "RESET_PASSWORD",
            OtpPurpose::VerifyAccount => "VERIFY_ACCOUNT",
            OtpPurpose::ChangePhone => "CHANGE_PHONE",
            OtpPurpose::ChangeEmail => "CHANGE_EMAIL",
        }
    }
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key_segment())
    }
}

/// One-time passcode challenge, serialized as JSON into the expiring store.
///
/// The failed-attempt counter is deliberately NOT part of this entity: it
/// lives in its own store key so concurrent failed attempts use the
/// store's atomic increment instead of rewriting this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// Identifier the code was sent to
    pub identifier: String,

    /// The 6-digit passcode
    pub code: String,

    /// What a successful verification authorizes
    pub purpose: OtpPurpose,

    /// Timestamp when the challenge was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the challenge expires
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Creates a new challenge with a cryptographically random 6-digit code.
    pub fn new(identifier: String, purpose: OtpPurpose, ttl_seconds: i64) -> Self {
        let now = Utc::now();

        Self {
            identifier,
            code: Self::generate_code(),
            purpose,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_seconds),
        }
    }

    /// Generates a random zero-padded 6-digit code.
    fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        let code: u32 = rng.gen_range(0..1_000_000);
        format!("{:06}", code)
    }

    /// Whether the challenge has passed its expiry instant.
    ///
    /// The store's TTL is the primary expiry mechanism; this check guards
    /// against clock skew between service instances and the store.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Seconds since this challenge was created.
    pub fn age_seconds(&self) -> i64 {
        (Utc::now() - self.created_at).num_seconds()
    }

    /// Constant-time comparison of a submitted code against this challenge.
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), submitted.as_bytes())
    }
}
