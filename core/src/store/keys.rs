//! Cache key layout.
//!
//! Keys follow a fixed prefix scheme per concern. The layout is
//! load-bearing: operational tooling enumerates keys by prefix, so any
//! change here is a breaking change for that tooling.
//!
//! - `OTP:<PURPOSE>:<identifier>` — pending challenge (JSON)
//! - `OTP_ATTEMPT:<PURPOSE>:<identifier>` — failed-attempt counter
//! - `BLACKLIST:<tokenId>` — revocation fact
//! - `SUBJECT_TOKENS:<userId>` — issued-session index (JSON)
//! - `RATE:<scope>:<identifier>:<window>` — rate-limit counter

use uuid::Uuid;

use crate::domain::entities::OtpPurpose;

pub const OTP_PREFIX: &str = "OTP";
pub const OTP_ATTEMPT_PREFIX: &str = "OTP_ATTEMPT";
pub const BLACKLIST_PREFIX: &str = "BLACKLIST";
pub const SUBJECT_TOKENS_PREFIX: &str = "SUBJECT_TOKENS";
pub const RATE_PREFIX: &str = "RATE";

/// Key of the pending challenge for `(purpose, identifier)`.
pub fn otp_challenge(purpose: OtpPurpose, identifier: &str) -> String {
    format!("{}:{}:{}", OTP_PREFIX, purpose.as_key_segment(), identifier)
}

/// Key of the failed-attempt counter for `(purpose, identifier)`.
pub fn otp_attempts(purpose: OtpPurpose, identifier: &str) -> String {
    format!(
        "{}:{}:{}",
        OTP_ATTEMPT_PREFIX,
        purpose.as_key_segment(),
        identifier
    )
}

/// Key of the revocation fact for a token id.
pub fn blacklist(jti: &str) -> String {
    format!("{}:{}", BLACKLIST_PREFIX, jti)
}

/// Key of the issued-session index for a subject.
pub fn subject_tokens(user_id: Uuid) -> String {
    format!("{}:{}", SUBJECT_TOKENS_PREFIX, user_id)
}

/// Key of one rate-limit window counter.
pub fn rate(scope: &str, identifier: &str, window: &str) -> String {
    format!("{}:{}:{}:{}", RATE_PREFIX, scope, identifier, window)
}
