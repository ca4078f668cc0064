//! OTP challenge lifecycle: request, deliver, verify.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use sn_shared::config::OtpConfig;
use sn_shared::utils::mask_identifier;

use crate::domain::entities::{OtpChallenge, OtpPurpose, CODE_LENGTH};
use crate::domain::value_objects::OtpTicket;
use crate::errors::{DomainError, DomainResult, OtpError};
use crate::store::{keys, ExpiringStore};

/// Out-of-band code delivery collaborator (SMS, email).
///
/// Fire-and-forget: a delivery failure is logged and does not fail the
/// request, so a sent-but-undelivered code still consumes the cooldown
/// window and cannot be used to trigger resend floods.
#[async_trait]
pub trait OtpDelivery: Send + Sync {
    async fn send(&self, identifier: &str, code: &str, purpose: OtpPurpose)
        -> Result<(), String>;
}

/// Manages one-time passcode challenges in the expiring store.
///
/// The challenge body and the failed-attempt counter live in separate
/// keys: the counter uses the store's atomic increment so concurrent
/// wrong guesses from the same identifier cannot lose updates.
pub struct OtpService<K: ExpiringStore> {
    store: Arc<K>,
    delivery: Arc<dyn OtpDelivery>,
    config: OtpConfig,
}

impl<K: ExpiringStore> OtpService<K> {
    pub fn new(store: Arc<K>, delivery: Arc<dyn OtpDelivery>, config: OtpConfig) -> Self {
        Self {
            store,
            delivery,
            config,
        }
    }

    /// Create and deliver a fresh challenge for `(identifier, purpose)`.
    ///
    /// Fails with `CooldownActive` if a challenge created less than the
    /// configured cooldown ago still exists. Otherwise the new challenge
    /// overwrites any prior one and the attempt counter is reset.
    ///
    /// A store failure here is surfaced as `StoreUnavailable`: reporting
    /// success without the challenge written would make verification
    /// impossible.
    pub async fn request_challenge(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
    ) -> DomainResult<OtpTicket> {
        let challenge_key = keys::otp_challenge(purpose, identifier);
        let attempt_key = keys::otp_attempts(purpose, identifier);

        // Cooldown check against the stored challenge's creation time
        if let Some(raw) = self.store.get(&challenge_key).await? {
            match serde_json::from_str::<OtpChallenge>(&raw) {
                Ok(existing) if !existing.is_expired() => {
                    let elapsed = existing.age_seconds();
                    if elapsed < self.config.resend_cooldown_seconds {
                        let retry_after_seconds = self.config.resend_cooldown_seconds - elapsed;
                        debug!(
                            identifier = %mask_identifier(identifier),
                            purpose = %purpose,
                            retry_after_seconds,
                            "Challenge request rejected: cooldown active"
                        );
                        return Err(OtpError::CooldownActive {
                            retry_after_seconds,
                        }
                        .into());
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        identifier = %mask_identifier(identifier),
                        error = %e,
                        "Discarding unreadable challenge record"
                    );
                }
            }
        }

        let challenge = OtpChallenge::new(
            identifier.to_string(),
            purpose,
            self.config.code_ttl_seconds,
        );
        let payload = serde_json::to_string(&challenge).map_err(|e| DomainError::Internal {
            message: format!("Failed to serialize challenge: {}", e),
        })?;

        // Reset the counter before the new challenge becomes verifiable,
        // so stale failures never count against a fresh code.
        self.store.delete(&attempt_key).await?;
        self.store
            .set(
                &challenge_key,
                &payload,
                self.config.code_ttl_seconds as u64,
            )
            .await?;

        // Fire-and-forget delivery
        if let Err(e) = self
            .delivery
            .send(identifier, &challenge.code, purpose)
            .await
        {
            warn!(
                identifier = %mask_identifier(identifier),
                purpose = %purpose,
                error = %e,
                "OTP delivery failed; challenge remains pending"
            );
        }

        info!(
            identifier = %mask_identifier(identifier),
            purpose = %purpose,
            expires_at = %challenge.expires_at,
            "OTP challenge created"
        );

        Ok(OtpTicket {
            identifier: mask_identifier(identifier),
            purpose,
            expires_at: challenge.expires_at,
            next_request_at: challenge.created_at
                + chrono::Duration::seconds(self.config.resend_cooldown_seconds),
        })
    }

    /// Verify a submitted code against the pending challenge.
    ///
    /// Single-use: a successful verification deletes the challenge, so a
    /// second verification of the same code yields `NotFound`. Once the
    /// attempt counter reaches the configured maximum the challenge is
    /// destroyed even though its TTL has not elapsed, forcing a fresh
    /// request.
    pub async fn verify(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        code: &str,
    ) -> DomainResult<()> {
        let challenge_key = keys::otp_challenge(purpose, identifier);
        let attempt_key = keys::otp_attempts(purpose, identifier);

        // Reject garbage before touching the attempt counter
        if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpError::NotFound.into());
        }

        let raw = match self.store.get(&challenge_key).await? {
            Some(raw) => raw,
            None => return Err(OtpError::NotFound.into()),
        };

        let challenge: OtpChallenge =
            serde_json::from_str(&raw).map_err(|e| DomainError::Internal {
                message: format!("Failed to deserialize challenge: {}", e),
            })?;

        // TTL is the primary expiry; this guards against clock skew
        if challenge.is_expired() {
            self.discard(&challenge_key, &attempt_key).await;
            return Err(OtpError::Expired.into());
        }

        let attempts = match self.store.get(&attempt_key).await? {
            Some(raw) => raw.parse::<u32>().unwrap_or(0),
            None => 0,
        };
        if attempts >= self.config.max_attempts {
            self.discard(&challenge_key, &attempt_key).await;
            info!(
                identifier = %mask_identifier(identifier),
                purpose = %purpose,
                attempts,
                "Challenge destroyed after too many attempts"
            );
            return Err(OtpError::TooManyAttempts.into());
        }

        if !challenge.matches(code) {
            let new_attempts = self
                .store
                .increment(&attempt_key, self.config.code_ttl_seconds as u64)
                .await? as u32;
            debug!(
                identifier = %mask_identifier(identifier),
                purpose = %purpose,
                attempts = new_attempts,
                "Verification code mismatch"
            );
            return Err(OtpError::CodeMismatch {
                remaining_attempts: self.config.max_attempts.saturating_sub(new_attempts),
            }
            .into());
        }

        // Single-use: consume the challenge on success
        self.discard(&challenge_key, &attempt_key).await;
        info!(
            identifier = %mask_identifier(identifier),
            purpose = %purpose,
            "OTP verified"
        );
        Ok(())
    }

    /// Best-effort removal of a challenge and its counter. The TTL cleans
    /// up anything a failed delete leaves behind.
    async fn discard(&self, challenge_key: &str, attempt_key: &str) {
        if let Err(e) = self.store.delete(challenge_key).await {
            warn!(key = challenge_key, error = %e, "Failed to delete challenge");
        }
        if let Err(e) = self.store.delete(attempt_key).await {
            warn!(key = attempt_key, error = %e, "Failed to delete attempt counter");
        }
    }
}
