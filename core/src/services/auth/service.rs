//! Login, refresh, and logout protocol over the security services.
//!
//! This service composes the credential check, the OTP manager, the token
//! service, and the revocation registry into the authentication protocol.
//! It is the only component the HTTP layer calls; the pieces stay
//! separately testable underneath it.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use sn_shared::utils::{is_valid_identifier, mask_identifier};

use crate::domain::entities::{Claims, OtpPurpose, Principal, SessionRecord};
use crate::domain::value_objects::{AuthResponse, OtpTicket, UserInfo};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::services::otp::OtpService;
use crate::services::rate_limit::{RateLimiter, SCOPE_OTP};
use crate::services::revocation::RevocationRegistry;
use crate::services::token::TokenService;
use crate::store::ExpiringStore;

/// Credential verification collaborator (the CRM account store).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Verify a username/password pair, resolving the principal.
    async fn verify_password(&self, username: &str, password: &str) -> DomainResult<Principal>;

    /// Resolve a principal by login identifier.
    async fn find_by_username(&self, username: &str) -> DomainResult<Principal>;

    /// Resolve a principal by account id.
    async fn find_by_id(&self, user_id: Uuid) -> DomainResult<Principal>;

    /// Replace the password after verifying the current one.
    async fn update_password(&self, username: &str, current: &str, new: &str) -> DomainResult<()>;
}

/// The composed token-validity check: signature + expiry + revocation.
///
/// One function, reusable outside the HTTP layer; the auth middleware
/// holds it as a trait object so it never depends on the service's
/// concrete store type.
#[async_trait]
pub trait AccessTokenValidator: Send + Sync {
    async fn authenticate(&self, token: &str) -> DomainResult<Claims>;
}

/// Authentication orchestrator.
///
/// Supports two alternate login protocols: direct password login, and the
/// OTP-gated path where the passcode is a second factor on top of a valid
/// password.
pub struct AuthService<K: ExpiringStore> {
    credentials: Arc<dyn CredentialStore>,
    otp: Arc<OtpService<K>>,
    tokens: Arc<TokenService>,
    revocation: Arc<RevocationRegistry<K>>,
    rate_limiter: Arc<RateLimiter<K>>,
}

impl<K: ExpiringStore> AuthService<K> {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        otp: Arc<OtpService<K>>,
        tokens: Arc<TokenService>,
        revocation: Arc<RevocationRegistry<K>>,
        rate_limiter: Arc<RateLimiter<K>>,
    ) -> Self {
        Self {
            credentials,
            otp,
            tokens,
            revocation,
            rate_limiter,
        }
    }

    /// Direct password login, bypassing OTP.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<AuthResponse> {
        self.check_identifier(username)?;
        let principal = self.credentials.verify_password(username, password).await?;
        info!(
            identifier = %mask_identifier(username),
            "Password login accepted"
        );
        self.issue_session(principal).await
    }

    /// First step of the OTP-gated login: credentials, then a challenge.
    ///
    /// The passcode is a second factor — a challenge is only ever created
    /// for a caller who already proved the password.
    pub async fn request_otp(&self, username: &str, password: &str) -> DomainResult<OtpTicket> {
        self.check_identifier(username)?;
        self.credentials.verify_password(username, password).await?;

        self.rate_limiter
            .admit(SCOPE_OTP, username)
            .await
            .into_result(SCOPE_OTP)?;

        self.otp.request_challenge(username, OtpPurpose::Login).await
    }

    /// Second step of the OTP-gated login: verify the code, issue tokens.
    pub async fn verify_otp_and_login(
        &self,
        username: &str,
        code: &str,
    ) -> DomainResult<AuthResponse> {
        self.check_identifier(username)?;
        self.otp.verify(username, OtpPurpose::Login, code).await?;
        let principal = self.credentials.find_by_username(username).await?;
        info!(
            identifier = %mask_identifier(username),
            "OTP login accepted"
        );
        self.issue_session(principal).await
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// Rotation with revocation: the old refresh token is blacklisted
    /// before the new pair is returned, so a replayed refresh token dies
    /// with `Revoked` instead of minting a second session.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AuthResponse> {
        let claims = self.tokens.verify_refresh(refresh_token)?;

        if self.revocation.is_revoked(&claims.jti).await {
            warn!(jti = %claims.jti, "Replay of a revoked refresh token");
            return Err(DomainError::Token(TokenError::Revoked));
        }

        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::Malformed))?;
        let principal = self.credentials.find_by_id(user_id).await?;

        self.revocation.revoke(&claims).await?;
        self.issue_session(principal).await
    }

    /// Terminal for the session: the access token and its paired refresh
    /// token stop working immediately, ahead of their natural expiry.
    pub async fn logout(&self, access_claims: &Claims) -> DomainResult<()> {
        self.revocation.revoke_session(access_claims).await?;
        info!(jti = %access_claims.jti, "Session logged out");
        Ok(())
    }

    /// Change the password and revoke every outstanding session for the
    /// subject — tokens issued before the change must not survive it.
    pub async fn change_password(
        &self,
        access_claims: &Claims,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let user_id = access_claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::Malformed))?;
        let principal = self.credentials.find_by_id(user_id).await?;

        self.credentials
            .update_password(&principal.username, current_password, new_password)
            .await?;

        let revoked = self.revocation.revoke_all_for_subject(user_id).await?;
        info!(
            identifier = %mask_identifier(&principal.username),
            sessions = revoked,
            "Password changed; outstanding sessions revoked"
        );
        Ok(())
    }

    fn check_identifier(&self, username: &str) -> DomainResult<()> {
        if !is_valid_identifier(username) {
            return Err(AuthError::InvalidIdentifierFormat {
                identifier: mask_identifier(username),
            }
            .into());
        }
        Ok(())
    }

    /// Issue a pair and record the session in the subject index.
    ///
    /// The index write failing surfaces as `StoreUnavailable`: issuing a
    /// session the registry cannot later revoke would silently weaken
    /// logout and password-change guarantees.
    async fn issue_session(&self, principal: Principal) -> DomainResult<AuthResponse> {
        let issued = self.tokens.issue_pair(&principal)?;

        self.revocation
            .track_issuance(
                principal.user_id,
                SessionRecord {
                    access_jti: issued.access_claims.jti.clone(),
                    refresh_jti: issued.refresh_claims.jti.clone(),
                    access_exp: issued.access_claims.exp,
                    refresh_exp: issued.refresh_claims.exp,
                },
            )
            .await?;

        Ok(AuthResponse {
            access_token: issued.pair.access_token,
            refresh_token: issued.pair.refresh_token,
            token_type: issued.pair.token_type,
            expires_in: issued.pair.expires_in,
            expires_at: issued.pair.access_expires_at,
            user: UserInfo {
                id: principal.user_id,
                username: principal.username,
                role: principal.role,
            },
        })
    }
}

#[async_trait]
impl<K: ExpiringStore> AccessTokenValidator for AuthService<K> {
    /// Signature + expiry + revocation, in that order. The revocation
    /// lookup fails open inside the registry, so a store outage degrades
    /// to signature/expiry checking alone.
    async fn authenticate(&self, token: &str) -> DomainResult<Claims> {
        let claims = self.tokens.verify_access(token)?;
        if self.revocation.is_revoked(&claims.jti).await {
            return Err(DomainError::Token(TokenError::Revoked));
        }
        Ok(claims)
    }
}
