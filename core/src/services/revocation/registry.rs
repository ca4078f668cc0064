//! Server-side token blacklist over the expiring store.
//!
//! A revocation fact is keyed by `jti` with TTL equal to the token's
//! remaining lifetime, so the entry self-expires exactly when the token
//! would have died anyway and the blacklist never grows beyond the set of
//! live-but-revoked tokens.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::{Claims, SessionRecord};
use crate::errors::DomainResult;
use crate::store::{keys, ExpiringStore};

const REVOKED_MARKER: &str = "revoked";

/// Registry of revoked token ids plus the per-subject session index.
pub struct RevocationRegistry<K: ExpiringStore> {
    store: Arc<K>,
}

impl<K: ExpiringStore> RevocationRegistry<K> {
    pub fn new(store: Arc<K>) -> Self {
        Self { store }
    }

    /// Blacklist a token for the rest of its natural lifetime.
    ///
    /// A write failure propagates as `StoreUnavailable`: pretending the
    /// token was revoked when no fact was recorded would be a false
    /// success on a logout-sensitive path.
    pub async fn revoke(&self, claims: &Claims) -> DomainResult<()> {
        self.revoke_jti(&claims.jti, claims.exp).await
    }

    async fn revoke_jti(&self, jti: &str, exp: i64) -> DomainResult<()> {
        let remaining = exp - Utc::now().timestamp();
        if remaining <= 0 {
            debug!(jti, "Skipping revocation of already-expired token");
            return Ok(());
        }
        self.store
            .set(&keys::blacklist(jti), REVOKED_MARKER, remaining as u64)
            .await?;
        info!(jti, ttl_seconds = remaining, "Token revoked");
        Ok(())
    }

    /// Whether a token id has been revoked.
    ///
    /// Fails OPEN on store outage: a cache blip must not lock out every
    /// authenticated user, so an unreachable store reads as not-revoked
    /// with a logged warning.
    pub async fn is_revoked(&self, jti: &str) -> bool {
        match self.store.exists(&keys::blacklist(jti)).await {
            Ok(revoked) => revoked,
            Err(e) => {
                warn!(
                    jti,
                    error = %e,
                    "Revocation lookup failed; failing open"
                );
                false
            }
        }
    }

    /// Record a freshly issued session in the subject index.
    ///
    /// The index is what lets `revoke_all_for_subject` and paired-refresh
    /// revocation reach tokens the server otherwise has no handle on.
    /// Rewriting the list is a read-modify-write; concurrent logins of
    /// the same subject may race, which at worst drops one session record
    /// and is accepted (only counters demand store-side atomicity).
    pub async fn track_issuance(
        &self,
        subject: Uuid,
        session: SessionRecord,
    ) -> DomainResult<()> {
        let key = keys::subject_tokens(subject);
        let now = Utc::now().timestamp();

        let mut sessions = self.load_sessions(&key).await?;
        sessions.retain(|s| s.is_live(now));
        sessions.push(session);

        self.save_sessions(&key, &sessions, now).await
    }

    /// Revoke an entire session given its access-token claims: the access
    /// token itself and, if the session was tracked, its paired refresh
    /// token.
    pub async fn revoke_session(&self, access_claims: &Claims) -> DomainResult<()> {
        self.revoke(access_claims).await?;

        let subject = match access_claims.user_id() {
            Ok(id) => id,
            Err(_) => return Ok(()),
        };
        let key = keys::subject_tokens(subject);
        let now = Utc::now().timestamp();

        let mut sessions = self.load_sessions(&key).await?;
        if let Some(record) = sessions
            .iter()
            .find(|s| s.access_jti == access_claims.jti)
            .cloned()
        {
            self.revoke_jti(&record.refresh_jti, record.refresh_exp)
                .await?;
            sessions.retain(|s| s.access_jti != record.access_jti);
        }
        sessions.retain(|s| s.is_live(now));

        self.save_sessions(&key, &sessions, now).await
    }

    /// Revoke every outstanding token for a subject (password change,
    /// account compromise). Returns the number of sessions revoked.
    pub async fn revoke_all_for_subject(&self, subject: Uuid) -> DomainResult<usize> {
        let key = keys::subject_tokens(subject);
        let now = Utc::now().timestamp();

        let sessions = self.load_sessions(&key).await?;
        let mut revoked = 0;
        for session in sessions.iter().filter(|s| s.is_live(now)) {
            self.revoke_jti(&session.access_jti, session.access_exp)
                .await?;
            self.revoke_jti(&session.refresh_jti, session.refresh_exp)
                .await?;
            revoked += 1;
        }
        self.store.delete(&key).await?;

        info!(subject = %subject, sessions = revoked, "All sessions revoked for subject");
        Ok(revoked)
    }

    async fn load_sessions(&self, key: &str) -> DomainResult<Vec<SessionRecord>> {
        match self.store.get(key).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(sessions) => Ok(sessions),
                Err(e) => {
                    warn!(key, error = %e, "Discarding unreadable session index");
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    async fn save_sessions(
        &self,
        key: &str,
        sessions: &[SessionRecord],
        now: i64,
    ) -> DomainResult<()> {
        if sessions.is_empty() {
            self.store.delete(key).await?;
            return Ok(());
        }

        // Index lives as long as its longest-lived member
        let ttl = sessions
            .iter()
            .map(|s| s.refresh_exp.max(s.access_exp))
            .max()
            .unwrap_or(now)
            - now;
        if ttl <= 0 {
            self.store.delete(key).await?;
            return Ok(());
        }

        let payload = serde_json::to_string(sessions).map_err(|e| {
            crate::errors::DomainError::Internal {
                message: format!("Failed to serialize session index: {}", e),
            }
        })?;
        self.store.set(key, &payload, ttl as u64).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Role, TokenUse};
    use crate::services::test_support::{FailingStore, InMemoryStore};

    fn claims(ttl: i64) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            Role::Staff,
            TokenUse::Access,
            ttl,
            "serena",
            "serena-api",
        )
    }

    fn session_for(access: &Claims) -> SessionRecord {
        SessionRecord {
            access_jti: access.jti.clone(),
            refresh_jti: Uuid::new_v4().to_string(),
            access_exp: access.exp,
            refresh_exp: access.exp + 86_400,
        }
    }

    #[tokio::test]
    async fn test_revoke_then_lookup() {
        let store = Arc::new(InMemoryStore::new());
        let registry = RevocationRegistry::new(store);
        let claims = claims(3600);

        assert!(!registry.is_revoked(&claims.jti).await);
        registry.revoke(&claims).await.unwrap();
        assert!(registry.is_revoked(&claims.jti).await);
    }

    #[tokio::test]
    async fn test_expired_token_is_not_written() {
        let store = Arc::new(InMemoryStore::new());
        let registry = RevocationRegistry::new(store.clone());
        let claims = claims(-10);

        registry.revoke(&claims).await.unwrap();
        // Nothing to blacklist: the token can no longer pass verification
        assert!(!store
            .exists(&keys::blacklist(&claims.jti))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_lookup_fails_open_on_store_outage() {
        let registry = RevocationRegistry::new(Arc::new(FailingStore));
        assert!(!registry.is_revoked("any-jti").await);
    }

    #[tokio::test]
    async fn test_revoke_write_failure_surfaces() {
        let registry = RevocationRegistry::new(Arc::new(FailingStore));
        let err = registry.revoke(&claims(3600)).await.unwrap_err();
        assert!(matches!(
            err,
            crate::errors::DomainError::StoreUnavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_revoke_session_reaches_paired_refresh() {
        let store = Arc::new(InMemoryStore::new());
        let registry = RevocationRegistry::new(store);
        let access = claims(3600);
        let subject = access.user_id().unwrap();
        let session = session_for(&access);
        let refresh_jti = session.refresh_jti.clone();

        registry.track_issuance(subject, session).await.unwrap();
        registry.revoke_session(&access).await.unwrap();

        assert!(registry.is_revoked(&access.jti).await);
        assert!(registry.is_revoked(&refresh_jti).await);
    }

    #[tokio::test]
    async fn test_revoke_all_for_subject() {
        let store = Arc::new(InMemoryStore::new());
        let registry = RevocationRegistry::new(store);

        let first = claims(3600);
        let subject = first.user_id().unwrap();
        let mut second = claims(3600);
        second.sub = first.sub.clone();

        let s1 = session_for(&first);
        let s2 = session_for(&second);
        registry.track_issuance(subject, s1.clone()).await.unwrap();
        registry.track_issuance(subject, s2.clone()).await.unwrap();

        let revoked = registry.revoke_all_for_subject(subject).await.unwrap();
        assert_eq!(revoked, 2);
        for jti in [&s1.access_jti, &s1.refresh_jti, &s2.access_jti, &s2.refresh_jti] {
            assert!(registry.is_revoked(jti).await);
        }
    }

    #[tokio::test]
    async fn test_revoke_all_with_no_sessions_is_noop() {
        let store = Arc::new(InMemoryStore::new());
        let registry = RevocationRegistry::new(store);
        let revoked = registry
            .revoke_all_for_subject(Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(revoked, 0);
    }
}
