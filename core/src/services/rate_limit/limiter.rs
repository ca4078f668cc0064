//! Fixed-window counters over the expiring store.
//!
//! One counter per `(scope, identifier, window)`; a request is admitted
//! only when every window configured for its scope agrees. Counters are
//! advanced with the store's atomic increment — an application-level
//! read-modify-write would let two concurrent requests both observe the
//! pre-increment count and both pass.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use sn_shared::config::RateLimitConfig;

use crate::errors::{DomainError, RateLimitExceeded};
use crate::store::{keys, ExpiringStore};

/// Scope for public lead submissions, keyed by client IP
pub const SCOPE_LEAD: &str = "lead";

/// Scope for OTP challenge requests, keyed by identifier
pub const SCOPE_OTP: &str = "otp";

/// Scope for the global request budget
pub const SCOPE_GLOBAL: &str = "global";

/// The single identifier under the global scope
pub const GLOBAL_IDENTIFIER: &str = "all";

/// Time bucket a counter accumulates over before rolling to a new key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWindow {
    Minute,
    Hourly,
    Daily,
}

impl RateWindow {
    pub fn seconds(&self) -> u64 {
        match self {
            RateWindow::Minute => 60,
            RateWindow::Hourly => 3_600,
            RateWindow::Daily => 86_400,
        }
    }

    /// Stable key segment, also used in denial responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            RateWindow::Minute => "minute",
            RateWindow::Hourly => "hourly",
            RateWindow::Daily => "daily",
        }
    }
}

impl std::fmt::Display for RateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One window's budget within a scope.
#[derive(Debug, Clone, Copy)]
pub struct WindowLimit {
    pub window: RateWindow,
    pub max: u32,
}

/// Admission decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Denied, naming the window that tripped so the caller can report an
    /// accurate retry-after.
    Denied {
        window: RateWindow,
        retry_after_seconds: u64,
    },
}

impl Admission {
    /// Convert a denial into the domain error for a given scope.
    pub fn into_result(self, scope: &str) -> Result<(), DomainError> {
        match self {
            Admission::Allowed => Ok(()),
            Admission::Denied {
                window,
                retry_after_seconds,
            } => Err(RateLimitExceeded {
                scope: scope.to_string(),
                window: window.as_str().to_string(),
                retry_after_seconds,
            }
            .into()),
        }
    }
}

/// Fixed-window rate limiter over the expiring store.
pub struct RateLimiter<K: ExpiringStore> {
    store: Arc<K>,
    policies: HashMap<String, Vec<WindowLimit>>,
    enabled: bool,
}

impl<K: ExpiringStore> RateLimiter<K> {
    /// Build the standard scope set from configuration.
    pub fn new(store: Arc<K>, config: &RateLimitConfig) -> Self {
        let mut policies = HashMap::new();
        policies.insert(
            SCOPE_LEAD.to_string(),
            vec![
                WindowLimit {
                    window: RateWindow::Hourly,
                    max: config.lead.per_ip_per_hour,
                },
                WindowLimit {
                    window: RateWindow::Daily,
                    max: config.lead.per_ip_per_day,
                },
            ],
        );
        policies.insert(
            SCOPE_OTP.to_string(),
            vec![WindowLimit {
                window: RateWindow::Hourly,
                max: config.otp.per_identifier_per_hour,
            }],
        );
        policies.insert(
            SCOPE_GLOBAL.to_string(),
            vec![WindowLimit {
                window: RateWindow::Minute,
                max: config.global.requests_per_minute,
            }],
        );

        Self {
            store,
            policies,
            enabled: config.enabled,
        }
    }

    /// Build a limiter with explicit policies (tests, custom scopes).
    pub fn with_policies(
        store: Arc<K>,
        policies: HashMap<String, Vec<WindowLimit>>,
        enabled: bool,
    ) -> Self {
        Self {
            store,
            policies,
            enabled,
        }
    }

    /// Count this request against every window of `scope` and decide.
    ///
    /// All windows are incremented before any is judged, so a denied
    /// request still consumes budget — retrying into a closed window does
    /// not reset it. When several windows trip at once the one with the
    /// longest wait is reported.
    ///
    /// Fails OPEN per window on store outage: admission is an abuse
    /// screen, not a correctness gate, and a cache blip must not take the
    /// public surface down with it.
    pub async fn admit(&self, scope: &str, identifier: &str) -> Admission {
        if !self.enabled {
            return Admission::Allowed;
        }

        let Some(windows) = self.policies.get(scope) else {
            debug!(scope, "No rate-limit policy for scope; admitting");
            return Admission::Allowed;
        };

        let mut violation: Option<(RateWindow, u64)> = None;

        for limit in windows {
            let key = keys::rate(scope, identifier, limit.window.as_str());
            let count = match self.store.increment(&key, limit.window.seconds()).await {
                Ok(count) => count,
                Err(e) => {
                    warn!(
                        scope,
                        window = limit.window.as_str(),
                        error = %e,
                        "Rate-limit counter unavailable; failing open"
                    );
                    continue;
                }
            };

            if count > limit.max as i64 {
                let retry_after = match self.store.ttl(&key).await {
                    Ok(Some(ttl)) if ttl > 0 => ttl as u64,
                    _ => limit.window.seconds(),
                };
                if violation.map_or(true, |(_, prev)| retry_after > prev) {
                    violation = Some((limit.window, retry_after));
                }
            }
        }

        match violation {
            Some((window, retry_after_seconds)) => {
                debug!(
                    scope,
                    identifier,
                    window = window.as_str(),
                    retry_after_seconds,
                    "Request denied by rate limit"
                );
                Admission::Denied {
                    window,
                    retry_after_seconds,
                }
            }
            None => Admission::Allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{FailingStore, InMemoryStore};

    fn limiter_with(
        store: Arc<InMemoryStore>,
        windows: Vec<WindowLimit>,
    ) -> RateLimiter<InMemoryStore> {
        let mut policies = HashMap::new();
        policies.insert("lead".to_string(), windows);
        RateLimiter::with_policies(store, policies, true)
    }

    #[tokio::test]
    async fn test_allows_up_to_max_then_denies() {
        let store = Arc::new(InMemoryStore::new());
        let limiter = limiter_with(
            store,
            vec![WindowLimit {
                window: RateWindow::Hourly,
                max: 3,
            }],
        );

        for _ in 0..3 {
            assert_eq!(limiter.admit("lead", "203.0.113.7").await, Admission::Allowed);
        }
        match limiter.admit("lead", "203.0.113.7").await {
            Admission::Denied {
                window,
                retry_after_seconds,
            } => {
                assert_eq!(window, RateWindow::Hourly);
                assert!(retry_after_seconds > 0 && retry_after_seconds <= 3600);
            }
            Admission::Allowed => panic!("fourth request should be denied"),
        }
    }

    #[tokio::test]
    async fn test_identifiers_are_independent() {
        let store = Arc::new(InMemoryStore::new());
        let limiter = limiter_with(
            store,
            vec![WindowLimit {
                window: RateWindow::Hourly,
                max: 1,
            }],
        );

        assert_eq!(limiter.admit("lead", "203.0.113.7").await, Admission::Allowed);
        assert!(matches!(
            limiter.admit("lead", "203.0.113.7").await,
            Admission::Denied { .. }
        ));
        // A different identifier in the same period is unaffected
        assert_eq!(limiter.admit("lead", "203.0.113.8").await, Admission::Allowed);
    }

    #[tokio::test]
    async fn test_daily_window_outlives_hourly_rollover() {
        let store = Arc::new(InMemoryStore::new());
        let limiter = limiter_with(
            store.clone(),
            vec![
                WindowLimit {
                    window: RateWindow::Hourly,
                    max: 2,
                },
                WindowLimit {
                    window: RateWindow::Daily,
                    max: 3,
                },
            ],
        );

        for _ in 0..2 {
            assert_eq!(limiter.admit("lead", "203.0.113.7").await, Admission::Allowed);
        }
        assert!(matches!(
            limiter.admit("lead", "203.0.113.7").await,
            Admission::Denied {
                window: RateWindow::Hourly,
                ..
            }
        ));

        // Hour rolls over: the hourly counter resets, the daily one holds.
        // The denied request above also consumed daily budget (3 + 1 = 4).
        store.force_expire("RATE:lead:203.0.113.7:hourly");
        assert!(matches!(
            limiter.admit("lead", "203.0.113.7").await,
            Admission::Denied {
                window: RateWindow::Daily,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_denied_requests_consume_budget() {
        let store = Arc::new(InMemoryStore::new());
        let limiter = limiter_with(
            store.clone(),
            vec![WindowLimit {
                window: RateWindow::Hourly,
                max: 1,
            }],
        );

        assert_eq!(limiter.admit("lead", "203.0.113.7").await, Admission::Allowed);
        for _ in 0..3 {
            assert!(matches!(
                limiter.admit("lead", "203.0.113.7").await,
                Admission::Denied { .. }
            ));
        }
        let count = store
            .get("RATE:lead:203.0.113.7:hourly")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(count, "4");
    }

    #[tokio::test]
    async fn test_unknown_scope_admits() {
        let store = Arc::new(InMemoryStore::new());
        let limiter = limiter_with(store, vec![]);
        assert_eq!(
            limiter.admit("unconfigured", "whoever").await,
            Admission::Allowed
        );
    }

    #[tokio::test]
    async fn test_disabled_limiter_admits_everything() {
        let store = Arc::new(InMemoryStore::new());
        let mut policies = HashMap::new();
        policies.insert(
            "lead".to_string(),
            vec![WindowLimit {
                window: RateWindow::Hourly,
                max: 0,
            }],
        );
        let limiter = RateLimiter::with_policies(store, policies, false);
        assert_eq!(limiter.admit("lead", "203.0.113.7").await, Admission::Allowed);
    }

    #[tokio::test]
    async fn test_store_outage_fails_open() {
        let mut policies = HashMap::new();
        policies.insert(
            "lead".to_string(),
            vec![WindowLimit {
                window: RateWindow::Hourly,
                max: 1,
            }],
        );
        let limiter = RateLimiter::with_policies(Arc::new(FailingStore), policies, true);

        for _ in 0..5 {
            assert_eq!(limiter.admit("lead", "203.0.113.7").await, Admission::Allowed);
        }
    }

    #[tokio::test]
    async fn test_standard_scopes_from_config() {
        let store = Arc::new(InMemoryStore::new());
        let limiter = RateLimiter::new(store, &RateLimitConfig::default());

        assert_eq!(
            limiter.admit(SCOPE_GLOBAL, GLOBAL_IDENTIFIER).await,
            Admission::Allowed
        );
        assert_eq!(limiter.admit(SCOPE_OTP, "0901234567").await, Admission::Allowed);
        assert_eq!(limiter.admit(SCOPE_LEAD, "203.0.113.7").await, Admission::Allowed);
    }

    #[tokio::test]
    async fn test_denial_converts_to_domain_error() {
        let denied = Admission::Denied {
            window: RateWindow::Daily,
            retry_after_seconds: 7200,
        };
        let err = denied.into_result("lead").unwrap_err();
        match err {
            DomainError::RateLimit(limit) => {
                assert_eq!(limit.scope, "lead");
                assert_eq!(limit.window, "daily");
                assert_eq!(limit.retry_after_seconds, 7200);
            }
            other => panic!("expected rate limit error, got {:?}", other),
        }
    }
}
