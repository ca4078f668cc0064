//! Route handlers and shared application state.

pub mod auth;
pub mod lead;

use std::sync::Arc;

use sn_core::services::auth::AuthService;
use sn_core::services::rate_limit::RateLimiter;
use sn_core::store::ExpiringStore;

/// Shared state handed to every handler.
///
/// Generic over the expiring store so production (Redis) and tests
/// (in-memory) wire the same handlers.
pub struct AppState<K: ExpiringStore> {
    pub auth_service: Arc<AuthService<K>>,
    pub rate_limiter: Arc<RateLimiter<K>>,
}

impl<K: ExpiringStore> AppState<K> {
    pub fn new(auth_service: Arc<AuthService<K>>, rate_limiter: Arc<RateLimiter<K>>) -> Self {
        Self {
            auth_service,
            rate_limiter,
        }
    }
}
