//! Expiring key-value store abstraction.
//!
//! Every piece of transient security state — OTP challenges, attempt
//! counters, the token blacklist, rate-limit windows — lives behind this
//! trait. The store is the single source of truth: no service keeps a
//! long-lived in-memory copy, which is what makes the instances stateless
//! and safe to scale horizontally.

pub mod keys;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by the expiring store.
///
/// The store is treated as unreliable; callers decide per operation
/// whether a failure fails open (reads on hot paths) or surfaces as a
/// 5xx (writes that would otherwise report false success).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation timed out after {0} ms")]
    Timeout(u64),
}

/// Async key-value store with per-key expiry.
///
/// Implementations must guarantee that `increment` is atomic at the store
/// level: two concurrent increments of the same key never observe the
/// same value. Nothing else requires store-side atomicity.
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Get the value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set `key` to `value` with a time-to-live, overwriting any prior value.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Delete `key`. Returns whether a value was present.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Atomically increment the counter under `key` and return the new value.
    ///
    /// When the increment creates the key (returned count is 1), the
    /// implementation sets `ttl_seconds` on it. A concurrent increment
    /// landing between the create and the expire can leave the key
    /// without a TTL; the impact is bounded to one window and accepted.
    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<i64, StoreError>;

    /// Set or replace the TTL of an existing key.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, StoreError>;

    /// Whether `key` currently holds a live value.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Remaining TTL of `key` in seconds; `None` if the key is absent or
    /// has no expiry.
    async fn ttl(&self, key: &str) -> Result<Option<i64>, StoreError>;
}
