//! In-memory implementation of the expiring store.
//!
//! Backs local development and integration tests; carries the same
//! contract as the Redis store, including atomic increments (serialized
//! through the mutex) and per-key TTL with lazy eviction.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sn_core::store::{ExpiringStore, StoreError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Instant::now() >= at)
    }
}

/// Process-local expiring store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Eviction is otherwise lazy, so
    /// long-running dev servers can call this periodically.
    pub fn purge_expired(&self) {
        self.entries
            .lock()
            .unwrap()
            .retain(|_, entry| !entry.is_expired());
    }

    /// Number of live entries (test helper).
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| !e.is_expired())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ExpiringStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.remove(key) {
            Some(entry) => Ok(!entry.is_expired()),
            None => Ok(false),
        }
    }

    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<i64, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.get(key).map_or(false, |e| e.is_expired()) {
            entries.remove(key);
        }
        match entries.get_mut(key) {
            Some(entry) => {
                let count = entry.value.parse::<i64>().unwrap_or(0) + 1;
                entry.value = count.to_string();
                Ok(count)
            }
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: "1".to_string(),
                        expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
                    },
                );
                Ok(1)
            }
        }
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at = Some(Instant::now() + Duration::from_secs(ttl_seconds));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(|entry| {
                entry
                    .expires_at
                    .map(|at| at.saturating_duration_since(Instant::now()).as_secs() as i64)
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();
        store.set("k", "v", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(store.exists("k").await.unwrap());

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", "old", 60).await.unwrap();
        store.set("k", "new", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() {
        let store = MemoryStore::new();
        store.set("k", "v", 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_increment_sequence_and_ttl() {
        let store = MemoryStore::new();
        assert_eq!(store.increment("counter", 60).await.unwrap(), 1);
        assert_eq!(store.increment("counter", 60).await.unwrap(), 2);
        assert_eq!(store.increment("counter", 60).await.unwrap(), 3);

        let ttl = store.ttl("counter").await.unwrap().unwrap();
        assert!(ttl <= 60);
    }

    #[tokio::test]
    async fn test_increment_restarts_after_expiry() {
        let store = MemoryStore::new();
        store.increment("counter", 0).await.unwrap();
        assert_eq!(store.increment("counter", 60).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expire_extends_lifetime() {
        let store = MemoryStore::new();
        store.set("k", "v", 1).await.unwrap();
        assert!(store.expire("k", 120).await.unwrap());
        let ttl = store.ttl("k").await.unwrap().unwrap();
        assert!(ttl > 60);

        assert!(!store.expire("missing", 120).await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        store.set("dead", "v", 0).await.unwrap();
        store.set("alive", "v", 60).await.unwrap();
        store.purge_expired();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_increments_do_not_lose_updates() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment("counter", 60).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(
            store.get("counter").await.unwrap().as_deref(),
            Some("20")
        );
    }
}
