//! Shared mock collaborators for service unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, Principal, Role};
use crate::errors::{AuthError, DomainResult};
use crate::services::auth::CredentialStore;
use crate::services::otp::OtpDelivery;
use crate::store::{ExpiringStore, StoreError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Instant::now() >= at)
    }
}

/// In-memory expiring store with lazy TTL eviction.
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Force-expire a key so tests can simulate TTL rollover.
    pub fn force_expire(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

#[async_trait]
impl ExpiringStore for InMemoryStore {
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
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<i64, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        let expired = entries.get(key).map_or(false, |e| e.is_expired());
        if expired {
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
        Ok(entries.get(key).and_then(|entry| {
            entry
                .expires_at
                .map(|at| at.saturating_duration_since(Instant::now()).as_secs() as i64)
        }))
    }
}

/// Store that fails every operation, for outage-policy tests.
pub struct FailingStore;

#[async_trait]
impl ExpiringStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn increment(&self, _key: &str, _ttl_seconds: u64) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn expire(&self, _key: &str, _ttl_seconds: u64) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn exists(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn ttl(&self, _key: &str) -> Result<Option<i64>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Delivery mock recording the last code sent per identifier.
pub struct MockDelivery {
    sent: Mutex<HashMap<String, String>>,
    should_fail: bool,
}

impl MockDelivery {
    pub fn new(should_fail: bool) -> Self {
        Self {
            sent: Mutex::new(HashMap::new()),
            should_fail,
        }
    }

    pub fn last_code(&self, identifier: &str) -> Option<String> {
        self.sent.lock().unwrap().get(identifier).cloned()
    }
}

#[async_trait]
impl OtpDelivery for MockDelivery {
    async fn send(
        &self,
        identifier: &str,
        code: &str,
        _purpose: OtpPurpose,
    ) -> Result<(), String> {
        if self.should_fail {
            return Err("delivery channel error".to_string());
        }
        self.sent
            .lock()
            .unwrap()
            .insert(identifier.to_string(), code.to_string());
        Ok(())
    }
}

/// Credential store mock with fixed accounts.
pub struct MockCredentialStore {
    accounts: Mutex<HashMap<String, (Uuid, String, Role)>>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_account(self, username: &str, password: &str, role: Role) -> Self {
        self.accounts.lock().unwrap().insert(
            username.to_string(),
            (Uuid::new_v4(), password.to_string(), role),
        );
        self
    }

    pub fn user_id(&self, username: &str) -> Option<Uuid> {
        self.accounts
            .lock()
            .unwrap()
            .get(username)
            .map(|(id, _, _)| *id)
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn verify_password(&self, username: &str, password: &str) -> DomainResult<Principal> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(username) {
            Some((id, stored, role)) if stored == password => {
                Ok(Principal::new(*id, username, *role))
            }
            _ => Err(AuthError::InvalidCredentials.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Principal> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .get(username)
            .map(|(id, _, role)| Principal::new(*id, username, *role))
            .ok_or_else(|| AuthError::InvalidCredentials.into())
    }

    async fn find_by_id(&self, user_id: Uuid) -> DomainResult<Principal> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|(_, (id, _, _))| *id == user_id)
            .map(|(username, (id, _, role))| Principal::new(*id, username, *role))
            .ok_or_else(|| AuthError::InvalidCredentials.into())
    }

    async fn update_password(
        &self,
        username: &str,
        current: &str,
        new: &str,
    ) -> DomainResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(username) {
            Some((_, stored, _)) if stored == current => {
                *stored = new.to_string();
                Ok(())
            }
            _ => Err(AuthError::InvalidCredentials.into()),
        }
    }
}
