//! In-memory credential store for development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use sn_core::domain::entities::{Principal, Role};
use sn_core::errors::{AuthError, DomainError, DomainResult};
use sn_core::services::auth::CredentialStore;

// Hash cost for fixtures only; production hashing uses DEFAULT_COST
const FIXTURE_COST: u32 = 4;

struct Account {
    user_id: Uuid,
    password_hash: String,
    role: Role,
}

/// Credential store holding bcrypt-hashed fixture accounts in memory.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account, returning its generated id.
    pub fn add_account(&self, username: &str, password: &str, role: Role) -> Uuid {
        let user_id = Uuid::new_v4();
        let password_hash = bcrypt::hash(password, FIXTURE_COST).expect("bcrypt hash");
        self.accounts.lock().unwrap().insert(
            username.to_string(),
            Account {
                user_id,
                password_hash,
                role,
            },
        );
        user_id
    }

    /// Builder-style variant of [`InMemoryCredentialStore::add_account`].
    pub fn with_account(self, username: &str, password: &str, role: Role) -> Self {
        self.add_account(username, password, role);
        self
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn verify_password(&self, username: &str, password: &str) -> DomainResult<Principal> {
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(username)
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        let matches = bcrypt::verify(password, &account.password_hash).map_err(|e| {
            DomainError::Internal {
                message: format!("Password verification failed: {}", e),
            }
        })?;
        if !matches {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(Principal::new(account.user_id, username, account.role))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Principal> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .get(username)
            .map(|a| Principal::new(a.user_id, username, a.role))
            .ok_or_else(|| AuthError::InvalidCredentials.into())
    }

    async fn find_by_id(&self, user_id: Uuid) -> DomainResult<Principal> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|(_, a)| a.user_id == user_id)
            .map(|(username, a)| Principal::new(a.user_id, username, a.role))
            .ok_or_else(|| AuthError::InvalidCredentials.into())
    }

    async fn update_password(&self, username: &str, current: &str, new: &str) -> DomainResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(username)
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        let matches = bcrypt::verify(current, &account.password_hash).map_err(|e| {
            DomainError::Internal {
                message: format!("Password verification failed: {}", e),
            }
        })?;
        if !matches {
            return Err(AuthError::InvalidCredentials.into());
        }

        account.password_hash = bcrypt::hash(new, FIXTURE_COST).map_err(|e| {
            DomainError::Internal {
                message: format!("Password hashing failed: {}", e),
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_password() {
        let store =
            InMemoryCredentialStore::new().with_account("0901234567", "secret-pass", Role::Staff);

        let principal = store
            .verify_password("0901234567", "secret-pass")
            .await
            .unwrap();
        assert_eq!(principal.username, "0901234567");
        assert_eq!(principal.role, Role::Staff);

        assert!(store.verify_password("0901234567", "wrong").await.is_err());
        assert!(store.verify_password("0907654321", "secret-pass").await.is_err());
    }

    #[tokio::test]
    async fn test_find_by_id_round_trip() {
        let store = InMemoryCredentialStore::new();
        let id = store.add_account("0901234567", "secret-pass", Role::Admin);

        let principal = store.find_by_id(id).await.unwrap();
        assert_eq!(principal.username, "0901234567");
        assert_eq!(principal.user_id, id);
    }

    #[tokio::test]
    async fn test_update_password_requires_current() {
        let store =
            InMemoryCredentialStore::new().with_account("0901234567", "old-pass", Role::Staff);

        assert!(store
            .update_password("0901234567", "not-old-pass", "new-pass")
            .await
            .is_err());
        store
            .update_password("0901234567", "old-pass", "new-pass")
            .await
            .unwrap();

        assert!(store.verify_password("0901234567", "old-pass").await.is_err());
        store
            .verify_password("0901234567", "new-pass")
            .await
            .unwrap();
    }
}
