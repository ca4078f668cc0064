//! MySQL credential store.
//!
//! Verifies staff passwords against the `staff_accounts` table with
//! bcrypt. Lookups that find no account and lookups that find a wrong
//! password both resolve to `InvalidCredentials` so response content
//! cannot be used to enumerate accounts.

use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use std::str::FromStr;
use tracing::{debug, warn};
use uuid::Uuid;

use sn_core::domain::entities::{Principal, Role};
use sn_core::errors::{AuthError, DomainError, DomainResult};
use sn_core::services::auth::CredentialStore;
use sn_shared::utils::mask_identifier;

/// Row shape of the `staff_accounts` table.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    username: String,
    password_hash: String,
    role: String,
}

impl AccountRow {
    fn into_principal(self) -> DomainResult<Principal> {
        let user_id = Uuid::parse_str(&self.id).map_err(|e| DomainError::Internal {
            message: format!("Corrupt account id: {}", e),
        })?;
        let role = Role::from_str(&self.role).map_err(|e| DomainError::Internal {
            message: format!("Corrupt account role: {}", e),
        })?;
        Ok(Principal::new(user_id, self.username, role))
    }
}

/// Credential store over the CRM's MySQL account table.
pub struct MySqlCredentialStore {
    pool: MySqlPool,
}

impl MySqlCredentialStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_username(&self, username: &str) -> DomainResult<Option<AccountRow>> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT id, username, password_hash, role FROM staff_accounts WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Account lookup failed: {}", e),
        })
    }
}

#[async_trait]
impl CredentialStore for MySqlCredentialStore {
    async fn verify_password(&self, username: &str, password: &str) -> DomainResult<Principal> {
        let row = match self.fetch_by_username(username).await? {
            Some(row) => row,
            None => {
                debug!(
                    identifier = %mask_identifier(username),
                    "Credential check for unknown account"
                );
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let matches = bcrypt::verify(password, &row.password_hash).map_err(|e| {
            DomainError::Internal {
                message: format!("Password verification failed: {}", e),
            }
        })?;
        if !matches {
            warn!(
                identifier = %mask_identifier(username),
                "Password mismatch"
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        row.into_principal()
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Principal> {
        match self.fetch_by_username(username).await? {
            Some(row) => row.into_principal(),
            None => Err(AuthError::InvalidCredentials.into()),
        }
    }

    async fn find_by_id(&self, user_id: Uuid) -> DomainResult<Principal> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, username, password_hash, role FROM staff_accounts WHERE id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Account lookup failed: {}", e),
        })?;

        match row {
            Some(row) => row.into_principal(),
            None => Err(AuthError::InvalidCredentials.into()),
        }
    }

    async fn update_password(&self, username: &str, current: &str, new: &str) -> DomainResult<()> {
        // Re-verify the current password before touching the row
        self.verify_password(username, current).await?;

        let new_hash = bcrypt::hash(new, bcrypt::DEFAULT_COST).map_err(|e| {
            DomainError::Internal {
                message: format!("Password hashing failed: {}", e),
            }
        })?;

        sqlx::query("UPDATE staff_accounts SET password_hash = ? WHERE username = ?")
            .bind(&new_hash)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password update failed: {}", e),
            })?;

        Ok(())
    }
}
