//! MySQL connection pool setup.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::InfraError;

/// Create a MySQL connection pool with a bounded acquire timeout.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<MySqlPool, InfraError> {
    info!(max_connections, "Creating MySQL connection pool");

    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    Ok(pool)
}
