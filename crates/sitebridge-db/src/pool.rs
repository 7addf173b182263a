//! Connection pool wrapper.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::DbError;

/// Maximum pooled connections.
const MAX_CONNECTIONS: u32 = 10;

/// How long to wait for a free connection before failing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL connection pool shared by the bridge.
#[derive(Debug, Clone)]
pub struct DbPool(PgPool);

impl DbPool {
    /// Connect to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .map_err(DbError::ConnectionFailed)?;
        tracing::info!(max_connections = MAX_CONNECTIONS, "Database pool connected");
        Ok(Self(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self(pool)
    }

    /// Borrow the underlying sqlx pool.
    #[must_use]
    pub fn inner(&self) -> &PgPool {
        &self.0
    }
}
