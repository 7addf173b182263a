//! Local browser sessions opened by the bridge.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// A row of the `user_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: i64,
    /// What opened the session, e.g. `sso_login`.
    pub origin: String,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl UserSession {
    pub async fn create<'e, E>(executor: E, user_id: i64, origin: &str) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO user_sessions (id, user_id, origin)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(origin)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM user_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Revoke every active session of a user. Returns how many were revoked.
    pub async fn revoke_all_for_user<'e, E>(executor: E, user_id: i64) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            UPDATE user_sessions
            SET revoked_at = NOW()
            WHERE user_id = $1 AND revoked_at IS NULL
            ",
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}
