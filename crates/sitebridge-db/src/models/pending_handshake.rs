//! Pending handshake model.
//!
//! One row per `(user_id, purpose)` holding the most recent encoded token.
//! There is no history: writing a slot replaces whatever was there.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgExecutor};

/// A stored, still-encoded handshake token.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingHandshake {
    pub user_id: i64,
    pub purpose: String,
    /// Encoded token exactly as received. Never plaintext.
    #[serde(skip_serializing)]
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl PendingHandshake {
    /// Write the slot, replacing any previous token.
    pub async fn put<'e, E>(
        executor: E,
        user_id: i64,
        purpose: &str,
        token: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO pending_handshakes (user_id, purpose, token, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, purpose)
            DO UPDATE SET token = EXCLUDED.token, created_at = EXCLUDED.created_at
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(purpose)
        .bind(token)
        .fetch_one(executor)
        .await
    }

    /// Read the slot without consuming it.
    pub async fn find<'e, E>(
        executor: E,
        user_id: i64,
        purpose: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM pending_handshakes WHERE user_id = $1 AND purpose = $2")
            .bind(user_id)
            .bind(purpose)
            .fetch_optional(executor)
            .await
    }

    /// Delete the slot. Returns whether a row existed.
    pub async fn delete<'e, E>(executor: E, user_id: i64, purpose: &str) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result =
            sqlx::query("DELETE FROM pending_handshakes WHERE user_id = $1 AND purpose = $2")
                .bind(user_id)
                .bind(purpose)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically read and delete the slot.
    ///
    /// Of several concurrent callers at most one receives the row.
    pub async fn take<'e, E>(
        executor: E,
        user_id: i64,
        purpose: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            DELETE FROM pending_handshakes
            WHERE user_id = $1 AND purpose = $2
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(purpose)
        .fetch_optional(executor)
        .await
    }

    /// Delete every slot written before `cutoff`.
    pub async fn purge_older_than<'e, E>(
        executor: E,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM pending_handshakes WHERE created_at < $1")
            .bind(cutoff)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
