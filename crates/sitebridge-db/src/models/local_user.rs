//! Local user accounts the bridge can sign in.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgExecutor};

/// A row of the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocalUserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Anonymous/guest placeholder accounts never take part in SSO.
    pub is_guest: bool,
    /// Where this user normally lands after signing in.
    pub landing_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data required to create a local user.
#[derive(Debug, Clone)]
pub struct CreateLocalUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub landing_url: Option<String>,
}

impl LocalUserRecord {
    pub async fn create<'e, E>(executor: E, data: CreateLocalUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO users (username, email, password_hash, landing_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.landing_url)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Case-insensitive email lookup. Returns the oldest account on duplicates.
    pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM users
            WHERE LOWER(email) = LOWER($1)
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(email.trim())
        .fetch_optional(executor)
        .await
    }
}
