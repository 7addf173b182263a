//! Pending-handshake store.
//!
//! One slot per `(user id, purpose)` holding the last encoded token written
//! for it. Writes overwrite unconditionally. The responder consumes slots
//! with [`PendingHandshakeStore::take`], which reads and deletes atomically
//! so a one-time code can be redeemed at most once even under concurrency.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sitebridge_core::UserId;
use sitebridge_db::models::PendingHandshake;
use sqlx::PgPool;

use crate::error::SsoResult;

/// A stored, still-encoded token.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredHandshake {
    pub token: String,
    pub stored_at: DateTime<Utc>,
}

impl StoredHandshake {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            stored_at: Utc::now(),
        }
    }

    /// Whether the entry is older than `ttl` at `now`.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now.signed_duration_since(self.stored_at) > ttl,
            // A TTL too large to represent never expires anything.
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for StoredHandshake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredHandshake")
            .field("token_len", &self.token.len())
            .field("stored_at", &self.stored_at)
            .finish()
    }
}

impl From<PendingHandshake> for StoredHandshake {
    fn from(row: PendingHandshake) -> Self {
        Self {
            token: row.token,
            stored_at: row.created_at,
        }
    }
}

/// Storage contract for pending handshakes.
#[async_trait]
pub trait PendingHandshakeStore: Send + Sync {
    /// Write the slot, replacing any previous token.
    async fn put(&self, user_id: UserId, purpose: &str, token: &str) -> SsoResult<()>;

    /// Read the slot without consuming it.
    async fn get(&self, user_id: UserId, purpose: &str) -> SsoResult<Option<StoredHandshake>>;

    /// Delete the slot. Returns whether it existed.
    async fn remove(&self, user_id: UserId, purpose: &str) -> SsoResult<bool>;

    /// Read and delete the slot in one atomic step.
    async fn take(&self, user_id: UserId, purpose: &str) -> SsoResult<Option<StoredHandshake>>;

    /// Delete every slot written before `cutoff`. Returns how many went.
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> SsoResult<u64>;
}

/// Process-local store, for tests and single-instance deployments.
#[derive(Debug, Default)]
pub struct InMemoryHandshakeStore {
    entries: DashMap<(i64, String), StoredHandshake>,
}

impl InMemoryHandshakeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry with an explicit timestamp.
    pub fn insert_at(&self, user_id: UserId, purpose: &str, token: &str, stored_at: DateTime<Utc>) {
        self.entries.insert(
            (user_id.get(), purpose.to_string()),
            StoredHandshake {
                token: token.to_string(),
                stored_at,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PendingHandshakeStore for InMemoryHandshakeStore {
    async fn put(&self, user_id: UserId, purpose: &str, token: &str) -> SsoResult<()> {
        self.entries.insert(
            (user_id.get(), purpose.to_string()),
            StoredHandshake::new(token),
        );
        Ok(())
    }

    async fn get(&self, user_id: UserId, purpose: &str) -> SsoResult<Option<StoredHandshake>> {
        Ok(self
            .entries
            .get(&(user_id.get(), purpose.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn remove(&self, user_id: UserId, purpose: &str) -> SsoResult<bool> {
        Ok(self
            .entries
            .remove(&(user_id.get(), purpose.to_string()))
            .is_some())
    }

    async fn take(&self, user_id: UserId, purpose: &str) -> SsoResult<Option<StoredHandshake>> {
        Ok(self
            .entries
            .remove(&(user_id.get(), purpose.to_string()))
            .map(|(_, entry)| entry))
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> SsoResult<u64> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.stored_at >= cutoff);
        Ok(u64::try_from(before.saturating_sub(self.entries.len())).unwrap_or(u64::MAX))
    }
}

/// PostgreSQL-backed store over the `pending_handshakes` table.
#[derive(Debug, Clone)]
pub struct PgHandshakeStore {
    pool: PgPool,
}

impl PgHandshakeStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PendingHandshakeStore for PgHandshakeStore {
    async fn put(&self, user_id: UserId, purpose: &str, token: &str) -> SsoResult<()> {
        PendingHandshake::put(&self.pool, user_id.get(), purpose, token).await?;
        Ok(())
    }

    async fn get(&self, user_id: UserId, purpose: &str) -> SsoResult<Option<StoredHandshake>> {
        let row = PendingHandshake::find(&self.pool, user_id.get(), purpose).await?;
        Ok(row.map(StoredHandshake::from))
    }

    async fn remove(&self, user_id: UserId, purpose: &str) -> SsoResult<bool> {
        Ok(PendingHandshake::delete(&self.pool, user_id.get(), purpose).await?)
    }

    async fn take(&self, user_id: UserId, purpose: &str) -> SsoResult<Option<StoredHandshake>> {
        let row = PendingHandshake::take(&self.pool, user_id.get(), purpose).await?;
        Ok(row.map(StoredHandshake::from))
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> SsoResult<u64> {
        let purged = PendingHandshake::purge_older_than(&self.pool, cutoff).await?;
        if purged > 0 {
            tracing::info!(purged, "Purged stale pending handshakes");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UID: UserId = UserId::new(5);

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = InMemoryHandshakeStore::new();
        store.put(UID, "sso_session", "first").await.unwrap();
        store.put(UID, "sso_session", "second").await.unwrap();

        let entry = store.get(UID, "sso_session").await.unwrap().unwrap();
        assert_eq!(entry.token, "second");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_purposes_and_users_are_separate_slots() {
        let store = InMemoryHandshakeStore::new();
        store.put(UID, "sso_session", "login").await.unwrap();
        store.put(UID, "sso_logout", "logout").await.unwrap();
        store.put(UserId::new(6), "sso_session", "other").await.unwrap();

        assert_eq!(
            store.get(UID, "sso_logout").await.unwrap().unwrap().token,
            "logout"
        );
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_take_consumes_once() {
        let store = InMemoryHandshakeStore::new();
        store.put(UID, "sso_session", "tok").await.unwrap();

        assert!(store.take(UID, "sso_session").await.unwrap().is_some());
        assert!(store.take(UID, "sso_session").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_remove_reports_existence() {
        let store = InMemoryHandshakeStore::new();
        assert!(!store.remove(UID, "sso_session").await.unwrap());
        store.put(UID, "sso_session", "tok").await.unwrap();
        assert!(store.remove(UID, "sso_session").await.unwrap());
        assert!(store.get(UID, "sso_session").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_older_than() {
        let store = InMemoryHandshakeStore::new();
        let now = Utc::now();
        store.insert_at(UID, "sso_session", "old", now - chrono::Duration::hours(2));
        store.insert_at(UserId::new(6), "sso_session", "new", now);

        let purged = store
            .purge_older_than(now - chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(purged, 1);
        assert!(store.get(UID, "sso_session").await.unwrap().is_none());
        assert!(store.get(UserId::new(6), "sso_session").await.unwrap().is_some());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let entry = StoredHandshake {
            token: "t".into(),
            stored_at: now - chrono::Duration::seconds(120),
        };
        assert!(entry.is_expired(Duration::from_secs(60), now));
        assert!(!entry.is_expired(Duration::from_secs(300), now));
    }

    #[test]
    fn test_debug_hides_token() {
        let entry = StoredHandshake::new("very-secret-token");
        assert!(!format!("{entry:?}").contains("very-secret-token"));
    }
}
