//! Shared fixtures for sitebridge-api-sso integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sitebridge_api_sso::codec::{encode, HandshakeArgs};
use sitebridge_api_sso::store::StoredHandshake;
use sitebridge_api_sso::{
    LocalAuthority, LocalUser, PendingHandshakeStore, SessionTicket, SsoError, SsoResult,
};
use sitebridge_core::{HandshakeConfig, UserId};
use uuid::Uuid;

pub const SECRET: &str = "s3cr3t";
pub const LOCAL_URL: &str = "https://lms.example.com";
pub const REMOTE_URL: &str = "https://shop.example.com";

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub fn handshake_config() -> HandshakeConfig {
    HandshakeConfig::new(SECRET, LOCAL_URL, REMOTE_URL)
}

pub fn user(id: i64, email: &str) -> LocalUser {
    LocalUser {
        id: UserId::new(id),
        username: format!("user{id}"),
        email: email.to_string(),
        is_guest: false,
        landing_url: None,
    }
}

/// Encoded payload as the partner would send it for a login.
pub fn partner_login_token(code: &str, target: Option<i64>) -> String {
    let mut args = HandshakeArgs::new()
        .with("action", "login")
        .with("mdl_uid", "5")
        .with("mdl_email", "jane@example.com")
        .with("mdl_key", SECRET)
        .with("mdl_one_time_code", code);
    if let Some(target) = target {
        args.set("moodle_user_id", target.to_string());
    }
    encode(&args, SECRET)
}

/// Local accounts and sessions kept in memory.
#[derive(Default)]
pub struct InMemoryAuthority {
    users: Mutex<Vec<LocalUser>>,
    sessions: Mutex<Vec<(UserId, SessionTicket)>>,
    terminated: Mutex<Vec<UserId>>,
}

impl InMemoryAuthority {
    pub fn with_users(users: Vec<LocalUser>) -> Arc<Self> {
        Arc::new(Self {
            users: Mutex::new(users),
            ..Self::default()
        })
    }

    pub fn sessions_for(&self, user_id: UserId) -> usize {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == user_id)
            .count()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn terminated(&self) -> Vec<UserId> {
        self.terminated.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocalAuthority for InMemoryAuthority {
    async fn find_user(&self, user_id: UserId) -> SsoResult<Option<LocalUser>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> SsoResult<Option<LocalUser>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn establish_session(&self, user: &LocalUser) -> SsoResult<SessionTicket> {
        let ticket = SessionTicket::new(Uuid::new_v4());
        self.sessions.lock().unwrap().push((user.id, ticket));
        Ok(ticket)
    }

    async fn terminate_sessions(&self, user_id: UserId) -> SsoResult<()> {
        self.sessions.lock().unwrap().retain(|(id, _)| *id != user_id);
        self.terminated.lock().unwrap().push(user_id);
        Ok(())
    }
}

/// A store whose backend is down.
pub struct FailingStore;

#[async_trait]
impl PendingHandshakeStore for FailingStore {
    async fn put(&self, _: UserId, _: &str, _: &str) -> SsoResult<()> {
        Err(unavailable())
    }

    async fn get(&self, _: UserId, _: &str) -> SsoResult<Option<StoredHandshake>> {
        Err(unavailable())
    }

    async fn remove(&self, _: UserId, _: &str) -> SsoResult<bool> {
        Err(unavailable())
    }

    async fn take(&self, _: UserId, _: &str) -> SsoResult<Option<StoredHandshake>> {
        Err(unavailable())
    }

    async fn purge_older_than(&self, _: DateTime<Utc>) -> SsoResult<u64> {
        Err(unavailable())
    }
}

fn unavailable() -> SsoError {
    SsoError::InternalError {
        message: "store unavailable".to_string(),
    }
}
