//! `LocalAuthority` over the bridge's own PostgreSQL tables.

use async_trait::async_trait;
use sitebridge_api_sso::{LocalAuthority, LocalUser, SessionTicket, SsoError, SsoResult};
use sitebridge_core::UserId;
use sitebridge_db::models::{LocalUserRecord, UserSession};
use sqlx::PgPool;
use tracing::info;

/// Session origin recorded for bridge-opened sessions.
const SESSION_ORIGIN: &str = "sso_login";

/// Looks users up in `users` and tracks sessions in `user_sessions`.
#[derive(Debug, Clone)]
pub struct PgLocalAuthority {
    pool: PgPool,
}

impl PgLocalAuthority {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn authority_error(operation: &str, err: sqlx::Error) -> SsoError {
    SsoError::AuthorityError {
        message: format!("{operation}: {err}"),
    }
}

fn to_local_user(record: LocalUserRecord) -> LocalUser {
    LocalUser {
        id: UserId::new(record.id),
        username: record.username,
        email: record.email,
        is_guest: record.is_guest,
        landing_url: record.landing_url,
    }
}

#[async_trait]
impl LocalAuthority for PgLocalAuthority {
    async fn find_user(&self, user_id: UserId) -> SsoResult<Option<LocalUser>> {
        let record = LocalUserRecord::find_by_id(&self.pool, user_id.get())
            .await
            .map_err(|e| authority_error("user lookup", e))?;
        Ok(record.map(to_local_user))
    }

    async fn find_user_by_email(&self, email: &str) -> SsoResult<Option<LocalUser>> {
        let record = LocalUserRecord::find_by_email(&self.pool, email)
            .await
            .map_err(|e| authority_error("user lookup by email", e))?;
        Ok(record.map(to_local_user))
    }

    async fn establish_session(&self, user: &LocalUser) -> SsoResult<SessionTicket> {
        let session = UserSession::create(&self.pool, user.id.get(), SESSION_ORIGIN)
            .await
            .map_err(|e| authority_error("session create", e))?;
        info!(user_id = %user.id, session_id = %session.id, "Local session opened via SSO");
        Ok(SessionTicket::new(session.id))
    }

    async fn terminate_sessions(&self, user_id: UserId) -> SsoResult<()> {
        let revoked = UserSession::revoke_all_for_user(&self.pool, user_id.get())
            .await
            .map_err(|e| authority_error("session revoke", e))?;
        info!(user_id = %user_id, revoked, "Local sessions revoked via SSO");
        Ok(())
    }
}
