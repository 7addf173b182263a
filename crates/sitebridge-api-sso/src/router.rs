//! Router configuration for the SSO endpoints.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sitebridge_core::{HandshakeConfig, UserId};

use crate::error::SsoResult;
use crate::handlers;
use crate::models::{LocalUser, SessionTicket};
use crate::services::{
    HandshakeResponder, IngestService, LoginInitiator, LogoutInitiator, PartnerNotifier,
};
use crate::store::PendingHandshakeStore;

/// Interface to the local site's account and session system.
///
/// The bridge never checks passwords. A matching shared secret and one-time
/// code is the whole of the trust decision; this trait only looks users up
/// and opens or closes their sessions.
#[async_trait::async_trait]
pub trait LocalAuthority: Send + Sync {
    async fn find_user(&self, user_id: UserId) -> SsoResult<Option<LocalUser>>;

    /// Case-insensitive lookup.
    async fn find_user_by_email(&self, email: &str) -> SsoResult<Option<LocalUser>>;

    /// Open a session for `user` without a credential check.
    async fn establish_session(&self, user: &LocalUser) -> SsoResult<SessionTicket>;

    /// Revoke every active session of a user.
    async fn terminate_sessions(&self, user_id: UserId) -> SsoResult<()>;
}

/// Configuration for building SSO state.
#[derive(Debug, Clone)]
pub struct SsoConfig {
    pub handshake: HandshakeConfig,
    /// Bearer token for the initiator hooks. `None` disables the hooks.
    pub hook_token: Option<String>,
    /// Add the `Secure` flag to session cookies.
    pub secure_cookies: bool,
}

/// Shared state for SSO handlers.
#[derive(Clone)]
pub struct SsoState {
    pub config: Arc<HandshakeConfig>,
    pub hook_token: Option<Arc<str>>,
    pub secure_cookies: bool,
    pub authority: Arc<dyn LocalAuthority>,
    pub login_initiator: LoginInitiator,
    pub logout_initiator: LogoutInitiator,
    pub responder: HandshakeResponder,
    pub ingest: IngestService,
}

impl SsoState {
    /// Create SSO state from configuration.
    pub fn new(
        config: SsoConfig,
        store: Arc<dyn PendingHandshakeStore>,
        authority: Arc<dyn LocalAuthority>,
    ) -> SsoResult<Self> {
        let handshake = Arc::new(config.handshake);
        let notifier = PartnerNotifier::new(&handshake)?;

        Ok(Self {
            login_initiator: LoginInitiator::new(handshake.clone(), notifier.clone()),
            logout_initiator: LogoutInitiator::new(handshake.clone(), notifier),
            responder: HandshakeResponder::new(handshake.clone(), store.clone(), authority.clone()),
            ingest: IngestService::new(handshake.clone(), store),
            hook_token: config
                .hook_token
                .filter(|token| !token.is_empty())
                .map(Arc::from),
            secure_cookies: config.secure_cookies,
            authority,
            config: handshake,
        })
    }
}

/// Browser-facing legs: the handoff hop and both responder legs.
pub fn browser_sso_router() -> Router<SsoState> {
    Router::new()
        .route("/handoff", get(handlers::handoff))
        .route("/login", get(handlers::login_leg))
        .route("/logout", get(handlers::logout_leg))
}

/// Server-to-server endpoints: partner ingestion and initiator hooks.
pub fn service_sso_router() -> Router<SsoState> {
    Router::new()
        .route("/ingest", post(handlers::ingest))
        .route("/hooks/login", post(handlers::login_hook))
        .route("/hooks/logout", post(handlers::logout_hook))
}

/// Create the complete SSO router.
///
/// Partners expect it at [`crate::protocol::BASE_PATH`].
pub fn sso_router() -> Router<SsoState> {
    Router::new()
        .merge(browser_sso_router())
        .merge(service_sso_router())
}
