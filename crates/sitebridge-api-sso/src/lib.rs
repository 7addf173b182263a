//! Cross-site single-sign-on handshake for sitebridge.
//!
//! Two independently operated sites share a secret and nothing else. A user
//! who signs in (or out) on one site is carried to the other through a pair
//! of browser redirects and a best-effort server-to-server notification.
//!
//! # Flow
//!
//! 1. The [`services::LoginInitiator`] runs after a local sign-in, encodes the
//!    handshake fields with the shared secret, POSTs them to the partner's
//!    ingestion endpoint and hands the browser a one-time code.
//! 2. The partner's ingestion endpoint ([`services::IngestService`]) stores
//!    the encoded payload in its [`store::PendingHandshakeStore`].
//! 3. The browser arrives at the partner's responder
//!    ([`services::HandshakeResponder`]), which consumes the stored entry,
//!    compares the one-time code and either opens a local session or refuses.
//!
//! Logout follows the same shape through [`services::LogoutInitiator`].
//!
//! # Example
//!
//! ```rust,ignore
//! use sitebridge_api_sso::{sso_router, SsoConfig, SsoState};
//!
//! let state = SsoState::new(config, store, authority)?;
//! let app = Router::new().nest("/auth/sso", sso_router()).with_state(state);
//! ```

pub mod codec;
pub mod error;
pub mod handlers;
pub mod models;
pub mod protocol;
pub mod router;
pub mod services;
pub mod session_cookie;
pub mod store;

pub use codec::HandshakeArgs;
pub use error::{SsoError, SsoResult};
pub use models::{LocalUser, SessionTicket};
pub use router::{sso_router, LocalAuthority, SsoConfig, SsoState};
pub use services::{RejectReason, ResponderOutcome};
pub use store::{InMemoryHandshakeStore, PendingHandshakeStore, PgHandshakeStore};
