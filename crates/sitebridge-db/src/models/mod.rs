//! Database models.

pub mod local_user;
pub mod pending_handshake;
pub mod user_session;

pub use local_user::{CreateLocalUser, LocalUserRecord};
pub use pending_handshake::PendingHandshake;
pub use user_session::UserSession;
