//! sitebridge Database Layer
//!
//! PostgreSQL persistence for the SSO bridge:
//!
//! - [`models::PendingHandshake`] - the per-user, per-purpose slot holding the
//!   last encoded handshake token
//! - [`models::LocalUserRecord`] and [`models::UserSession`] - the minimal local
//!   account and session tables the bridge application runs against
//!
//! # Example
//!
//! ```rust,ignore
//! use sitebridge_db::{run_migrations, DbPool};
//! use sitebridge_db::models::PendingHandshake;
//!
//! let pool = DbPool::connect("postgres://localhost/sitebridge").await?;
//! run_migrations(&pool).await?;
//! PendingHandshake::put(pool.inner(), 5, "sso_session", "token").await?;
//! ```

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::DbPool;
