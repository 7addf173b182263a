//! sitebridge Core Library
//!
//! Shared types for the sitebridge cross-site single-sign-on bridge.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`UserId`)
//! - [`config`] - Handshake configuration passed explicitly to every component
//! - [`event`] - Handshake direction and the `SsoEvent` observability record
//! - [`urls`] - Site URL validation and query helpers
//!
//! # Example
//!
//! ```
//! use sitebridge_core::{HandshakeAction, HandshakeConfig, UserId};
//!
//! let config = HandshakeConfig::new("s3cr3t", "https://lms.example.com", "https://shop.example.com");
//! assert!(config.is_enabled());
//!
//! let user: UserId = "5".parse().unwrap();
//! assert_eq!(user.get(), 5);
//! assert_eq!(HandshakeAction::Login.as_str(), "login");
//! ```

pub mod config;
pub mod event;
pub mod ids;
pub mod urls;

pub use config::HandshakeConfig;
pub use event::{EventOutcome, HandshakeAction, SiteRole, SsoEvent};
pub use ids::{ParseIdError, UserId};
