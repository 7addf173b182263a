//! Request, response and domain types for the SSO endpoints.

use serde::{Deserialize, Serialize};
use sitebridge_core::UserId;
use uuid::Uuid;

/// A local account as seen by the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Guest and placeholder accounts never take part in SSO.
    pub is_guest: bool,
    /// Where the user normally lands after signing in.
    pub landing_url: Option<String>,
}

/// A local session opened by the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket {
    pub session_id: Uuid,
}

impl SessionTicket {
    #[must_use]
    pub fn new(session_id: Uuid) -> Self {
        Self { session_id }
    }
}

/// Query parameters of the login leg and of the handoff hop.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub login_id: Option<String>,
    pub verify_code: Option<String>,
    /// Partner URL, only sent on the first cross-site hop.
    pub wpsiteurl: Option<String>,
}

/// Query parameters of the logout leg.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutQuery {
    pub logout_id: Option<String>,
    #[serde(rename = "veridy_code")]
    pub verify_code: Option<String>,
}

/// Server-to-server ingestion form.
#[derive(Debug, Deserialize)]
pub struct IngestForm {
    #[serde(rename = "sso_data", default)]
    pub token: String,
}

/// Body of the initiator hooks.
#[derive(Debug, Deserialize)]
pub struct HookRequest {
    pub user_id: i64,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Response of the initiator hooks.
#[derive(Debug, Serialize, Deserialize)]
pub struct HookResponse {
    /// Where the caller should send the browser next.
    pub redirect_to: String,
    /// Whether a handshake was started. False when SSO was skipped.
    pub dispatched: bool,
}
