//! Local session cookie.
//!
//! The responder's login leg is reached through a cross-site top-level
//! navigation, so the cookie is `SameSite=Lax` rather than `Strict`.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};

use crate::models::SessionTicket;

/// Cookie name for bridge-opened sessions.
pub const SESSION_COOKIE_NAME: &str = "sitebridge_session";

/// Cookie max age in seconds (8 hours).
pub const SESSION_COOKIE_MAX_AGE: i64 = 8 * 3600;

/// Build the `Set-Cookie` value for a new session.
#[must_use]
pub fn create_session_cookie(ticket: SessionTicket, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE_NAME}={}; HttpOnly{secure_flag}; SameSite=Lax; Path=/; Max-Age={SESSION_COOKIE_MAX_AGE}",
        ticket.session_id
    )
}

/// Build the `Set-Cookie` value that expires the session cookie.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE_NAME}=; HttpOnly{secure_flag}; SameSite=Lax; Path=/; Max-Age=0")
}

/// Add a `Set-Cookie` header.
pub fn append_cookie(headers: &mut HeaderMap, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.append(SET_COOKIE, value);
    }
}
