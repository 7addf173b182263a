//! Wire names shared with the partner site.
//!
//! These strings are the interoperability contract. Changing any of them
//! breaks handshakes with partners running the existing implementation.

use sitebridge_core::HandshakeAction;

/// Handshake direction.
pub const FIELD_ACTION: &str = "action";
/// Sender-side user id.
pub const FIELD_USER_ID: &str = "mdl_uid";
pub const FIELD_USERNAME: &str = "mdl_uname";
pub const FIELD_EMAIL: &str = "mdl_email";
/// The shared secret itself. Outbound leg only; the receiver checks it.
pub const FIELD_SECRET: &str = "mdl_key";
/// Sender's view of the partner base URL, query stripped.
pub const FIELD_SITE_URL: &str = "mdl_wpurl";
pub const FIELD_LOGIN_REDIRECT: &str = "login_redirect";
pub const FIELD_LOGOUT_REDIRECT: &str = "logout_redirect";
pub const FIELD_ONE_TIME_CODE: &str = "mdl_one_time_code";
/// Receiver-side user id, when the sender knows it.
pub const FIELD_TARGET_USER_ID: &str = "moodle_user_id";
/// Optional course-specific landing page.
pub const FIELD_COURSE_URL: &str = "course_url";

/// Form field carrying the encoded token on the server-to-server POST.
pub const FORM_FIELD_TOKEN: &str = "sso_data";

/// Query marker appended when a handshake fails on our side.
pub const ERROR_MARKER: (&str, &str) = ("wdm_moodle_error", "1");

/// Store purpose key for login handshakes.
pub const PURPOSE_LOGIN: &str = "sso_session";
/// Store purpose key for logout handshakes.
pub const PURPOSE_LOGOUT: &str = "sso_logout";

pub const PARAM_LOGIN_ID: &str = "login_id";
pub const PARAM_VERIFY_CODE: &str = "verify_code";
pub const PARAM_SITE_URL: &str = "wpsiteurl";
pub const PARAM_LOGOUT_ID: &str = "logout_id";
/// Misspelled on the wire; partners send exactly this.
pub const PARAM_LOGOUT_VERIFY_CODE: &str = "veridy_code";

/// Where the SSO routes are mounted on both sites.
pub const BASE_PATH: &str = "/auth/sso";
pub const LOGIN_PATH: &str = "/auth/sso/login";
pub const LOGOUT_PATH: &str = "/auth/sso/logout";
pub const HANDOFF_PATH: &str = "/auth/sso/handoff";

/// Store purpose key for a handshake direction.
#[must_use]
pub fn purpose_for(action: HandshakeAction) -> &'static str {
    match action {
        HandshakeAction::Login => PURPOSE_LOGIN,
        HandshakeAction::Logout => PURPOSE_LOGOUT,
    }
}
