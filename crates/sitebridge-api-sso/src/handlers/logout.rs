//! Logout leg of the responder.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::models::LogoutQuery;
use crate::services::ResponderOutcome;
use crate::session_cookie::{append_cookie, clear_session_cookie};
use crate::SsoState;

use super::query_or_default;

/// `GET /auth/sso/logout?logout_id=..&veridy_code=..`
///
/// On a code mismatch the session cookie is left alone.
pub async fn logout_leg(
    State(state): State<SsoState>,
    query: Result<Query<LogoutQuery>, QueryRejection>,
) -> Response {
    let query = query_or_default(query);
    let outcome = state
        .responder
        .complete_logout(query.logout_id.as_deref(), query.verify_code.as_deref())
        .await;

    let mut response = Redirect::temporary(outcome.redirect_to()).into_response();
    if matches!(outcome, ResponderOutcome::SignedOut { .. }) {
        append_cookie(
            response.headers_mut(),
            &clear_session_cookie(state.secure_cookies),
        );
    }
    response
}
