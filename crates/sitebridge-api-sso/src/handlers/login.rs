//! Login leg of the responder.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::models::LoginQuery;
use crate::services::ResponderOutcome;
use crate::session_cookie::{append_cookie, create_session_cookie};
use crate::SsoState;

use super::query_or_default;

/// `GET /auth/sso/login?login_id=..&verify_code=..`
///
/// Always answers with a redirect. On success the response also sets the
/// local session cookie.
pub async fn login_leg(
    State(state): State<SsoState>,
    query: Result<Query<LoginQuery>, QueryRejection>,
) -> Response {
    let query = query_or_default(query);
    let outcome = state
        .responder
        .complete_login(query.login_id.as_deref(), query.verify_code.as_deref())
        .await;

    let mut response = Redirect::temporary(outcome.redirect_to()).into_response();
    if let ResponderOutcome::Authenticated { session, .. } = outcome {
        append_cookie(
            response.headers_mut(),
            &create_session_cookie(session, state.secure_cookies),
        );
    }
    response
}
