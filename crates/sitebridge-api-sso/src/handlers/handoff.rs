//! First cross-site hop after a local sign-in.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Redirect,
};
use sitebridge_core::urls::{append_query, join_path, strip_query};
use tracing::warn;

use crate::models::LoginQuery;
use crate::protocol::{LOGIN_PATH, PARAM_LOGIN_ID, PARAM_VERIFY_CODE};
use crate::SsoState;

use super::query_or_default;

/// `GET /auth/sso/handoff?login_id=..&verify_code=..&wpsiteurl=..`
///
/// Forwards the browser to the partner's login leg. `wpsiteurl` is only a
/// hint: it must name the configured partner or it is ignored.
pub async fn handoff(
    State(state): State<SsoState>,
    query: Result<Query<LoginQuery>, QueryRejection>,
) -> Redirect {
    let query = query_or_default(query);
    let local_root = state.config.local_root();

    let Some(remote_base) = state.config.remote_base() else {
        return Redirect::temporary(&local_root);
    };

    if let Some(hint) = query.wpsiteurl.as_deref().filter(|h| !h.trim().is_empty()) {
        if !same_site(strip_query(hint), remote_base) {
            warn!(hint = %hint, "Ignoring handoff site URL that is not the configured partner");
        }
    }

    let login_id = query.login_id.as_deref().map(str::trim).unwrap_or_default();
    let verify_code = query.verify_code.as_deref().map(str::trim).unwrap_or_default();
    if login_id.is_empty() || verify_code.is_empty() {
        return Redirect::temporary(&local_root);
    }

    let target = append_query(
        &join_path(remote_base, LOGIN_PATH),
        [(PARAM_LOGIN_ID, login_id), (PARAM_VERIFY_CODE, verify_code)],
    );
    Redirect::temporary(&target)
}

fn same_site(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_site_ignores_trailing_slash() {
        assert!(same_site("https://shop.example.com/", "https://shop.example.com"));
        assert!(!same_site("https://evil.example.com", "https://shop.example.com"));
    }
}
