//! Initiator hooks for the local site's own sign-in system.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use sitebridge_core::UserId;
use subtle::ConstantTimeEq;

use crate::error::{SsoError, SsoResult};
use crate::models::{HookRequest, HookResponse, LocalUser};
use crate::SsoState;

/// `POST /auth/sso/hooks/login`
pub async fn login_hook(
    State(state): State<SsoState>,
    headers: HeaderMap,
    Json(request): Json<HookRequest>,
) -> SsoResult<Json<HookResponse>> {
    let user = authorize_and_load(&state, &headers, request.user_id).await?;
    let outcome = state
        .login_initiator
        .on_login(&user, request.redirect_to.as_deref())
        .await;

    Ok(Json(HookResponse {
        redirect_to: outcome.redirect_to,
        dispatched: outcome.dispatched,
    }))
}

/// `POST /auth/sso/hooks/logout`
pub async fn logout_hook(
    State(state): State<SsoState>,
    headers: HeaderMap,
    Json(request): Json<HookRequest>,
) -> SsoResult<Json<HookResponse>> {
    let user = authorize_and_load(&state, &headers, request.user_id).await?;
    let outcome = state
        .logout_initiator
        .on_logout(&user, request.redirect_to.as_deref())
        .await;

    Ok(Json(HookResponse {
        redirect_to: outcome.redirect_to,
        dispatched: outcome.dispatched,
    }))
}

async fn authorize_and_load(
    state: &SsoState,
    headers: &HeaderMap,
    raw_user_id: i64,
) -> SsoResult<LocalUser> {
    // Hooks do not exist unless a token is configured.
    let expected = state.hook_token.as_deref().ok_or(SsoError::Disabled)?;

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(SsoError::Unauthorized)?;

    if !bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(SsoError::Unauthorized);
    }

    if raw_user_id <= 0 {
        return Err(SsoError::InvalidRequest {
            reason: "user_id must be positive".to_string(),
        });
    }

    state
        .authority
        .find_user(UserId::new(raw_user_id))
        .await?
        .ok_or(SsoError::UserNotFound)
}
