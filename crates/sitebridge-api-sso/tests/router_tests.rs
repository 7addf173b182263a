//! Router-level tests: status codes, `Location` and `Set-Cookie` headers.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::{
    handshake_config, init_test_logging, partner_login_token, user, InMemoryAuthority, SECRET,
};
use sitebridge_api_sso::codec::{encode, HandshakeArgs};
use sitebridge_api_sso::models::HookResponse;
use sitebridge_api_sso::{sso_router, InMemoryHandshakeStore, SsoConfig, SsoState};
use sitebridge_core::HandshakeConfig;
use tower::ServiceExt;

struct App {
    router: Router,
    authority: Arc<InMemoryAuthority>,
    store: Arc<InMemoryHandshakeStore>,
}

fn app_with(handshake: HandshakeConfig, hook_token: Option<&str>) -> App {
    init_test_logging();
    let store = Arc::new(InMemoryHandshakeStore::new());
    let authority = InMemoryAuthority::with_users(vec![user(5, "jane@example.com")]);
    let state = SsoState::new(
        SsoConfig {
            handshake,
            hook_token: hook_token.map(str::to_string),
            secure_cookies: true,
        },
        store.clone(),
        authority.clone(),
    )
    .unwrap();

    App {
        router: Router::new().nest("/auth/sso", sso_router()).with_state(state),
        authority,
        store,
    }
}

fn app() -> App {
    app_with(handshake_config(), Some("hook-token"))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn ingest_request(token: &str) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("sso_data", token)
        .finish();
    Request::builder()
        .method("POST")
        .uri("/auth/sso/ingest")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn hook_request(path: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn set_cookie(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap())
}

#[tokio::test]
async fn test_ingest_then_login_sets_session_cookie() {
    let app = app();

    let response = app
        .router
        .clone()
        .oneshot(ingest_request(&partner_login_token("abc123", Some(5))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router
        .clone()
        .oneshot(get("/auth/sso/login?login_id=5&verify_code=abc123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "https://lms.example.com/");
    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("sitebridge_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert_eq!(app.authority.session_count(), 1);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_login_with_wrong_code_redirects_to_remote() {
    let app = app();
    app.router
        .clone()
        .oneshot(ingest_request(&partner_login_token("abc123", Some(5))))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get("/auth/sso/login?login_id=5&verify_code=wrong"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "https://shop.example.com");
    assert!(set_cookie(&response).is_none());
    assert_eq!(app.authority.session_count(), 0);
}

#[tokio::test]
async fn test_login_without_params_redirects_home() {
    let app = app();
    let response = app.router.oneshot(get("/auth/sso/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "https://lms.example.com/");
}

#[tokio::test]
async fn test_logout_leg_uses_misspelled_param_and_clears_cookie() {
    let app = app();
    let token = encode(
        &HandshakeArgs::new()
            .with("action", "logout")
            .with("mdl_uid", "5")
            .with("moodle_user_id", "5")
            .with("mdl_key", SECRET)
            .with("logout_redirect", "https://shop.example.com/bye")
            .with("mdl_one_time_code", "bye123"),
        SECRET,
    );
    let response = app
        .router
        .clone()
        .oneshot(ingest_request(&token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The correctly spelled name is not part of the wire contract.
    let response = app
        .router
        .clone()
        .oneshot(get("/auth/sso/logout?logout_id=5&verify_code=bye123"))
        .await
        .unwrap();
    assert_eq!(location(&response), "https://shop.example.com");
    assert!(set_cookie(&response).is_none());

    let token = encode(
        &HandshakeArgs::new()
            .with("action", "logout")
            .with("mdl_uid", "5")
            .with("moodle_user_id", "5")
            .with("mdl_key", SECRET)
            .with("logout_redirect", "https://shop.example.com/bye")
            .with("mdl_one_time_code", "bye456"),
        SECRET,
    );
    app.router
        .clone()
        .oneshot(ingest_request(&token))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get("/auth/sso/logout?logout_id=5&veridy_code=bye456"))
        .await
        .unwrap();
    assert_eq!(location(&response), "https://shop.example.com/bye");
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_ingest_rejects_bad_payload() {
    let app = app();
    let token = encode(
        &HandshakeArgs::new()
            .with("action", "login")
            .with("mdl_uid", "5")
            .with("mdl_key", "not-the-secret")
            .with("mdl_one_time_code", "abc"),
        SECRET,
    );

    let response = app.router.oneshot(ingest_request(&token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "invalid_payload");
    assert!(!json["message"].as_str().unwrap().contains("secret"));
}

#[tokio::test]
async fn test_ingest_disabled_without_secret() {
    let app = app_with(
        HandshakeConfig::new("", "https://lms.example.com", "https://shop.example.com"),
        None,
    );
    let response = app.router.oneshot(ingest_request("x")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_handoff_forwards_to_partner_login() {
    let app = app();
    let response = app
        .router
        .oneshot(get(
            "/auth/sso/handoff?login_id=5&verify_code=abc123&wpsiteurl=https%3A%2F%2Fshop.example.com",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "https://shop.example.com/auth/sso/login?login_id=5&verify_code=abc123"
    );
}

#[tokio::test]
async fn test_handoff_ignores_foreign_site_hint() {
    let app = app();
    let response = app
        .router
        .oneshot(get(
            "/auth/sso/handoff?login_id=5&verify_code=abc123&wpsiteurl=https%3A%2F%2Fevil.example.com",
        ))
        .await
        .unwrap();

    assert!(location(&response).starts_with("https://shop.example.com/auth/sso/login?"));
}

#[tokio::test]
async fn test_handoff_without_code_goes_home() {
    let app = app();
    let response = app
        .router
        .oneshot(get("/auth/sso/handoff?login_id=5"))
        .await
        .unwrap();
    assert_eq!(location(&response), "https://lms.example.com/");
}

#[tokio::test]
async fn test_hooks_require_configured_token() {
    let app = app_with(handshake_config(), None);
    let response = app
        .router
        .oneshot(hook_request(
            "/auth/sso/hooks/login",
            Some("anything"),
            r#"{"user_id":5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hooks_reject_wrong_token() {
    let app = app();
    for token in [None, Some("wrong")] {
        let response = app
            .router
            .clone()
            .oneshot(hook_request(
                "/auth/sso/hooks/login",
                token,
                r#"{"user_id":5}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_hook_for_unknown_user() {
    let app = app();
    let response = app
        .router
        .oneshot(hook_request(
            "/auth/sso/hooks/logout",
            Some("hook-token"),
            r#"{"user_id":404}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_hook_skips_with_invalid_remote() {
    let app = app_with(
        HandshakeConfig::new(SECRET, "https://lms.example.com", "not a url"),
        Some("hook-token"),
    );
    let response = app
        .router
        .oneshot(hook_request(
            "/auth/sso/hooks/login",
            Some("hook-token"),
            r#"{"user_id":5,"redirect_to":"https://lms.example.com/my"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let hook: HookResponse = serde_json::from_slice(&body).unwrap();
    assert!(!hook.dispatched);
    assert_eq!(hook.redirect_to, "https://lms.example.com/my");
}

#[tokio::test]
async fn test_repeated_query_params_still_redirect() {
    let app = app();
    for uri in [
        "/auth/sso/login?login_id=5&login_id=6&verify_code=abc",
        "/auth/sso/login?login_id=5&verify_code=a&verify_code=b",
        "/auth/sso/logout?logout_id=5&veridy_code=a&veridy_code=b",
        "/auth/sso/handoff?login_id=5&login_id=6&verify_code=abc",
    ] {
        let response = app.router.clone().oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_eq!(location(&response), "https://lms.example.com/", "{uri}");
        assert!(set_cookie(&response).is_none(), "{uri}");
    }
}

#[tokio::test]
async fn test_repeated_query_params_leave_pending_entry_intact() {
    let app = app();
    app.router
        .clone()
        .oneshot(ingest_request(&partner_login_token("abc123", Some(5))))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get("/auth/sso/login?login_id=5&login_id=5&verify_code=abc123"))
        .await
        .unwrap();
    assert_eq!(location(&response), "https://lms.example.com/");
    assert_eq!(app.authority.session_count(), 0);
    assert!(!app.store.is_empty());

    let response = app
        .router
        .clone()
        .oneshot(get("/auth/sso/login?login_id=5&verify_code=abc123"))
        .await
        .unwrap();
    assert!(set_cookie(&response).is_some());
    assert_eq!(app.authority.session_count(), 1);
}
