//! sitebridge bridge application.
//!
//! Wires the SSO routes to PostgreSQL and the process environment.

pub mod authority;
pub mod config;
pub mod logging;

use axum::{routing::get, Json, Router};
use sitebridge_api_sso::protocol::BASE_PATH;
use sitebridge_api_sso::{sso_router, SsoState};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn build_router(state: SsoState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest(BASE_PATH, sso_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
