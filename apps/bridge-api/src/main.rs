//! sitebridge bridge server.

use std::net::SocketAddr;
use std::sync::Arc;

use bridge_api::authority::PgLocalAuthority;
use bridge_api::config::Config;
use bridge_api::{build_router, logging};
use sitebridge_api_sso::{PgHandshakeStore, SsoState};
use sitebridge_db::{run_migrations, DbPool};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        env = %config.app_env,
        sso_enabled = !config.sso_shared_secret.is_empty(),
        "Starting sitebridge"
    );

    match config.validate_security_config() {
        Ok(warnings) => {
            for warning in &warnings {
                tracing::warn!(target: "security", "{}", warning);
            }
            if !warnings.is_empty() {
                tracing::warn!(
                    target: "security",
                    count = warnings.len(),
                    "Insecure settings detected (allowed in {} mode)",
                    config.app_env
                );
            }
        }
        Err(errors) => {
            for error in &errors {
                tracing::error!(target: "security", "{}", error);
            }
            eprintln!(
                "FATAL: {} insecure setting(s) detected in production mode. \
                 Fix the SSO settings or use APP_ENV=development.",
                errors.len()
            );
            std::process::exit(1);
        }
    }

    let pool = match DbPool::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    }

    let store = Arc::new(PgHandshakeStore::new(pool.inner().clone()));
    let authority = Arc::new(PgLocalAuthority::new(pool.inner().clone()));

    let state = match SsoState::new(config.sso_config(), store, authority) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to initialize SSO: {e}");
            std::process::exit(1);
        }
    };

    let app = build_router(state);

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid bind address {}:{}: {e}", config.host, config.port);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    info!(%addr, "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server stopped");
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
