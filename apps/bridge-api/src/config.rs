//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: a required variable that is missing or malformed
//! stops startup with a message naming it.

use std::env;
use std::time::Duration;

use sitebridge_api_sso::SsoConfig;
use sitebridge_core::config::{DEFAULT_NOTIFY_TIMEOUT, DEFAULT_PARTNER_PATH};
use sitebridge_core::urls::is_valid_site_url;
use sitebridge_core::HandshakeConfig;
use thiserror::Error;

/// Shared secrets shorter than this are reported as weak.
pub const MIN_SHARED_SECRET_LEN: usize = 16;

/// Application environment mode.
///
/// `Development` logs insecure settings as warnings; `Production` refuses
/// to start with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    /// Parse an `APP_ENV` value. Unknown values mean development.
    pub fn from_env_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => {
                tracing::warn!(
                    value = other,
                    "Unrecognized APP_ENV value, defaulting to Development"
                );
                Self::Development
            }
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    pub app_env: AppEnvironment,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub rust_log: String,

    /// Shared with the partner site. Empty disables SSO.
    pub sso_shared_secret: String,
    /// Public base URL of this site.
    pub sso_local_url: String,
    /// Public base URL of the partner site.
    pub sso_remote_url: String,
    pub sso_logout_redirect_url: Option<String>,
    pub sso_partner_path: String,
    pub sso_notify_timeout: Duration,
    /// Unset keeps pending handshakes until consumed or overwritten.
    pub sso_pending_ttl: Option<Duration>,
    /// Bearer token for the initiator hooks. Unset disables them.
    pub sso_hook_token: Option<String>,
    pub secure_cookies: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_env", &self.app_env)
            .field("database_url", &"[redacted]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sso_shared_secret", &"[redacted]")
            .field("sso_local_url", &self.sso_local_url)
            .field("sso_remote_url", &self.sso_remote_url)
            .field("sso_pending_ttl", &self.sso_pending_ttl)
            .field("sso_hook_token", &self.sso_hook_token.as_ref().map(|_| "[redacted]"))
            .field("secure_cookies", &self.secure_cookies)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Required Variables
    ///
    /// - `DATABASE_URL` - PostgreSQL connection string
    ///
    /// # Optional Variables
    ///
    /// - `APP_ENV` - `development` (default) or `production`
    /// - `HOST` / `PORT` - Bind address (default `0.0.0.0:8080`)
    /// - `RUST_LOG` - Log filter (default `info`)
    /// - `SSO_SHARED_SECRET`, `SSO_LOCAL_URL`, `SSO_REMOTE_URL`
    /// - `SSO_LOGOUT_REDIRECT_URL`, `SSO_PARTNER_PATH`
    /// - `SSO_NOTIFY_TIMEOUT_SECS` (default 100), `SSO_PENDING_TTL_SECS` (default none)
    /// - `SSO_HOOK_TOKEN`, `SSO_SECURE_COOKIES` (default true)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let app_env = AppEnvironment::from_env_str(
            &var("APP_ENV").unwrap_or_else(|| "development".to_string()),
        );

        let database_url =
            var("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT").unwrap_or_else(|| "8080".to_string()).parse()?;
        let rust_log = var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let sso_shared_secret = lookup("SSO_SHARED_SECRET").unwrap_or_default();
        let sso_local_url =
            var("SSO_LOCAL_URL").unwrap_or_else(|| format!("http://localhost:{port}"));
        if !is_valid_site_url(&sso_local_url) {
            return Err(ConfigError::InvalidValue {
                var: "SSO_LOCAL_URL".to_string(),
                message: "Must be an absolute http(s) URL".to_string(),
            });
        }
        // An invalid remote URL is tolerated: the initiators skip SSO for it.
        let sso_remote_url = var("SSO_REMOTE_URL").unwrap_or_default();

        let sso_logout_redirect_url = var("SSO_LOGOUT_REDIRECT_URL");
        let sso_partner_path =
            var("SSO_PARTNER_PATH").unwrap_or_else(|| DEFAULT_PARTNER_PATH.to_string());

        let sso_notify_timeout = match var("SSO_NOTIFY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_secs("SSO_NOTIFY_TIMEOUT_SECS", &raw)?),
            None => DEFAULT_NOTIFY_TIMEOUT,
        };
        let sso_pending_ttl = var("SSO_PENDING_TTL_SECS")
            .map(|raw| parse_secs("SSO_PENDING_TTL_SECS", &raw).map(Duration::from_secs))
            .transpose()?;

        let sso_hook_token = var("SSO_HOOK_TOKEN");
        let secure_cookies = var("SSO_SECURE_COOKIES")
            .map_or(true, |s| !matches!(s.to_lowercase().as_str(), "false" | "0" | "no"));

        Ok(Self {
            app_env,
            database_url,
            host,
            port,
            rust_log,
            sso_shared_secret,
            sso_local_url,
            sso_remote_url,
            sso_logout_redirect_url,
            sso_partner_path,
            sso_notify_timeout,
            sso_pending_ttl,
            sso_hook_token,
            secure_cookies,
        })
    }

    /// The handshake settings handed to every SSO component.
    #[must_use]
    pub fn handshake_config(&self) -> HandshakeConfig {
        let mut handshake = HandshakeConfig::new(
            self.sso_shared_secret.clone(),
            self.sso_local_url.clone(),
            self.sso_remote_url.clone(),
        )
        .with_partner_path(self.sso_partner_path.clone())
        .with_notify_timeout(self.sso_notify_timeout)
        .with_pending_ttl(self.sso_pending_ttl);
        if let Some(url) = &self.sso_logout_redirect_url {
            handshake = handshake.with_logout_redirect(url.clone());
        }
        handshake
    }

    #[must_use]
    pub fn sso_config(&self) -> SsoConfig {
        SsoConfig {
            handshake: self.handshake_config(),
            hook_token: self.sso_hook_token.clone(),
            secure_cookies: self.secure_cookies,
        }
    }

    /// Validate security configuration based on the application environment.
    ///
    /// In **production** mode: returns `Err(errors)` listing every issue.
    /// In **development** mode: returns `Ok(warnings)` listing every issue.
    pub fn validate_security_config(&self) -> Result<Vec<String>, Vec<String>> {
        let mut issues = Vec::new();
        let remote_configured = !self.sso_remote_url.trim().is_empty();

        if self.sso_shared_secret.is_empty() && remote_configured {
            issues.push(
                "SSO_SHARED_SECRET is empty while SSO_REMOTE_URL is set; SSO is disabled"
                    .to_string(),
            );
        } else if !self.sso_shared_secret.is_empty()
            && self.sso_shared_secret.len() < MIN_SHARED_SECRET_LEN
        {
            issues.push(format!(
                "SSO_SHARED_SECRET is shorter than {MIN_SHARED_SECRET_LEN} characters"
            ));
        }

        if remote_configured && !self.sso_remote_url.trim().starts_with("https://") {
            issues.push("SSO_REMOTE_URL does not use https".to_string());
        }

        if self.sso_hook_token.is_none() {
            issues.push("SSO_HOOK_TOKEN is not set; initiator hooks are disabled".to_string());
        }

        if !self.secure_cookies {
            issues.push("SSO_SECURE_COOKIES is disabled".to_string());
        }

        if issues.is_empty() {
            return Ok(Vec::new());
        }

        if self.app_env.is_production() {
            Err(issues)
        } else {
            Ok(issues)
        }
    }
}

fn parse_secs(var: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
        var: var.to_string(),
        message: format!("Expected whole seconds: {e}"),
    })
}
