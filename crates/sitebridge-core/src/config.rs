//! Handshake configuration.
//!
//! The shared secret and the two site URLs are process-wide settings owned
//! by the administrator. They are read-only from the protocol's point of
//! view and travel as an explicit value into every component.

use std::time::Duration;

use crate::urls::{is_valid_site_url, strip_query};

/// Default path on the partner site that ingests handshake payloads.
pub const DEFAULT_PARTNER_PATH: &str = "/auth/sso/ingest";

/// Default bound on the outbound partner notification.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(100);

/// Settings shared by the initiators, the ingestion endpoint and the responder.
#[derive(Clone)]
pub struct HandshakeConfig {
    /// Symmetric key material; must match on both sites. Empty disables SSO.
    pub shared_secret: String,
    /// Public base URL of this site.
    pub local_url: String,
    /// Public base URL of the partner site. May be empty.
    pub remote_url: String,
    /// Where the partner should send the browser after a logout.
    pub logout_redirect_url: Option<String>,
    /// Path on the partner site that accepts the outbound payload.
    pub partner_path: String,
    /// Timeout for the best-effort partner notification.
    pub notify_timeout: Duration,
    /// Maximum age of an unconsumed pending entry. `None` keeps entries until
    /// they are consumed or overwritten.
    pub pending_ttl: Option<Duration>,
}

impl HandshakeConfig {
    /// Create a configuration with default partner path, timeout and no TTL.
    #[must_use]
    pub fn new(
        shared_secret: impl Into<String>,
        local_url: impl Into<String>,
        remote_url: impl Into<String>,
    ) -> Self {
        Self {
            shared_secret: shared_secret.into(),
            local_url: local_url.into(),
            remote_url: remote_url.into(),
            logout_redirect_url: None,
            partner_path: DEFAULT_PARTNER_PATH.to_string(),
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            pending_ttl: None,
        }
    }

    #[must_use]
    pub fn with_logout_redirect(mut self, url: impl Into<String>) -> Self {
        self.logout_redirect_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_partner_path(mut self, path: impl Into<String>) -> Self {
        self.partner_path = path.into();
        self
    }

    #[must_use]
    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_pending_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.pending_ttl = ttl;
        self
    }

    /// SSO is enabled only when a shared secret is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.shared_secret.is_empty()
    }

    /// The partner base URL with its query string removed, if it is a valid site URL.
    #[must_use]
    pub fn remote_base(&self) -> Option<&str> {
        if is_valid_site_url(&self.remote_url) {
            Some(strip_query(&self.remote_url))
        } else {
            None
        }
    }

    /// The local site root used as the fallback redirect target.
    #[must_use]
    pub fn local_root(&self) -> String {
        let base = strip_query(&self.local_url).trim_end_matches('/');
        if base.is_empty() {
            "/".to_string()
        } else {
            format!("{base}/")
        }
    }

    /// The configured logout redirect, if present and syntactically valid.
    #[must_use]
    pub fn logout_redirect(&self) -> Option<&str> {
        self.logout_redirect_url
            .as_deref()
            .map(str::trim)
            .filter(|url| is_valid_site_url(url))
    }
}

impl std::fmt::Debug for HandshakeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandshakeConfig")
            .field(
                "shared_secret",
                &if self.shared_secret.is_empty() {
                    "[unset]"
                } else {
                    "[redacted]"
                },
            )
            .field("local_url", &self.local_url)
            .field("remote_url", &self.remote_url)
            .field("logout_redirect_url", &self.logout_redirect_url)
            .field("partner_path", &self.partner_path)
            .field("notify_timeout", &self.notify_timeout)
            .field("pending_ttl", &self.pending_ttl)
            .finish()
    }
}
