//! Best-effort partner notification.
//!
//! The encoded token is POSTed to the partner's ingestion path as a single
//! form field. The initiators await the call (bounded by the configured
//! timeout) but never let its outcome change theirs.

use reqwest::Client;
use sitebridge_core::urls::join_path;
use sitebridge_core::HandshakeConfig;
use tracing::{debug, warn};

use crate::error::{SsoError, SsoResult};
use crate::protocol::FORM_FIELD_TOKEN;

/// User agent sent to partner sites.
pub const USER_AGENT: &str = concat!("sitebridge-sso/", env!("CARGO_PKG_VERSION"));

/// Sends handshake payloads to the partner site.
#[derive(Debug, Clone)]
pub struct PartnerNotifier {
    http_client: Client,
    partner_path: String,
}

impl PartnerNotifier {
    /// Build a notifier with the configured timeout.
    ///
    /// Redirects are not followed and TLS certificates are verified.
    pub fn new(config: &HandshakeConfig) -> SsoResult<Self> {
        let http_client = Client::builder()
            .timeout(config.notify_timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| SsoError::ConfigurationError {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http_client,
            partner_path: config.partner_path.clone(),
        })
    }

    /// POST `token` to `{remote_base}{partner_path}`.
    pub async fn notify(&self, remote_base: &str, token: &str) -> SsoResult<()> {
        let url = join_path(remote_base, &self.partner_path);
        let response = self
            .http_client
            .post(&url)
            .form(&[(FORM_FIELD_TOKEN, token)])
            .send()
            .await?;

        response.error_for_status()?;
        debug!(url = %url, "Partner notified");
        Ok(())
    }

    /// Fire-and-forget variant: failures are logged and swallowed.
    ///
    /// Returns whether the partner acknowledged the payload.
    pub async fn dispatch(&self, remote_base: &str, token: &str) -> bool {
        match self.notify(remote_base, token).await {
            Ok(()) => true,
            Err(e) => {
                warn!(remote = %remote_base, error = %e, "Partner notification failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("sitebridge-sso/"));
    }

    #[test]
    fn test_builds_from_config() {
        let config = HandshakeConfig::new("k", "https://lms.example.com", "https://shop.example.com")
            .with_partner_path("/custom/ingest");
        let notifier = PartnerNotifier::new(&config).expect("client");
        assert_eq!(notifier.partner_path, "/custom/ingest");
    }
}
