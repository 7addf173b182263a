//! Inbound half of the initiators: store a partner's handshake payload.

use std::sync::Arc;

use chrono::Utc;
use sitebridge_core::{HandshakeAction, HandshakeConfig, UserId};
use subtle::ConstantTimeEq;
use tracing::{info, instrument, warn};

use crate::codec::{decode, extract_field};
use crate::error::{SsoError, SsoResult};
use crate::protocol::{
    purpose_for, FIELD_ACTION, FIELD_ONE_TIME_CODE, FIELD_SECRET, FIELD_TARGET_USER_ID,
    FIELD_USER_ID,
};
use crate::store::PendingHandshakeStore;

/// What was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReceipt {
    /// The id the responder will be called with.
    pub user_id: UserId,
    pub action: HandshakeAction,
}

/// Validates and stores payloads POSTed by the partner site.
#[derive(Clone)]
pub struct IngestService {
    config: Arc<HandshakeConfig>,
    store: Arc<dyn PendingHandshakeStore>,
}

impl IngestService {
    #[must_use]
    pub fn new(config: Arc<HandshakeConfig>, store: Arc<dyn PendingHandshakeStore>) -> Self {
        Self { config, store }
    }

    /// Check a partner payload and park it for the responder.
    ///
    /// The token is stored still encoded. It is keyed by the receiver-side
    /// user id when the partner sent one, otherwise by the sender's id.
    #[instrument(skip(self, token), fields(token_len = token.len()))]
    pub async fn ingest(&self, token: &str) -> SsoResult<IngestReceipt> {
        if !self.config.is_enabled() {
            return Err(SsoError::Disabled);
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(invalid("missing token"));
        }

        let plaintext = decode(token, &self.config.shared_secret);
        if plaintext.is_empty() {
            return Err(invalid("token could not be decoded"));
        }

        let embedded_secret = extract_field(&plaintext, FIELD_SECRET);
        let secret_matches: bool = embedded_secret
            .as_bytes()
            .ct_eq(self.config.shared_secret.as_bytes())
            .into();
        if !secret_matches {
            return Err(invalid("shared secret mismatch"));
        }

        let action: HandshakeAction = extract_field(&plaintext, FIELD_ACTION)
            .parse()
            .map_err(|reason: String| invalid(&reason))?;

        if extract_field(&plaintext, FIELD_ONE_TIME_CODE).trim().is_empty() {
            return Err(invalid("missing one-time code"));
        }

        let user_id = extract_field(&plaintext, FIELD_TARGET_USER_ID)
            .parse::<UserId>()
            .or_else(|_| extract_field(&plaintext, FIELD_USER_ID).parse::<UserId>())
            .map_err(|_| invalid("missing user id"))?;

        self.purge_stale().await;
        self.store.put(user_id, purpose_for(action), token).await?;

        info!(user_id = %user_id, action = %action, "Pending handshake stored");
        Ok(IngestReceipt { user_id, action })
    }

    async fn purge_stale(&self) {
        let Some(ttl) = self.config.pending_ttl else {
            return;
        };
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return;
        };
        if let Err(e) = self.store.purge_older_than(Utc::now() - ttl).await {
            warn!(error = %e, "Failed to purge stale pending handshakes");
        }
    }
}

fn invalid(reason: &str) -> SsoError {
    SsoError::InvalidPayload {
        reason: reason.to_string(),
    }
}
