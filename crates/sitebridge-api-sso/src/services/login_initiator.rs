//! Outbound login handshake.

use std::sync::Arc;

use sitebridge_core::urls::{append_query, join_path};
use sitebridge_core::{HandshakeAction, HandshakeConfig};
use tracing::instrument;

use super::{outbound_args, pending_or_root, InitiatorOutcome, OneTimeCode, PartnerNotifier};
use crate::codec::encode;
use crate::models::LocalUser;
use crate::protocol::{
    FIELD_LOGIN_REDIRECT, FIELD_ONE_TIME_CODE, HANDOFF_PATH, PARAM_LOGIN_ID, PARAM_SITE_URL,
    PARAM_VERIFY_CODE,
};

/// Runs after a successful local sign-in.
#[derive(Debug, Clone)]
pub struct LoginInitiator {
    config: Arc<HandshakeConfig>,
    notifier: PartnerNotifier,
}

impl LoginInitiator {
    #[must_use]
    pub fn new(config: Arc<HandshakeConfig>, notifier: PartnerNotifier) -> Self {
        Self { config, notifier }
    }

    /// Start a login handshake for `user`.
    ///
    /// Guests, a missing shared secret and an invalid partner URL all skip
    /// the handshake and leave the redirect at the caller's target. The
    /// local sign-in is complete either way; a failed partner notification
    /// only shows up in the logs.
    #[instrument(skip(self, user, pending_redirect), fields(user_id = %user.id))]
    pub async fn on_login(&self, user: &LocalUser, pending_redirect: Option<&str>) -> InitiatorOutcome {
        let redirect = pending_or_root(pending_redirect, self.config.local_root());

        if user.is_guest {
            return InitiatorOutcome::skipped(HandshakeAction::Login, user, redirect, "guest_user");
        }
        if !self.config.is_enabled() {
            return InitiatorOutcome::skipped(HandshakeAction::Login, user, redirect, "disabled");
        }
        let Some(remote_base) = self.config.remote_base() else {
            return InitiatorOutcome::skipped(
                HandshakeAction::Login,
                user,
                redirect,
                "invalid_remote_url",
            );
        };

        let code = OneTimeCode::generate();
        let args = outbound_args(
            HandshakeAction::Login,
            user,
            &self.config.shared_secret,
            remote_base,
        )
        .with(FIELD_LOGIN_REDIRECT, redirect.as_str())
        .with(FIELD_ONE_TIME_CODE, code.as_str());
        let token = encode(&args, &self.config.shared_secret);

        let acknowledged = self.notifier.dispatch(remote_base, &token).await;

        let user_id = user.id.to_string();
        let handoff = append_query(
            &join_path(&self.config.local_root(), HANDOFF_PATH),
            [
                (PARAM_LOGIN_ID, user_id.as_str()),
                (PARAM_VERIFY_CODE, code.as_str()),
                (PARAM_SITE_URL, remote_base),
            ],
        );

        InitiatorOutcome::dispatched(HandshakeAction::Login, user, handoff, acknowledged)
    }
}
