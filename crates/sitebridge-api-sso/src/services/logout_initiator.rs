//! Outbound logout handshake.

use std::sync::Arc;

use sitebridge_core::urls::{append_query, join_path};
use sitebridge_core::{HandshakeAction, HandshakeConfig};
use tracing::instrument;

use super::{outbound_args, pending_or_root, InitiatorOutcome, OneTimeCode, PartnerNotifier};
use crate::codec::encode;
use crate::models::LocalUser;
use crate::protocol::{
    FIELD_LOGOUT_REDIRECT, FIELD_ONE_TIME_CODE, LOGOUT_PATH, PARAM_LOGOUT_ID,
    PARAM_LOGOUT_VERIFY_CODE,
};

/// Runs on local sign-out.
#[derive(Debug, Clone)]
pub struct LogoutInitiator {
    config: Arc<HandshakeConfig>,
    notifier: PartnerNotifier,
}

impl LogoutInitiator {
    #[must_use]
    pub fn new(config: Arc<HandshakeConfig>, notifier: PartnerNotifier) -> Self {
        Self { config, notifier }
    }

    /// Start a logout handshake for `user`.
    ///
    /// On success the browser goes straight to the partner's logout leg. The
    /// partner later sends it on to the configured logout redirect when one
    /// is set, otherwise to where the caller was going.
    #[instrument(skip(self, user, pending_redirect), fields(user_id = %user.id))]
    pub async fn on_logout(&self, user: &LocalUser, pending_redirect: Option<&str>) -> InitiatorOutcome {
        let redirect = pending_or_root(pending_redirect, self.config.local_root());

        if user.is_guest {
            return InitiatorOutcome::skipped(HandshakeAction::Logout, user, redirect, "guest_user");
        }
        if !self.config.is_enabled() {
            return InitiatorOutcome::skipped(HandshakeAction::Logout, user, redirect, "disabled");
        }
        let Some(remote_base) = self.config.remote_base() else {
            return InitiatorOutcome::skipped(
                HandshakeAction::Logout,
                user,
                redirect,
                "invalid_remote_url",
            );
        };

        let after_logout = self
            .config
            .logout_redirect()
            .map_or(redirect, str::to_string);

        let code = OneTimeCode::generate();
        let args = outbound_args(
            HandshakeAction::Logout,
            user,
            &self.config.shared_secret,
            remote_base,
        )
        .with(FIELD_LOGOUT_REDIRECT, after_logout.as_str())
        .with(FIELD_ONE_TIME_CODE, code.as_str());
        let token = encode(&args, &self.config.shared_secret);

        let acknowledged = self.notifier.dispatch(remote_base, &token).await;

        let user_id = user.id.to_string();
        let partner_logout = append_query(
            &join_path(remote_base, LOGOUT_PATH),
            [
                (PARAM_LOGOUT_ID, user_id.as_str()),
                (PARAM_LOGOUT_VERIFY_CODE, code.as_str()),
            ],
        );

        InitiatorOutcome::dispatched(HandshakeAction::Logout, user, partner_logout, acknowledged)
    }
}
