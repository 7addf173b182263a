//! Handshake services.

pub mod ingest;
pub mod login_initiator;
pub mod logout_initiator;
pub mod notifier;
pub mod one_time_code;
pub mod responder;

pub use ingest::{IngestReceipt, IngestService};
pub use login_initiator::LoginInitiator;
pub use logout_initiator::LogoutInitiator;
pub use notifier::PartnerNotifier;
pub use one_time_code::{codes_match, OneTimeCode};
pub use responder::{HandshakeResponder, RejectReason, ResponderOutcome};

use sitebridge_core::{EventOutcome, HandshakeAction, SiteRole, SsoEvent};

use crate::codec::HandshakeArgs;
use crate::models::LocalUser;
use crate::protocol::{
    FIELD_ACTION, FIELD_EMAIL, FIELD_SECRET, FIELD_SITE_URL, FIELD_USERNAME, FIELD_USER_ID,
};

/// What an initiator decided.
#[derive(Debug, Clone)]
pub struct InitiatorOutcome {
    /// The caller's new pending redirect target.
    pub redirect_to: String,
    /// Whether a handshake was started. False when preconditions skipped it.
    pub dispatched: bool,
    /// Whether the partner accepted the server-to-server notification.
    pub partner_acknowledged: bool,
    pub event: SsoEvent,
}

impl InitiatorOutcome {
    pub(crate) fn skipped(
        action: HandshakeAction,
        user: &LocalUser,
        redirect_to: String,
        reason: &str,
    ) -> Self {
        let event = SsoEvent::new(
            action,
            SiteRole::Local,
            Some(user.id),
            EventOutcome::Skipped(reason.to_string()),
        );
        event.record();
        Self {
            redirect_to,
            dispatched: false,
            partner_acknowledged: false,
            event,
        }
    }

    pub(crate) fn dispatched(
        action: HandshakeAction,
        user: &LocalUser,
        redirect_to: String,
        partner_acknowledged: bool,
    ) -> Self {
        let event = SsoEvent::new(action, SiteRole::Local, Some(user.id), EventOutcome::Dispatched);
        event.record();
        Self {
            redirect_to,
            dispatched: true,
            partner_acknowledged,
            event,
        }
    }
}

/// Fields common to both outbound legs.
pub(crate) fn outbound_args(
    action: HandshakeAction,
    user: &LocalUser,
    secret: &str,
    remote_base: &str,
) -> HandshakeArgs {
    HandshakeArgs::new()
        .with(FIELD_ACTION, action.as_str())
        .with(FIELD_USER_ID, user.id.to_string())
        .with(FIELD_USERNAME, user.username.as_str())
        .with(FIELD_EMAIL, user.email.as_str())
        .with(FIELD_SECRET, secret)
        .with(FIELD_SITE_URL, remote_base)
}

/// The caller's pending redirect, or the local root when there is none.
pub(crate) fn pending_or_root(pending: Option<&str>, local_root: String) -> String {
    pending
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .map_or(local_root, str::to_string)
}
