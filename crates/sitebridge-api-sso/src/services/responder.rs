//! Inbound handshake responder.
//!
//! Both legs run `LOOKUP -> VERIFY -> {AUTHENTICATE | REJECT}` and end in a
//! [`ResponderOutcome`] carrying the next browser location. Nothing here
//! returns an error: store and authority failures become rejections that
//! send the browser to the local root with the error marker attached.

use std::sync::Arc;

use chrono::Utc;
use sitebridge_core::urls::{append_query, is_valid_site_url};
use sitebridge_core::{EventOutcome, HandshakeAction, HandshakeConfig, SiteRole, SsoEvent, UserId};
use tracing::{error, instrument, warn};

use super::one_time_code::codes_match;
use crate::codec::{decode, extract_field};
use crate::models::{LocalUser, SessionTicket};
use crate::protocol::{
    purpose_for, ERROR_MARKER, FIELD_COURSE_URL, FIELD_EMAIL, FIELD_LOGIN_REDIRECT,
    FIELD_LOGOUT_REDIRECT, FIELD_ONE_TIME_CODE, FIELD_TARGET_USER_ID,
};
use crate::router::LocalAuthority;
use crate::store::PendingHandshakeStore;

/// Why a handshake was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No usable id in the request.
    MissingId,
    /// Nothing pending for that id, or it was already consumed.
    EntryNotFound,
    /// The pending entry outlived the configured TTL.
    Expired,
    /// Presented code empty or different from the embedded one.
    CodeMismatch,
    /// The payload names no local user.
    MissingTargetUser,
    /// The payload names a user that does not exist here.
    UnknownUser,
    /// Store or local authority failure.
    Internal,
}

impl RejectReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::MissingId => "missing_id",
            RejectReason::EntryNotFound => "entry_not_found",
            RejectReason::Expired => "expired",
            RejectReason::CodeMismatch => "code_mismatch",
            RejectReason::MissingTargetUser => "missing_target_user",
            RejectReason::UnknownUser => "unknown_user",
            RejectReason::Internal => "internal",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one responder leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderOutcome {
    /// A local session was opened.
    Authenticated {
        user_id: UserId,
        session: SessionTicket,
        redirect_to: String,
    },
    /// The browser's session should be cleared. `user_id` is set when the
    /// payload identified a local user whose sessions were revoked.
    SignedOut {
        user_id: Option<UserId>,
        redirect_to: String,
    },
    Rejected {
        redirect_to: String,
        reason: RejectReason,
    },
}

impl ResponderOutcome {
    #[must_use]
    pub fn redirect_to(&self) -> &str {
        match self {
            ResponderOutcome::Authenticated { redirect_to, .. }
            | ResponderOutcome::SignedOut { redirect_to, .. }
            | ResponderOutcome::Rejected { redirect_to, .. } => redirect_to,
        }
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, ResponderOutcome::Rejected { .. })
    }
}

enum Target {
    Found(LocalUser),
    Missing,
    Unknown,
}

/// Consumes pending handshakes and acts on them.
#[derive(Clone)]
pub struct HandshakeResponder {
    config: Arc<HandshakeConfig>,
    store: Arc<dyn PendingHandshakeStore>,
    authority: Arc<dyn LocalAuthority>,
}

impl HandshakeResponder {
    #[must_use]
    pub fn new(
        config: Arc<HandshakeConfig>,
        store: Arc<dyn PendingHandshakeStore>,
        authority: Arc<dyn LocalAuthority>,
    ) -> Self {
        Self {
            config,
            store,
            authority,
        }
    }

    /// Login leg: `login_id` + `verify_code`.
    #[instrument(skip(self, verify_code))]
    pub async fn complete_login(
        &self,
        login_id: Option<&str>,
        verify_code: Option<&str>,
    ) -> ResponderOutcome {
        let outcome = self.login(login_id, verify_code.unwrap_or_default()).await;
        self.record(HandshakeAction::Login, &outcome);
        outcome
    }

    /// Logout leg: `logout_id` + `veridy_code`.
    #[instrument(skip(self, verify_code))]
    pub async fn complete_logout(
        &self,
        logout_id: Option<&str>,
        verify_code: Option<&str>,
    ) -> ResponderOutcome {
        let outcome = self.logout(logout_id, verify_code.unwrap_or_default()).await;
        self.record(HandshakeAction::Logout, &outcome);
        outcome
    }

    async fn login(&self, login_id: Option<&str>, verify_code: &str) -> ResponderOutcome {
        let Some(lookup_id) = parse_id(login_id) else {
            return self.reject(RejectReason::MissingId);
        };

        let plaintext = match self.consume(lookup_id, HandshakeAction::Login).await {
            Ok(plaintext) => plaintext,
            Err(reason) => return self.reject(reason),
        };

        let embedded = extract_field(&plaintext, FIELD_ONE_TIME_CODE);
        if !codes_match(&embedded, verify_code.trim()) {
            return self.reject(RejectReason::CodeMismatch);
        }

        let user = match self.resolve_target(&plaintext).await {
            Ok(Target::Found(user)) => user,
            Ok(Target::Missing) => return self.reject(RejectReason::MissingTargetUser),
            Ok(Target::Unknown) => return self.reject(RejectReason::UnknownUser),
            Err(reason) => return self.reject(reason),
        };

        let session = match self.authority.establish_session(&user).await {
            Ok(session) => session,
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Failed to establish local session");
                return self.reject(RejectReason::Internal);
            }
        };

        ResponderOutcome::Authenticated {
            user_id: user.id,
            session,
            redirect_to: self.login_destination(&plaintext, &user),
        }
    }

    async fn logout(&self, logout_id: Option<&str>, verify_code: &str) -> ResponderOutcome {
        let Some(lookup_id) = parse_id(logout_id) else {
            return self.reject(RejectReason::MissingId);
        };

        let plaintext = match self.consume(lookup_id, HandshakeAction::Logout).await {
            Ok(plaintext) => plaintext,
            Err(reason) => return self.reject(reason),
        };

        let embedded = extract_field(&plaintext, FIELD_ONE_TIME_CODE);
        if !codes_match(&embedded, verify_code.trim()) {
            return self.reject(RejectReason::CodeMismatch);
        }

        // Only revoke server-side sessions for a user the payload names
        // unambiguously; the browser's own session is cleared regardless.
        let user_id = match self.resolve_target(&plaintext).await {
            Ok(Target::Found(user)) => {
                if let Err(e) = self.authority.terminate_sessions(user.id).await {
                    error!(user_id = %user.id, error = %e, "Failed to terminate local sessions");
                    return self.reject(RejectReason::Internal);
                }
                Some(user.id)
            }
            Ok(Target::Missing | Target::Unknown) => None,
            Err(reason) => return self.reject(reason),
        };

        let embedded_redirect = extract_field(&plaintext, FIELD_LOGOUT_REDIRECT);
        let redirect_to = if is_valid_site_url(&embedded_redirect) {
            embedded_redirect.trim().to_string()
        } else {
            self.remote_or_root()
        };

        ResponderOutcome::SignedOut {
            user_id,
            redirect_to,
        }
    }

    /// Take the pending entry and decode it.
    ///
    /// The entry is gone after this call whatever happens next.
    async fn consume(&self, lookup_id: UserId, action: HandshakeAction) -> Result<String, RejectReason> {
        let entry = match self.store.take(lookup_id, purpose_for(action)).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Err(RejectReason::EntryNotFound),
            Err(e) => {
                error!(lookup_id = %lookup_id, error = %e, "Pending handshake store unavailable");
                return Err(RejectReason::Internal);
            }
        };

        if let Some(ttl) = self.config.pending_ttl {
            if entry.is_expired(ttl, Utc::now()) {
                return Err(RejectReason::Expired);
            }
        }

        Ok(decode(&entry.token, &self.config.shared_secret))
    }

    /// The local user a decoded payload refers to: the explicit target id,
    /// else the sender's email.
    async fn resolve_target(&self, plaintext: &str) -> Result<Target, RejectReason> {
        let raw_id = extract_field(plaintext, FIELD_TARGET_USER_ID);
        let lookup = if raw_id.trim().is_empty() {
            let email = extract_field(plaintext, FIELD_EMAIL);
            if email.trim().is_empty() {
                return Ok(Target::Missing);
            }
            self.authority.find_user_by_email(email.trim()).await
        } else {
            let Ok(user_id) = raw_id.parse::<UserId>() else {
                return Ok(Target::Unknown);
            };
            self.authority.find_user(user_id).await
        };

        match lookup {
            Ok(Some(user)) if !user.is_guest => Ok(Target::Found(user)),
            Ok(_) => Ok(Target::Unknown),
            Err(e) => {
                error!(error = %e, "Local user lookup failed");
                Err(RejectReason::Internal)
            }
        }
    }

    fn login_destination(&self, plaintext: &str, user: &LocalUser) -> String {
        let embedded = extract_field(plaintext, FIELD_LOGIN_REDIRECT);
        if is_valid_site_url(&embedded) {
            return embedded.trim().to_string();
        }
        let course = extract_field(plaintext, FIELD_COURSE_URL);
        if is_valid_site_url(&course) {
            return course.trim().to_string();
        }
        user.landing_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map_or_else(|| self.config.local_root(), str::to_string)
    }

    fn remote_or_root(&self) -> String {
        self.config
            .remote_base()
            .map_or_else(|| self.config.local_root(), str::to_string)
    }

    fn reject(&self, reason: RejectReason) -> ResponderOutcome {
        let redirect_to = match reason {
            RejectReason::MissingId => self.config.local_root(),
            RejectReason::EntryNotFound | RejectReason::Expired | RejectReason::CodeMismatch => {
                self.remote_or_root()
            }
            RejectReason::MissingTargetUser | RejectReason::UnknownUser | RejectReason::Internal => {
                append_query(&self.config.local_root(), [ERROR_MARKER])
            }
        };
        ResponderOutcome::Rejected {
            redirect_to,
            reason,
        }
    }

    fn record(&self, direction: HandshakeAction, outcome: &ResponderOutcome) {
        let (user_id, event_outcome) = match outcome {
            ResponderOutcome::Authenticated { user_id, .. } => (Some(*user_id), EventOutcome::Completed),
            ResponderOutcome::SignedOut { user_id, .. } => (*user_id, EventOutcome::Completed),
            ResponderOutcome::Rejected { reason, .. } => {
                if *reason == RejectReason::CodeMismatch {
                    warn!(direction = %direction, "One-time code mismatch");
                }
                (None, EventOutcome::Rejected(reason.to_string()))
            }
        };
        SsoEvent::new(direction, SiteRole::Remote, user_id, event_outcome).record();
    }
}

fn parse_id(raw: Option<&str>) -> Option<UserId> {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .and_then(|id| id.parse().ok())
}
