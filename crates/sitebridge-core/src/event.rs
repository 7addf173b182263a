//! Handshake direction and observability record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// The two handshake directions, carried on the wire as the `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeAction {
    Login,
    Logout,
}

impl HandshakeAction {
    /// Wire value of the `action` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HandshakeAction::Login => "login",
            HandshakeAction::Logout => "logout",
        }
    }
}

impl std::fmt::Display for HandshakeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HandshakeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "login" => Ok(HandshakeAction::Login),
            "logout" => Ok(HandshakeAction::Logout),
            other => Err(format!("unknown handshake action '{other}'")),
        }
    }
}

/// Which site started the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteRole {
    Local,
    Remote,
}

impl std::fmt::Display for SiteRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteRole::Local => f.write_str("local"),
            SiteRole::Remote => f.write_str("remote"),
        }
    }
}

/// How a handshake attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum EventOutcome {
    /// Outbound notification sent and browser handed off.
    Dispatched,
    /// Initiator preconditions not met; nothing was sent.
    Skipped(String),
    /// Responder established or tore down a local session.
    Completed,
    /// Responder refused the handshake.
    Rejected(String),
}

/// One login or logout attempt. Not persisted; logged and returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoEvent {
    pub direction: HandshakeAction,
    pub origin: SiteRole,
    pub user_id: Option<UserId>,
    pub outcome: EventOutcome,
    pub occurred_at: DateTime<Utc>,
}

impl SsoEvent {
    #[must_use]
    pub fn new(
        direction: HandshakeAction,
        origin: SiteRole,
        user_id: Option<UserId>,
        outcome: EventOutcome,
    ) -> Self {
        Self {
            direction,
            origin,
            user_id,
            outcome,
            occurred_at: Utc::now(),
        }
    }

    /// Whether the attempt ended in a refusal.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self.outcome, EventOutcome::Rejected(_))
    }

    /// Write the event to the log: `info` for success, `warn` for refusals.
    pub fn record(&self) {
        let user_id = self.user_id.map(|id| id.get());
        match &self.outcome {
            EventOutcome::Rejected(reason) => tracing::warn!(
                target: "sso_event",
                direction = %self.direction,
                origin = %self.origin,
                user_id = ?user_id,
                reason = %reason,
                "SSO handshake rejected"
            ),
            EventOutcome::Skipped(reason) => tracing::debug!(
                target: "sso_event",
                direction = %self.direction,
                origin = %self.origin,
                user_id = ?user_id,
                reason = %reason,
                "SSO handshake skipped"
            ),
            outcome => tracing::info!(
                target: "sso_event",
                direction = %self.direction,
                origin = %self.origin,
                user_id = ?user_id,
                outcome = ?outcome,
                "SSO handshake event"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_values() {
        assert_eq!(HandshakeAction::Login.to_string(), "login");
        assert_eq!("LOGOUT".parse::<HandshakeAction>(), Ok(HandshakeAction::Logout));
        assert!("signup".parse::<HandshakeAction>().is_err());
    }

    #[test]
    fn test_event_rejection_flag() {
        let event = SsoEvent::new(
            HandshakeAction::Login,
            SiteRole::Remote,
            Some(UserId::new(5)),
            EventOutcome::Rejected("code_mismatch".to_string()),
        );
        assert!(event.is_rejection());

        let ok = SsoEvent::new(
            HandshakeAction::Logout,
            SiteRole::Local,
            None,
            EventOutcome::Dispatched,
        );
        assert!(!ok.is_rejection());
    }
}
