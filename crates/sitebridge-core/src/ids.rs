//! Strongly Typed Identifiers
//!
//! Both sites address users by integer ids on the wire (`login_id`,
//! `logout_id`, `mdl_uid`). Wrapping them keeps a user id from being
//! confused with any other integer flowing through the handshake.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Strongly typed identifier for a user on the local site.
///
/// Ids are strictly positive; `0` and negative values are the "no user"
/// placeholders some sites send and are rejected by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates an id from a raw database value.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.trim().parse().map_err(|e: std::num::ParseIntError| ParseIdError {
            id_type: "UserId",
            message: e.to_string(),
        })?;
        if raw <= 0 {
            return Err(ParseIdError {
                id_type: "UserId",
                message: format!("id must be positive, got {raw}"),
            });
        }
        Ok(Self(raw))
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_id() {
        let id: UserId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: UserId = " 7 ".parse().unwrap();
        assert_eq!(id, UserId::new(7));
    }

    #[test]
    fn test_parse_rejects_placeholders() {
        let err = "0".parse::<UserId>().unwrap_err();
        assert_eq!(err.id_type, "UserId");
        assert!("-3".parse::<UserId>().is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "abc".parse::<UserId>().unwrap_err();
        assert!(err.to_string().contains("Failed to parse UserId"));
        assert!("".parse::<UserId>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&UserId::new(5)).unwrap();
        assert_eq!(json, "5");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserId::new(5));
    }
}
