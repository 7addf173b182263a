//! One-time codes embedded in handshake payloads.
//!
//! A code is the MD5 hex digest of a random integer, which is what the
//! partner implementation generates and expects. It is guessable given
//! enough attempts; single-use consumption is what bounds the exposure.

use md5::{Digest, Md5};
use rand::rngs::OsRng;
use rand::Rng;
use subtle::ConstantTimeEq;

/// A freshly issued one-time code.
#[derive(Clone, PartialEq, Eq)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    /// Issue a new code.
    #[must_use]
    pub fn generate() -> Self {
        let seed: u32 = OsRng.gen();
        let digest = Md5::digest(seed.to_string().as_bytes());
        Self(format!("{digest:x}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for OneTimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OneTimeCode([redacted])")
    }
}

/// Compare an embedded code with the one the browser presented.
///
/// Both must be non-empty. Comparison is constant-time.
#[must_use]
pub fn codes_match(expected: &str, presented: &str) -> bool {
    if expected.is_empty() || presented.is_empty() {
        return false;
    }
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_is_md5_hex() {
        let code = OneTimeCode::generate();
        assert_eq!(code.as_str().len(), 32);
        assert!(code.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_codes_vary() {
        let codes: std::collections::HashSet<String> = (0..20)
            .map(|_| OneTimeCode::generate().as_str().to_string())
            .collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn test_codes_match() {
        assert!(codes_match("abc123", "abc123"));
        assert!(!codes_match("abc123", "wrong"));
        assert!(!codes_match("abc123", "ABC123"));
        assert!(!codes_match("", ""));
        assert!(!codes_match("abc123", ""));
        assert!(!codes_match("", "abc123"));
    }

    #[test]
    fn test_debug_redacts() {
        let code = OneTimeCode::generate();
        assert!(!format!("{code:?}").contains(code.as_str()));
    }
}
