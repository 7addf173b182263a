//! Fuzz target for handshake token decoding.
//!
//! Tokens arrive from the network, so decoding must never panic on
//! arbitrary input and must fail closed to an empty string.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_decode -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use sitebridge_api_sso::codec::{decode, encode, HandshakeArgs};

const SECRET: &str = "fuzz-secret";

fuzz_target!(|data: &[u8]| {
    if let Ok(token) = std::str::from_utf8(data) {
        let _ = decode(token, SECRET);
        let _ = decode(token, "");

        // Anything we encode must come back intact.
        let args = HandshakeArgs::new().with("action", "login").with("mdl_email", token);
        let plaintext = decode(&encode(&args, SECRET), SECRET);
        assert!(plaintext.starts_with("action=login&mdl_email="));
    }
});
