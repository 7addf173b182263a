//! Fuzz target for plaintext field extraction.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_extract_field -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use sitebridge_api_sso::codec::extract_field;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    for key in ["action", "mdl_key", "mdl_one_time_code", "moodle_user_id", ""] {
        let _ = extract_field(&text, key);
    }
});
