//! Fuzz target for capability payload extraction.
//!
//! Client capabilities arrive from an untrusted peer. Any JSON value must be
//! accepted without panicking, and either yield the declared strings or
//! nothing at all.

#![no_main]

use featurekit_core::capability::{extract_tags, extract_tags_from_initialize};
use featurekit_core::vocabulary::EXTENSION_ID;
use featurekit_core::{ClientCapabilities, parse};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    let tags = extract_tags(&value);
    let _ = parse(&tags).resolution();
    let _ = extract_tags_from_initialize(&value, EXTENSION_ID);

    // The typed view agrees with the raw walk
    if let Ok(caps) = serde_json::from_value::<ClientCapabilities>(value) {
        assert_eq!(caps.feature_tags(), tags);
    }
});
