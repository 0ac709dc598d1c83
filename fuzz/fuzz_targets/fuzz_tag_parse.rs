//! Fuzz target for feature tag parsing.
//!
//! Feeds arbitrary strings to the tag grammar and to the set parser. Parsing
//! must never panic, and every accepted tag must print back to its input.

#![no_main]

use featurekit_core::{FeatureSet, FeatureTag};
use libfuzzer_sys::fuzz_target;
use std::str::FromStr;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(tag) = FeatureTag::from_str(s) {
        assert_eq!(tag.to_string(), s);
    }

    // Newline-separated tokens as one declaration
    let features = FeatureSet::parse(s.split('\n'));
    let accepted = s.split('\n').filter(|t| t.parse::<FeatureTag>().is_ok()).count();
    assert_eq!(features.len(), accepted);

    // Every accessor is total
    let _ = features.resolution();
    let _ = features.has_tag(s);
    let _ = features.vendor_value(s);
    let _ = features.values(s).count();
    let _ = features.unknown_tags().count();
});
