//! Structure-aware fuzz target for feature resolution.
//!
//! Builds token lists mixing well-formed standard tags with arbitrary
//! strings, then checks the resolution rules hold for whatever comes out.

#![no_main]

use arbitrary::Arbitrary;
use featurekit_core::vocabulary::STANDARD_KEYS;
use featurekit_core::{FeatureSet, Format, Verbosity};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Token {
    Presence(u8),
    Negation(u8),
    Format(u8),
    Verbosity(u8),
    Raw(String),
}

impl Token {
    fn render(&self) -> String {
        let key = |i: &u8| STANDARD_KEYS[usize::from(*i) % STANDARD_KEYS.len()];
        match self {
            Self::Presence(i) => key(i).to_owned(),
            Self::Negation(i) => format!("!{}", key(i)),
            Self::Format(i) => {
                let values = ["json", "text", "markdown", "xml", ""];
                format!("format={}", values[usize::from(*i) % values.len()])
            }
            Self::Verbosity(i) => {
                let values = ["compact", "standard", "verbose", "loud", ""];
                format!("verbosity={}", values[usize::from(*i) % values.len()])
            }
            Self::Raw(s) => s.clone(),
        }
    }
}

fuzz_target!(|tokens: Vec<Token>| {
    let rendered: Vec<String> = tokens.iter().map(Token::render).collect();
    let features = FeatureSet::parse(&rendered);

    // Negation beats presence for every standard key
    for key in STANDARD_KEYS {
        if rendered.iter().any(|t| t.strip_prefix('!') == Some(*key)) {
            assert!(!features.is_enabled(key));
        }
    }

    // First valid value wins, otherwise the default
    let first_format = rendered
        .iter()
        .filter_map(|t| t.strip_prefix("format="))
        .find_map(|v| v.parse::<Format>().ok())
        .unwrap_or_default();
    assert_eq!(features.format(), first_format);

    let first_verbosity = rendered
        .iter()
        .filter_map(|t| t.strip_prefix("verbosity="))
        .find_map(|v| v.parse::<Verbosity>().ok())
        .unwrap_or_default();
    assert_eq!(features.verbosity(), first_verbosity);

    // Reparsing the canonical tokens is stable
    let again = FeatureSet::parse(features.tokens());
    assert_eq!(again, features);
});
