//! Test fixtures for featurekit testing.
//!
//! Token sets describing typical clients, and builders that wrap tokens in
//! the wire payloads a server receives during the handshake.

use featurekit_core::vocabulary::{EXTENSION_ID, FEATURES_FIELD};
use serde_json::{Value, json};

/// An automated agent wanting dense JSON.
pub const AGENT_TOKENS: &[&str] = &["agent", "sampling", "format=json", "verbosity=compact"];

/// A person at an interactive client.
pub const HUMAN_TOKENS: &[&str] = &[
    "human",
    "!mcp-capable",
    "interactive",
    "verbosity=standard",
    "format=markdown",
];

/// A client that predates content negotiation.
pub const LEGACY_TOKENS: &[&str] = &[];

/// Tokens that all fail the tag grammar.
pub const MALFORMED_TOKENS: &[&str] = &["", " ", "!", "=", "=json", "format=", "two words", "ünï"];

/// Client capabilities declaring `tokens` under the standard extension id.
#[must_use]
pub fn capabilities_payload<I, S>(tokens: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens: Vec<Value> = tokens
        .into_iter()
        .map(|t| Value::String(t.as_ref().to_owned()))
        .collect();
    json!({
        "experimental": {
            "extensions": {
                EXTENSION_ID: { FEATURES_FIELD: tokens }
            }
        }
    })
}

/// Client capabilities with `features` placed verbatim at the tag path.
///
/// Use it to feed malformed shapes (numbers, nested arrays, objects) to the
/// extraction code.
#[must_use]
pub fn raw_features_payload(features: Value) -> Value {
    json!({
        "experimental": {
            "extensions": {
                EXTENSION_ID: { FEATURES_FIELD: features }
            }
        }
    })
}

/// Full `initialize` request params declaring `tokens`.
#[must_use]
pub fn initialize_params<I, S>(tokens: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    json!({
        "protocolVersion": "2025-11-25",
        "clientInfo": { "name": "featurekit-test-client", "version": "0.0.0" },
        "capabilities": capabilities_payload(tokens),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use featurekit_core::{FeatureSet, extract_tags};

    #[test]
    fn test_payload_is_extractable() {
        let payload = capabilities_payload(AGENT_TOKENS);
        assert_eq!(extract_tags(&payload), AGENT_TOKENS);
    }

    #[test]
    fn test_malformed_tokens_all_drop() {
        assert!(FeatureSet::parse(MALFORMED_TOKENS).is_empty());
    }

    #[test]
    fn test_initialize_params_shape() {
        let params = initialize_params(["human"]);
        assert_eq!(params["capabilities"], capabilities_payload(["human"]));
        assert!(params["clientInfo"]["name"].is_string());
    }
}
