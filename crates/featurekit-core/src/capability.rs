//! Capability payloads for content negotiation.
//!
//! Clients declare their feature tags during the initialization handshake,
//! inside the `experimental` capabilities object:
//!
//! ```json
//! {
//!   "experimental": {
//!     "extensions": {
//!       "io.mcp.content-negotiation": {
//!         "features": ["agent", "format=json", "verbosity=compact"]
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Servers that support the mechanism advertise an empty object at the same
//! path in their own capabilities.
//!
//! The client payload comes from an untrusted peer, so [`extract_tags`] walks
//! it defensively: any missing field or wrong type anywhere on the path yields
//! an empty list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::features::{FeatureSet, parse};
use crate::vocabulary::{EXTENSION_ID, FEATURES_FIELD};

const EXPERIMENTAL_FIELD: &str = "experimental";
const EXTENSIONS_FIELD: &str = "extensions";
const CAPABILITIES_FIELD: &str = "capabilities";

/// The marker a server places in its capabilities to advertise support.
///
/// ```rust
/// assert_eq!(featurekit_core::capability::supported_marker(), serde_json::json!({}));
/// ```
#[must_use]
pub fn supported_marker() -> Value {
    Value::Object(Map::new())
}

/// Extract the declared tag list from a client capabilities object.
///
/// Returns an empty list if the path is missing, any level has the wrong
/// type, or the list contains a non-string entry.
///
/// ```rust
/// use featurekit_core::capability::extract_tags;
/// use serde_json::json;
///
/// let caps = json!({
///     "experimental": {
///         "extensions": {
///             "io.mcp.content-negotiation": { "features": ["agent", "format=json"] }
///         }
///     }
/// });
/// assert_eq!(extract_tags(&caps), vec!["agent", "format=json"]);
///
/// assert!(extract_tags(&json!({ "experimental": "nope" })).is_empty());
/// assert!(extract_tags(&json!(null)).is_empty());
/// ```
#[must_use]
pub fn extract_tags(capabilities: &Value) -> Vec<String> {
    extract_tags_for(capabilities, EXTENSION_ID)
}

/// Like [`extract_tags`], under a custom extension identifier.
#[must_use]
pub fn extract_tags_for(capabilities: &Value, extension_id: &str) -> Vec<String> {
    try_extract(capabilities, extension_id).unwrap_or_default()
}

/// Extract the declared tag list from full `initialize` request params.
///
/// Looks inside the `capabilities` field, then behaves like [`extract_tags_for`].
#[must_use]
pub fn extract_tags_from_initialize(params: &Value, extension_id: &str) -> Vec<String> {
    params
        .get(CAPABILITIES_FIELD)
        .map(|caps| extract_tags_for(caps, extension_id))
        .unwrap_or_default()
}

fn try_extract(capabilities: &Value, extension_id: &str) -> Option<Vec<String>> {
    tags_in_experimental(capabilities.get(EXPERIMENTAL_FIELD)?, extension_id)
}

fn tags_in_experimental(experimental: &Value, extension_id: &str) -> Option<Vec<String>> {
    experimental
        .get(EXTENSIONS_FIELD)?
        .get(extension_id)?
        .get(FEATURES_FIELD)?
        .as_array()?
        .iter()
        .map(|token| token.as_str().map(str::to_owned))
        .collect()
}

/// Client capabilities as far as content negotiation is concerned.
///
/// Standard capability fields are carried through untouched in `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientCapabilities {
    /// Experimental capabilities, where the extension lives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
    /// Every other capability field.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ClientCapabilities {
    /// Create empty capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare feature tags under the standard extension identifier.
    #[must_use]
    pub fn with_feature_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<Value> = tags.into_iter().map(|t| Value::String(t.into())).collect();
        let mut declaration = Map::new();
        declaration.insert(FEATURES_FIELD.to_owned(), Value::Array(tags));
        insert_extension(&mut self.experimental, EXTENSION_ID, Value::Object(declaration));
        self
    }

    /// The declared tags, extracted defensively.
    #[must_use]
    pub fn feature_tags(&self) -> Vec<String> {
        self.experimental
            .as_ref()
            .and_then(|experimental| tags_in_experimental(experimental, EXTENSION_ID))
            .unwrap_or_default()
    }

    /// The declared tags, parsed.
    #[must_use]
    pub fn features(&self) -> FeatureSet {
        parse(self.feature_tags())
    }
}

/// Server capabilities as far as content negotiation is concerned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Experimental capabilities, where the support marker lives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
    /// Every other capability field.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ServerCapabilities {
    /// Create empty capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise content negotiation support.
    #[must_use]
    pub fn with_content_negotiation(self) -> Self {
        self.with_extension_marker(EXTENSION_ID)
    }

    /// Advertise support under a custom extension identifier.
    #[must_use]
    pub fn with_extension_marker(mut self, extension_id: &str) -> Self {
        insert_extension(&mut self.experimental, extension_id, supported_marker());
        self
    }

    /// Check whether content negotiation support is advertised.
    #[must_use]
    pub fn supports_content_negotiation(&self) -> bool {
        self.experimental
            .as_ref()
            .and_then(|e| e.get(EXTENSIONS_FIELD))
            .and_then(|e| e.get(EXTENSION_ID))
            .is_some_and(Value::is_object)
    }
}

/// Insert `value` at `experimental.extensions[extension_id]`, replacing any
/// non-object found along the way.
fn insert_extension(experimental: &mut Option<Value>, extension_id: &str, value: Value) {
    let experimental = experimental.get_or_insert_with(|| Value::Object(Map::new()));
    if !experimental.is_object() {
        *experimental = Value::Object(Map::new());
    }
    let Value::Object(root) = experimental else {
        return;
    };

    let extensions = root
        .entry(EXTENSIONS_FIELD)
        .or_insert_with(|| Value::Object(Map::new()));
    if !extensions.is_object() {
        *extensions = Value::Object(Map::new());
    }
    if let Value::Object(extensions) = extensions {
        extensions.insert(extension_id.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn declaration(features: Value) -> Value {
        json!({
            "experimental": {
                "extensions": {
                    "io.mcp.content-negotiation": { "features": features }
                }
            }
        })
    }

    #[test]
    fn test_extract_tags() {
        let caps = declaration(json!(["agent", "!interactive", "x-acme=1"]));
        assert_eq!(extract_tags(&caps), vec!["agent", "!interactive", "x-acme=1"]);
    }

    #[test]
    fn test_extract_tags_keeps_malformed_strings() {
        // Grammar is the parser's job, not the adapter's.
        let caps = declaration(json!(["", "!", "agent"]));
        assert_eq!(extract_tags(&caps), vec!["", "!", "agent"]);
    }

    #[test]
    fn test_extract_tags_defensive() {
        let cases = [
            json!(null),
            json!("experimental"),
            json!([]),
            json!({}),
            json!({ "experimental": null }),
            json!({ "experimental": [] }),
            json!({ "experimental": { "extensions": 42 } }),
            json!({ "experimental": { "extensions": {} } }),
            json!({ "experimental": { "extensions": { "io.mcp.content-negotiation": true } } }),
            json!({ "experimental": { "extensions": { "io.mcp.content-negotiation": {} } } }),
            declaration(json!("agent")),
            declaration(json!({ "0": "agent" })),
            declaration(json!(["agent", 7])),
            declaration(json!(["agent", ["format=json"]])),
            declaration(json!([null])),
        ];
        for caps in &cases {
            assert!(extract_tags(caps).is_empty(), "expected no tags from {caps}");
        }
    }

    #[test]
    fn test_extract_tags_other_extension_id() {
        let caps = json!({
            "experimental": { "extensions": { "com.example.prefs": { "features": ["human"] } } }
        });
        assert!(extract_tags(&caps).is_empty());
        assert_eq!(extract_tags_for(&caps, "com.example.prefs"), vec!["human"]);
    }

    #[test]
    fn test_extract_from_initialize() {
        let params = json!({
            "protocolVersion": "2025-11-25",
            "clientInfo": { "name": "test-client", "version": "1.0.0" },
            "capabilities": declaration(json!(["agent"])),
        });
        assert_eq!(extract_tags_from_initialize(&params, EXTENSION_ID), vec!["agent"]);
        assert!(extract_tags_from_initialize(&json!({}), EXTENSION_ID).is_empty());
        assert!(extract_tags_from_initialize(&json!(1), EXTENSION_ID).is_empty());
    }

    #[test]
    fn test_client_capabilities_builder() {
        let caps = ClientCapabilities::new().with_feature_tags(["agent", "format=json"]);
        assert_eq!(caps.feature_tags(), vec!["agent", "format=json"]);
        assert!(caps.features().is_agent());

        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(extract_tags(&json), vec!["agent", "format=json"]);
    }

    #[test]
    fn test_client_capabilities_preserves_other_fields() {
        let json = json!({
            "sampling": {},
            "roots": { "listChanged": true },
            "experimental": { "other.ext": { "enabled": true } }
        });
        let caps: ClientCapabilities = serde_json::from_value(json).unwrap();
        assert!(caps.other.contains_key("sampling"));
        assert!(caps.feature_tags().is_empty());

        let caps = caps.with_feature_tags(["human"]);
        let experimental = caps.experimental.as_ref().unwrap();
        assert!(experimental.get("other.ext").is_some());
        assert_eq!(caps.feature_tags(), vec!["human"]);
    }

    #[test]
    fn test_server_marker() {
        let caps = ServerCapabilities::new();
        assert!(!caps.supports_content_negotiation());

        let caps = caps.with_content_negotiation();
        assert!(caps.supports_content_negotiation());

        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(
            json,
            json!({ "experimental": { "extensions": { "io.mcp.content-negotiation": {} } } })
        );
    }

    #[test]
    fn test_server_marker_replaces_malformed_experimental() {
        let caps = ServerCapabilities {
            experimental: Some(json!("garbage")),
            ..ServerCapabilities::default()
        }
        .with_content_negotiation();
        assert!(caps.supports_content_negotiation());
    }

    #[test]
    fn test_server_capabilities_roundtrip_other_fields() {
        let json = json!({ "tools": { "listChanged": true } });
        let caps: ServerCapabilities = serde_json::from_value(json).unwrap();
        let caps = caps.with_content_negotiation();
        let out = serde_json::to_value(&caps).unwrap();
        assert_eq!(out["tools"]["listChanged"], true);
        assert_eq!(out["experimental"]["extensions"]["io.mcp.content-negotiation"], json!({}));
    }
}
