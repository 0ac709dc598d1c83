//! Standard tag vocabulary.
//!
//! | Tag | Shape | Meaning |
//! |-----|-------|---------|
//! | `agent` / `human` | presence | Audience of the output |
//! | `mcp-capable` | presence | Client understands protocol-native constructs |
//! | `interactive` / `!interactive` | presence / negation | A person can answer follow-ups |
//! | `sampling`, `elicitation`, `roots`, `tasks` | presence | Client capability gates |
//! | `format=json\|text\|markdown` | equality | Preferred output format |
//! | `verbosity=compact\|standard\|verbose` | equality | Preferred output detail |
//! | `x-*` | any | Vendor extension |
//!
//! Keys outside this table are well-formed but unknown. They are ignored by
//! resolution and surfaced through [`crate::FeatureSet::unknown_tags`].

/// Identifier of the content negotiation extension in capability payloads.
pub const EXTENSION_ID: &str = "io.mcp.content-negotiation";

/// Field holding the tag list inside the extension declaration.
pub const FEATURES_FIELD: &str = "features";

/// Output is consumed by an automated agent.
pub const AGENT: &str = "agent";
/// Output is consumed by a person.
pub const HUMAN: &str = "human";
/// Client understands protocol-native constructs.
pub const MCP_CAPABLE: &str = "mcp-capable";
/// A person is available to answer follow-up questions.
pub const INTERACTIVE: &str = "interactive";
/// Client supports sampling requests.
pub const SAMPLING: &str = "sampling";
/// Client supports elicitation requests.
pub const ELICITATION: &str = "elicitation";
/// Client exposes filesystem roots.
pub const ROOTS: &str = "roots";
/// Client supports long-running tasks.
pub const TASKS: &str = "tasks";
/// Preferred output format key.
pub const FORMAT: &str = "format";
/// Preferred output verbosity key.
pub const VERBOSITY: &str = "verbosity";

/// Conventional prefix for vendor tags.
pub const VENDOR_PREFIX: &str = "x-";

/// Every key defined by the standard vocabulary.
pub const STANDARD_KEYS: &[&str] = &[
    AGENT,
    HUMAN,
    MCP_CAPABLE,
    INTERACTIVE,
    SAMPLING,
    ELICITATION,
    ROOTS,
    TASKS,
    FORMAT,
    VERBOSITY,
];

/// Check whether a key belongs to the standard vocabulary.
#[must_use]
pub fn is_standard_key(key: &str) -> bool {
    STANDARD_KEYS.contains(&key)
}

/// Check whether a key follows the vendor naming convention.
#[must_use]
pub fn is_vendor_key(key: &str) -> bool {
    key.starts_with(VENDOR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_keys() {
        assert!(is_standard_key("agent"));
        assert!(is_standard_key("verbosity"));
        assert!(!is_standard_key("Agent"));
        assert!(!is_standard_key("x-acme"));
    }

    #[test]
    fn test_vendor_keys() {
        assert!(is_vendor_key("x-acme-hint"));
        assert!(!is_vendor_key("acme-hint"));
        assert!(!is_vendor_key("X-acme"));
    }
}
