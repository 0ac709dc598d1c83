//! Error types for the strict parsing APIs.
//!
//! The resolver itself is total: [`crate::parse`] drops malformed tokens and
//! every [`crate::FeatureSet`] query falls back to a default. These errors only
//! surface through the fallible entry points ([`crate::FeatureTag`]'s `FromStr`
//! and the enum `FromStr` impls), and are what the total parser logs when it
//! discards a token.

use miette::Diagnostic;
use thiserror::Error;

/// Why a raw token is not a well-formed feature tag.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The token is the empty string.
    #[error("empty feature tag")]
    #[diagnostic(code(featurekit::tag::empty))]
    Empty,

    /// The token is a lone `!` with nothing to negate.
    #[error("negation without a key")]
    #[diagnostic(
        code(featurekit::tag::bare_negation),
        help("Write the negated key directly after '!', e.g. '!interactive'")
    )]
    BareNegation,

    /// An equality token with nothing before the `=`.
    #[error("equality tag has an empty key")]
    #[diagnostic(code(featurekit::tag::empty_key))]
    EmptyKey,

    /// An equality token with nothing after the `=`.
    #[error("equality tag '{key}' has an empty value")]
    #[diagnostic(
        code(featurekit::tag::empty_value),
        help("Equality tags take the form 'key=value', e.g. 'format=json'")
    )]
    EmptyValue {
        /// The key preceding the `=`.
        key: String,
    },

    /// The key contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid tag key '{key}'")]
    #[diagnostic(
        code(featurekit::tag::invalid_key),
        help("Tag keys may only contain ASCII letters, digits, '_' and '-'")
    )]
    InvalidKey {
        /// The offending key.
        key: String,
    },
}

/// A string did not name a member of a closed preference enum.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
#[diagnostic(code(featurekit::preference::unknown_variant))]
pub struct UnknownVariant {
    /// The enum being parsed (e.g. "format").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_error_display() {
        let err = TagError::InvalidKey {
            key: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "invalid tag key 'bad key'");

        let err = TagError::EmptyValue {
            key: "format".to_string(),
        };
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_diagnostic_codes() {
        let code = TagError::BareNegation.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("featurekit::tag::bare_negation"));

        let err = UnknownVariant::new("format", "xml");
        assert_eq!(err.to_string(), "unknown format 'xml'");
    }
}
