//! Feature tag grammar.
//!
//! A client declares its preferences as a flat list of string tokens. Each
//! token takes one of three shapes:
//!
//! ```text
//! key          presence    "agent", "sampling"
//! !key         negation    "!interactive"
//! key=value    equality    "format=json", "x-acme-theme=dark"
//! ```
//!
//! `key` must match `[A-Za-z0-9_-]+`. Equality tokens split on the first `=`,
//! so the value may itself contain `=`. Vendor tags use an `x-` prefix by
//! convention; the grammar does not treat them specially.
//!
//! Keys and values compare byte-for-byte. Nothing is case-folded or trimmed.
//!
//! # Example
//!
//! ```rust
//! use featurekit_core::tag::{FeatureTag, TagKind};
//!
//! let tag: FeatureTag = "format=json".parse().unwrap();
//! assert_eq!(tag.kind(), TagKind::Equality);
//! assert_eq!(tag.key(), "format");
//! assert_eq!(tag.value(), Some("json"));
//!
//! assert!("!".parse::<FeatureTag>().is_err());
//! assert!("has space".parse::<FeatureTag>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::TagError;

/// The three predicate shapes a tag may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `key`
    Presence,
    /// `!key`
    Negation,
    /// `key=value`
    Equality,
}

/// One parsed predicate derived from one raw token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureTag {
    /// The key was declared.
    Presence {
        /// Tag identifier.
        key: String,
    },
    /// The key was explicitly declared absent.
    Negation {
        /// Tag identifier.
        key: String,
    },
    /// The key was declared with a value.
    Equality {
        /// Tag identifier.
        key: String,
        /// Declared value, never empty.
        value: String,
    },
}

impl FeatureTag {
    /// The tag's identifier.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Presence { key } | Self::Negation { key } | Self::Equality { key, .. } => key,
        }
    }

    /// The value of an equality tag.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Equality { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The predicate shape.
    #[must_use]
    pub fn kind(&self) -> TagKind {
        match self {
            Self::Presence { .. } => TagKind::Presence,
            Self::Negation { .. } => TagKind::Negation,
            Self::Equality { .. } => TagKind::Equality,
        }
    }

    /// Check whether this tag has the given shape and key.
    #[must_use]
    pub fn is(&self, kind: TagKind, key: &str) -> bool {
        self.kind() == kind && self.key() == key
    }

    pub(crate) fn matches(&self, query: RawTag<'_>) -> bool {
        match (self, query) {
            (Self::Presence { key }, RawTag::Presence(k))
            | (Self::Negation { key }, RawTag::Negation(k)) => key == k,
            (Self::Equality { key, value }, RawTag::Equality(k, v)) => key == k && value == v,
            _ => false,
        }
    }
}

impl FromStr for FeatureTag {
    type Err = TagError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(match RawTag::classify(token)? {
            RawTag::Presence(key) => Self::Presence {
                key: key.to_owned(),
            },
            RawTag::Negation(key) => Self::Negation {
                key: key.to_owned(),
            },
            RawTag::Equality(key, value) => Self::Equality {
                key: key.to_owned(),
                value: value.to_owned(),
            },
        })
    }
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presence { key } => f.write_str(key),
            Self::Negation { key } => write!(f, "!{key}"),
            Self::Equality { key, value } => write!(f, "{key}={value}"),
        }
    }
}

/// A classified token borrowing from its input.
///
/// Used where a token only needs to be compared, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawTag<'a> {
    Presence(&'a str),
    Negation(&'a str),
    Equality(&'a str, &'a str),
}

impl<'a> RawTag<'a> {
    pub(crate) fn classify(token: &'a str) -> Result<Self, TagError> {
        if token.is_empty() {
            return Err(TagError::Empty);
        }

        if let Some(key) = token.strip_prefix('!') {
            if key.is_empty() {
                return Err(TagError::BareNegation);
            }
            check_key(key)?;
            return Ok(Self::Negation(key));
        }

        if let Some((key, value)) = token.split_once('=') {
            if key.is_empty() {
                return Err(TagError::EmptyKey);
            }
            if value.is_empty() {
                return Err(TagError::EmptyValue {
                    key: key.to_owned(),
                });
            }
            check_key(key)?;
            return Ok(Self::Equality(key, value));
        }

        check_key(token)?;
        Ok(Self::Presence(token))
    }
}

/// Check whether a string is a valid tag key (`[A-Za-z0-9_-]+`).
///
/// ```rust
/// use featurekit_core::tag::is_valid_key;
///
/// assert!(is_valid_key("mcp-capable"));
/// assert!(is_valid_key("x-acme_hint"));
/// assert!(!is_valid_key(""));
/// assert!(!is_valid_key("format json"));
/// ```
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn check_key(key: &str) -> Result<(), TagError> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(TagError::InvalidKey {
            key: key.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tag(s: &str) -> FeatureTag {
        s.parse().expect("valid tag")
    }

    #[test]
    fn test_presence() {
        assert_eq!(
            tag("agent"),
            FeatureTag::Presence {
                key: "agent".to_string()
            }
        );
        assert_eq!(tag("mcp-capable").kind(), TagKind::Presence);
        assert_eq!(tag("under_score").key(), "under_score");
    }

    #[test]
    fn test_negation() {
        let t = tag("!interactive");
        assert_eq!(t.kind(), TagKind::Negation);
        assert_eq!(t.key(), "interactive");
        assert_eq!(t.value(), None);
    }

    #[test]
    fn test_equality_splits_on_first_equals() {
        let t = tag("x-acme-query=a=b");
        assert_eq!(t.key(), "x-acme-query");
        assert_eq!(t.value(), Some("a=b"));
    }

    #[test]
    fn test_invalid_tokens() {
        assert_eq!("".parse::<FeatureTag>(), Err(TagError::Empty));
        assert_eq!("!".parse::<FeatureTag>(), Err(TagError::BareNegation));
        assert_eq!("=json".parse::<FeatureTag>(), Err(TagError::EmptyKey));
        assert_eq!(
            "format=".parse::<FeatureTag>(),
            Err(TagError::EmptyValue {
                key: "format".to_string()
            })
        );
        assert!(matches!(
            " ".parse::<FeatureTag>(),
            Err(TagError::InvalidKey { .. })
        ));
        assert!(matches!(
            "!!interactive".parse::<FeatureTag>(),
            Err(TagError::InvalidKey { .. })
        ));
        assert!(matches!(
            "!format=json".parse::<FeatureTag>(),
            Err(TagError::InvalidKey { .. })
        ));
        assert!(matches!(
            "fórmat".parse::<FeatureTag>(),
            Err(TagError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_case_is_preserved() {
        let t = tag("Format=JSON");
        assert_eq!(t.key(), "Format");
        assert_eq!(t.value(), Some("JSON"));
        assert_ne!(tag("agent"), tag("Agent"));
    }

    #[test]
    fn test_display_reproduces_token() {
        for raw in ["agent", "!interactive", "verbosity=compact", "x-a=b=c"] {
            assert_eq!(tag(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_raw_matching() {
        let t = tag("format=json");
        assert!(t.matches(RawTag::Equality("format", "json")));
        assert!(!t.matches(RawTag::Equality("format", "text")));
        assert!(!t.matches(RawTag::Presence("format")));
        assert!(tag("!agent").matches(RawTag::Negation("agent")));
    }
}
