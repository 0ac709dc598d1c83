//! The negotiated feature set and its derived queries.
//!
//! A [`FeatureSet`] is built once per session from the client's declared
//! tokens and never changes afterwards. Every query is a pure scan over the
//! parsed tags in declaration order, so handlers can call them on every
//! request without re-parsing anything.
//!
//! # Resolution rules
//!
//! - **Defaults**: on an empty set, [`FeatureSet::format`] is
//!   [`Format::Markdown`], [`FeatureSet::verbosity`] is
//!   [`Verbosity::Standard`], and every boolean gate is `false`.
//! - **Negation wins**: a gate is enabled only if `key` is declared and
//!   `!key` is not. Declaring both disables it.
//! - **First valid match wins**: `format` and `verbosity` take the first
//!   declared value that is a member of the enum. Out-of-domain values are
//!   skipped, not treated as errors.
//!
//! # Usage contract
//!
//! Tags are self-declared by an untrusted peer. Use them to shape content,
//! never to make authorization or authentication decisions.
//!
//! # Example
//!
//! ```rust
//! use featurekit_core::{FeatureSet, Format, Verbosity};
//!
//! let features = FeatureSet::parse(["agent", "sampling", "format=json", "verbosity=compact"]);
//!
//! assert!(features.is_agent());
//! assert!(features.has_sampling());
//! assert_eq!(features.format(), Format::Json);
//! assert_eq!(features.verbosity(), Verbosity::Compact);
//! assert!(!features.is_interactive());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::preference::{Format, Verbosity};
use crate::tag::{FeatureTag, RawTag, TagKind};
use crate::vocabulary;

/// Parse raw tokens into a [`FeatureSet`].
///
/// This never fails. Tokens that do not fit the tag grammar are dropped and
/// logged at `debug` level; everything else is kept in declaration order,
/// duplicates included.
///
/// ```rust
/// let features = featurekit_core::parse(["agent", "", "!", "bad token", "format=json"]);
/// assert_eq!(features.len(), 2);
/// ```
pub fn parse<I, S>(tokens: I) -> FeatureSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .filter_map(|token| {
            let token = token.as_ref();
            match token.parse::<FeatureTag>() {
                Ok(tag) => Some(tag),
                Err(error) => {
                    tracing::debug!(token, %error, "dropping malformed feature tag");
                    None
                }
            }
        })
        .collect()
}

/// An immutable, session-lifetime set of negotiated feature tags.
///
/// Cloning is cheap: the parsed tags live behind an `Arc`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSet {
    tags: Arc<[FeatureTag]>,
}

impl FeatureSet {
    /// The empty set, meaning no negotiation took place.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse raw tokens. See [`parse`].
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        parse(tokens)
    }

    /// Number of well-formed tags declared.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check whether no tags were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over the parsed tags in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FeatureTag> {
        self.tags.iter()
    }

    /// The kept tokens in canonical raw form.
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.tags.iter().map(ToString::to_string)
    }

    /// Literal membership test, interpreting `name` with the tag grammar.
    ///
    /// - `key` matches any presence or equality tag with that key.
    /// - `!key` matches a declared negation of `key`.
    /// - `key=value` matches that exact equality tag.
    ///
    /// A `name` that is not itself a well-formed tag never matches.
    ///
    /// ```rust
    /// use featurekit_core::FeatureSet;
    ///
    /// let features = FeatureSet::parse(["format=json", "!interactive", "x-acme"]);
    /// assert!(features.has_tag("format"));
    /// assert!(features.has_tag("format=json"));
    /// assert!(features.has_tag("!interactive"));
    /// assert!(features.has_tag("x-acme"));
    /// assert!(!features.has_tag("interactive"));
    /// assert!(!features.has_tag("format=text"));
    /// ```
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        match RawTag::classify(name) {
            Ok(RawTag::Presence(key)) => self
                .tags
                .iter()
                .any(|tag| tag.kind() != TagKind::Negation && tag.key() == key),
            Ok(query) => self.tags.iter().any(|tag| tag.matches(query)),
            Err(_) => false,
        }
    }

    /// Check whether `key` was declared as a presence tag.
    #[must_use]
    pub fn is_declared(&self, key: &str) -> bool {
        self.tags.iter().any(|tag| tag.is(TagKind::Presence, key))
    }

    /// Check whether `!key` was declared.
    #[must_use]
    pub fn is_negated(&self, key: &str) -> bool {
        self.tags.iter().any(|tag| tag.is(TagKind::Negation, key))
    }

    /// Boolean gate for any key: declared and not negated.
    ///
    /// Every named gate on this type goes through this rule.
    #[must_use]
    pub fn is_enabled(&self, key: &str) -> bool {
        self.is_declared(key) && !self.is_negated(key)
    }

    /// Output is consumed by an automated agent (`agent`).
    ///
    /// Independent of [`is_human`](Self::is_human); both or neither may hold.
    #[must_use]
    pub fn is_agent(&self) -> bool {
        self.is_enabled(vocabulary::AGENT)
    }

    /// Output is consumed by a person (`human`).
    #[must_use]
    pub fn is_human(&self) -> bool {
        self.is_enabled(vocabulary::HUMAN)
    }

    /// A person can answer follow-ups (`interactive`, unless `!interactive`).
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.is_enabled(vocabulary::INTERACTIVE)
    }

    /// Client understands protocol-native constructs (`mcp-capable`).
    #[must_use]
    pub fn is_mcp_capable(&self) -> bool {
        self.is_enabled(vocabulary::MCP_CAPABLE)
    }

    /// Client supports sampling (`sampling`).
    #[must_use]
    pub fn has_sampling(&self) -> bool {
        self.is_enabled(vocabulary::SAMPLING)
    }

    /// Client supports elicitation (`elicitation`).
    #[must_use]
    pub fn has_elicitation(&self) -> bool {
        self.is_enabled(vocabulary::ELICITATION)
    }

    /// Client exposes filesystem roots (`roots`).
    #[must_use]
    pub fn has_roots(&self) -> bool {
        self.is_enabled(vocabulary::ROOTS)
    }

    /// Client supports long-running tasks (`tasks`).
    #[must_use]
    pub fn has_tasks(&self) -> bool {
        self.is_enabled(vocabulary::TASKS)
    }

    /// Preferred output format, defaulting to [`Format::Markdown`].
    #[must_use]
    pub fn format(&self) -> Format {
        self.resolve(vocabulary::FORMAT).unwrap_or_default()
    }

    /// Preferred output detail, defaulting to [`Verbosity::Standard`].
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.resolve(vocabulary::VERBOSITY).unwrap_or_default()
    }

    /// First declared value of `key` that parses as `T`.
    ///
    /// Values that fail to parse are skipped and scanning continues. This is
    /// how [`format`](Self::format) and [`verbosity`](Self::verbosity) are
    /// resolved, and works for any caller-defined closed enum.
    #[must_use]
    pub fn resolve<T: FromStr>(&self, key: &str) -> Option<T> {
        self.values(key).find_map(|value| value.parse().ok())
    }

    /// First declared value of an equality tag, with no value constraint.
    ///
    /// ```rust
    /// use featurekit_core::FeatureSet;
    ///
    /// let features = FeatureSet::parse(["x-mycompany-hint=value"]);
    /// assert_eq!(features.vendor_value("x-mycompany-hint"), Some("value"));
    /// assert_eq!(features.vendor_value("x-other"), None);
    /// ```
    #[must_use]
    pub fn vendor_value(&self, key: &str) -> Option<&str> {
        self.values(key).next()
    }

    /// All declared values of `key`, in declaration order.
    pub fn values<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.tags
            .iter()
            .filter(move |tag| tag.key() == key)
            .filter_map(FeatureTag::value)
    }

    /// Well-formed tags outside the standard vocabulary and vendor namespace.
    ///
    /// These never affect resolution; they are exposed so callers can log them.
    pub fn unknown_tags(&self) -> impl Iterator<Item = &FeatureTag> + '_ {
        self.tags.iter().filter(|tag| {
            !vocabulary::is_standard_key(tag.key()) && !vocabulary::is_vendor_key(tag.key())
        })
    }

    /// Evaluate every standard query at once.
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        Resolution {
            format: self.format(),
            verbosity: self.verbosity(),
            agent: self.is_agent(),
            human: self.is_human(),
            interactive: self.is_interactive(),
            mcp_capable: self.is_mcp_capable(),
            sampling: self.has_sampling(),
            elicitation: self.has_elicitation(),
            roots: self.has_roots(),
            tasks: self.has_tasks(),
        }
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tokens()).finish()
    }
}

impl FromIterator<FeatureTag> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = FeatureTag>>(iter: T) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a FeatureTag;
    type IntoIter = std::slice::Iter<'a, FeatureTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<String>> for FeatureSet {
    fn from(tokens: Vec<String>) -> Self {
        parse(tokens)
    }
}

impl From<FeatureSet> for Vec<String> {
    fn from(features: FeatureSet) -> Self {
        features.tokens().collect()
    }
}

/// Every standard query evaluated against one [`FeatureSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// See [`FeatureSet::format`].
    pub format: Format,
    /// See [`FeatureSet::verbosity`].
    pub verbosity: Verbosity,
    /// See [`FeatureSet::is_agent`].
    pub agent: bool,
    /// See [`FeatureSet::is_human`].
    pub human: bool,
    /// See [`FeatureSet::is_interactive`].
    pub interactive: bool,
    /// See [`FeatureSet::is_mcp_capable`].
    pub mcp_capable: bool,
    /// See [`FeatureSet::has_sampling`].
    pub sampling: bool,
    /// See [`FeatureSet::has_elicitation`].
    pub elicitation: bool,
    /// See [`FeatureSet::has_roots`].
    pub roots: bool,
    /// See [`FeatureSet::has_tasks`].
    pub tasks: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_defaults() {
        let features = FeatureSet::empty();
        assert!(features.is_empty());
        assert_eq!(features.resolution(), Resolution::default());
        assert_eq!(features.format(), Format::Markdown);
        assert_eq!(features.verbosity(), Verbosity::Standard);
        assert!(!features.is_agent());
        assert!(!features.is_human());
        assert!(!features.is_interactive());
        assert!(!features.is_mcp_capable());
        assert!(!features.has_sampling());
        assert!(!features.has_elicitation());
        assert_eq!(features.vendor_value("x-anything"), None);
    }

    #[test]
    fn test_parse_drops_malformed_tokens() {
        let features = parse([
            "", " ", "!", "=", "format=", "=json", "a b", "tab\t", "é", "agent",
        ]);
        assert_eq!(features.tokens().collect::<Vec<_>>(), vec!["agent"]);
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let features = parse(["b", "a", "b", "format=json"]);
        assert_eq!(
            features.tokens().collect::<Vec<_>>(),
            vec!["b", "a", "b", "format=json"]
        );
    }

    #[test]
    fn test_negation_wins() {
        let features = parse(["interactive", "!interactive"]);
        assert!(!features.is_interactive());

        let features = parse(["!interactive", "interactive"]);
        assert!(!features.is_interactive());

        let features = parse(["sampling", "!sampling", "agent"]);
        assert!(!features.has_sampling());
        assert!(features.is_agent());
    }

    #[test]
    fn test_negation_alone_is_not_presence() {
        let features = parse(["!interactive"]);
        assert!(!features.is_interactive());
        assert!(features.is_negated("interactive"));
        assert!(!features.is_declared("interactive"));
    }

    #[test]
    fn test_equality_does_not_enable_gate() {
        let features = parse(["interactive=true"]);
        assert!(!features.is_interactive());
        assert!(features.has_tag("interactive"));
    }

    #[test]
    fn test_first_match_wins() {
        let features = parse(["format=json", "format=markdown"]);
        assert_eq!(features.format(), Format::Json);

        let features = parse(["verbosity=verbose", "verbosity=compact"]);
        assert_eq!(features.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_invalid_value_skipped() {
        let features = parse(["format=xml", "format=json"]);
        assert_eq!(features.format(), Format::Json);

        let features = parse(["format=JSON"]);
        assert_eq!(features.format(), Format::Markdown);

        let features = parse(["verbosity=loud", "verbosity=compact", "verbosity=verbose"]);
        assert_eq!(features.verbosity(), Verbosity::Compact);
    }

    #[test]
    fn test_presence_key_does_not_set_value() {
        let features = parse(["format", "verbosity"]);
        assert_eq!(features.format(), Format::Markdown);
        assert_eq!(features.verbosity(), Verbosity::Standard);
    }

    #[test]
    fn test_vendor_values() {
        let features = parse(["x-acme=first", "x-acme=second", "x-acme-mode=a=b"]);
        assert_eq!(features.vendor_value("x-acme"), Some("first"));
        assert_eq!(features.vendor_value("x-acme-mode"), Some("a=b"));
        assert_eq!(features.vendor_value("x-acm"), None);
        assert_eq!(
            features.values("x-acme").collect::<Vec<_>>(),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_has_tag_literal_membership() {
        let features = parse(["agent", "!interactive", "format=json"]);
        assert!(features.has_tag("agent"));
        assert!(features.has_tag("!interactive"));
        assert!(features.has_tag("format"));
        assert!(features.has_tag("format=json"));
        assert!(!features.has_tag("interactive"));
        assert!(!features.has_tag("!agent"));
        assert!(!features.has_tag("format=text"));
        assert!(!features.has_tag(""));
        assert!(!features.has_tag("!"));
        assert!(!features.has_tag("Agent"));
    }

    #[test]
    fn test_unknown_tags() {
        let features = parse(["agent", "x-acme", "colour=blue", "!teleport", "format=json"]);
        let unknown: Vec<String> = features.unknown_tags().map(ToString::to_string).collect();
        assert_eq!(unknown, vec!["colour=blue", "!teleport"]);
    }

    #[test]
    fn test_resolve_custom_enum() {
        #[derive(Debug, PartialEq)]
        enum Theme {
            Dark,
        }

        impl FromStr for Theme {
            type Err = ();
            fn from_str(s: &str) -> Result<Self, ()> {
                if s == "dark" { Ok(Self::Dark) } else { Err(()) }
            }
        }

        let features = parse(["x-theme=neon", "x-theme=dark"]);
        assert_eq!(features.resolve::<Theme>("x-theme"), Some(Theme::Dark));
        assert_eq!(features.resolve::<Theme>("x-missing"), None);
    }

    #[test]
    fn test_agent_scenario() {
        let features = parse(["agent", "sampling", "format=json", "verbosity=compact"]);
        assert_eq!(
            features.resolution(),
            Resolution {
                format: Format::Json,
                verbosity: Verbosity::Compact,
                agent: true,
                sampling: true,
                ..Resolution::default()
            }
        );
    }

    #[test]
    fn test_human_scenario() {
        let features = parse([
            "human",
            "!mcp-capable",
            "interactive",
            "verbosity=standard",
            "format=markdown",
        ]);
        assert!(features.is_human());
        assert!(!features.is_agent());
        assert!(features.is_interactive());
        assert!(!features.is_mcp_capable());
        assert_eq!(features.format(), Format::Markdown);
        assert_eq!(features.verbosity(), Verbosity::Standard);
    }

    #[test]
    fn test_serde_as_token_list() {
        let features = parse(["agent", "format=json"]);
        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(json, serde_json::json!(["agent", "format=json"]));

        let back: FeatureSet = serde_json::from_value(serde_json::json!(["agent", "", "!"])).unwrap();
        assert_eq!(back, parse(["agent"]));
    }

    #[test]
    fn test_clone_shares_storage() {
        let features = parse(["agent"]);
        let clone = features.clone();
        assert!(Arc::ptr_eq(&features.tags, &clone.tags));
    }

    #[test]
    fn test_debug_lists_tokens() {
        let features = parse(["agent", "!interactive"]);
        assert_eq!(format!("{features:?}"), r#"["agent", "!interactive"]"#);
    }
}
