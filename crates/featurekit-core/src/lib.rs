//! # featurekit-core
//!
//! Tag grammar and feature resolution for session-scoped content negotiation.
//!
//! A client declares a flat list of tags once, during the initialization
//! handshake. The server parses them into a [`FeatureSet`] and consults it on
//! every later request to decide how to shape its output:
//!
//! - **Tag grammar**: `key`, `!key` and `key=value` tokens ([`tag`])
//! - **Feature resolution**: format, verbosity, audience and capability gates
//!   with documented defaults and tie-breaks ([`features`])
//! - **Capability payloads**: defensive extraction of the declared tags and
//!   the server's support marker ([`capability`])
//!
//! Every resolver operation is total. Malformed tokens are dropped, malformed
//! payloads yield no tags, and out-of-domain values fall back to defaults.
//!
//! This crate is runtime-agnostic. Session storage lives in
//! `featurekit-server`.
//!
//! # Example
//!
//! ```rust
//! use featurekit_core::{ClientCapabilities, Format, Verbosity, parse};
//! use featurekit_core::capability::extract_tags;
//!
//! // What the client puts on the wire
//! let caps = ClientCapabilities::new().with_feature_tags(["human", "interactive", "verbosity=verbose"]);
//! let payload = serde_json::to_value(&caps).unwrap();
//!
//! // What the server derives from it
//! let features = parse(extract_tags(&payload));
//! assert!(features.is_human());
//! assert!(features.is_interactive());
//! assert_eq!(features.format(), Format::Markdown);
//! assert_eq!(features.verbosity(), Verbosity::Verbose);
//! ```
//!
//! Tags are self-declared by an untrusted peer. Never use them for
//! authorization or authentication decisions.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod capability;
pub mod error;
pub mod features;
pub mod preference;
pub mod tag;
pub mod vocabulary;

// Re-export commonly used types at the crate root
pub use capability::{ClientCapabilities, ServerCapabilities, extract_tags, supported_marker};
pub use error::{TagError, UnknownVariant};
pub use features::{FeatureSet, Resolution, parse};
pub use preference::{Format, Verbosity};
pub use tag::{FeatureTag, TagKind};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use featurekit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::capability::{ClientCapabilities, ServerCapabilities, extract_tags};
    pub use crate::error::{TagError, UnknownVariant};
    pub use crate::features::{FeatureSet, Resolution, parse};
    pub use crate::preference::{Format, Verbosity};
    pub use crate::tag::{FeatureTag, TagKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let features: FeatureSet = parse(["agent"]);
        assert!(features.is_agent());
        let _caps = ServerCapabilities::new().with_content_negotiation();
        let _format = Format::default();
    }

    #[test]
    fn test_extension_id() {
        assert_eq!(vocabulary::EXTENSION_ID, "io.mcp.content-negotiation");
    }
}
