//! # featurekit
//!
//! Session-scoped content negotiation for MCP servers.
//!
//! A client declares capability and preference tags once, in its
//! `initialize` request. The server resolves them into a
//! [`FeatureSet`] and reads it from every request handler to pick an output
//! format, a verbosity level, an audience, and which optional features to use.
//!
//! ```text
//! initialize payload -> extract_tags -> parse -> SessionStore -> handlers
//! ```
//!
//! # Tag grammar
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `agent`, `human`, `mcp-capable`, `sampling`, ... | presence |
//! | `!interactive` | negation; always beats the plain tag |
//! | `format=json`, `verbosity=compact` | equality; first valid value wins |
//! | `x-vendor-key=value` | vendor extension |
//!
//! Malformed tokens are dropped, malformed payloads yield no tags, and every
//! query has a default (`markdown`, `standard`, `false`). Nothing in the
//! resolution path returns an error.
//!
//! # Example
//!
//! ```rust
//! use featurekit::prelude::*;
//! use serde_json::json;
//!
//! let negotiator = Negotiator::default();
//! let server_caps = negotiator.advertise(ServerCapabilities::new());
//! assert!(server_caps.supports_content_negotiation());
//!
//! negotiator.on_connect(Some("conn-1"));
//! negotiator.on_initialize(Some("conn-1"), &json!({
//!     "capabilities": {
//!         "experimental": {
//!             "extensions": {
//!                 "io.mcp.content-negotiation": {
//!                     "features": ["agent", "format=json", "verbosity=compact"]
//!                 }
//!             }
//!         }
//!     }
//! }));
//!
//! let ctx = negotiator.context(Some("conn-1"));
//! let features = ctx.features();
//! assert!(features.is_agent());
//! assert_eq!(features.format(), Format::Json);
//! assert_eq!(features.verbosity(), Verbosity::Compact);
//! ```
//!
//! # Security
//!
//! Tags are self-declared by the peer. Use them to shape content only; never
//! base authorization or authentication decisions on them.
//!
//! # Feature Flags
//!
//! - `server` (default): session store, negotiator and request context
//! - `tokio-runtime` (default): background cleanup of stale handshakes

#![deny(missing_docs)]

pub use featurekit_core::{
    ClientCapabilities, FeatureSet, FeatureTag, Format, Resolution, ServerCapabilities, TagError,
    TagKind, UnknownVariant, Verbosity, extract_tags, parse, supported_marker,
};

pub use featurekit_core::{capability, error, features, preference, tag, vocabulary};

/// Server-side session state.
#[cfg(feature = "server")]
pub mod server {
    pub use featurekit_server::*;
}

#[cfg(feature = "server")]
pub use featurekit_server::{
    ConfigError, FeatureSource, NegotiationConfig, NegotiationState, Negotiator, RequestContext,
    SessionHandle, SessionStore, SetOutcome, get_features,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use featurekit_core::prelude::*;

    #[cfg(feature = "server")]
    pub use featurekit_server::prelude::*;
}
