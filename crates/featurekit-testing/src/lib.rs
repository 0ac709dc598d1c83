//! Testing utilities for featurekit.
//!
//! This crate provides fixtures and assertions for testing servers that
//! shape their output from negotiated features:
//!
//! - Token sets for common client profiles
//! - Builders for capability and `initialize` payloads
//! - Assertions over resolved features
//!
//! # Overview
//!
//! ```rust
//! use featurekit_core::{FeatureSet, Format, Verbosity};
//! use featurekit_testing::{assert_defaults, assert_resolves, fixtures};
//!
//! assert_defaults(&FeatureSet::parse(fixtures::LEGACY_TOKENS));
//!
//! let agent = FeatureSet::parse(fixtures::AGENT_TOKENS);
//! assert_resolves(&agent, Format::Json, Verbosity::Compact);
//! ```

#![deny(missing_docs)]

pub mod assertions;
pub mod fixtures;

// Re-export commonly used items
pub use assertions::{assert_defaults, assert_resolves};
pub use fixtures::{capabilities_payload, initialize_params};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assertions::{assert_defaults, assert_resolves};
    pub use crate::fixtures::{
        AGENT_TOKENS, HUMAN_TOKENS, LEGACY_TOKENS, capabilities_payload, initialize_params,
    };
}
