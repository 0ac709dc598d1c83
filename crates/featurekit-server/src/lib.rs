//! Server-side session state for featurekit.
//!
//! This crate keeps one negotiated [`FeatureSet`](featurekit_core::FeatureSet)
//! per connection and hands it to request handlers:
//!
//! - [`SessionStore`]: write-once slots keyed by session id, with a default
//!   slot for transports that have no session ids
//! - [`Negotiator`]: the glue the connection layer calls on connect,
//!   `initialize`, and close
//! - [`RequestContext`]: what handlers read features from
//! - [`NegotiationConfig`]: extension id, handshake timeout and logging knobs
//!
//! # Example
//!
//! ```rust
//! use featurekit_core::Verbosity;
//! use featurekit_server::{NegotiationConfig, Negotiator};
//!
//! let negotiator = Negotiator::new(NegotiationConfig::default()).unwrap();
//! negotiator.on_connect(Some("session-1"));
//! negotiator.negotiate(Some("session-1"), ["human", "interactive", "verbosity=verbose"]);
//!
//! let ctx = negotiator.context(Some("session-1"));
//! assert!(ctx.features().is_interactive());
//! assert_eq!(ctx.features().verbosity(), Verbosity::Verbose);
//!
//! negotiator.on_close(Some("session-1"));
//! ```
//!
//! # Feature Flags
//!
//! - `tokio-runtime` (default): background cleanup of sessions that never
//!   complete their handshake.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod error;
pub mod negotiator;
pub mod session;

pub use config::NegotiationConfig;
pub use context::{FeatureSource, RequestContext, get_features};
pub use error::ConfigError;
pub use negotiator::Negotiator;
pub use session::{NegotiationState, SessionHandle, SessionStore, SetOutcome};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::NegotiationConfig;
    pub use crate::context::{FeatureSource, RequestContext, get_features};
    pub use crate::error::ConfigError;
    pub use crate::negotiator::Negotiator;
    pub use crate::session::{NegotiationState, SessionHandle, SessionStore, SetOutcome};
}
