//! Request context for operation handlers.
//!
//! Handlers receive a [`RequestContext`] and read the session's negotiated
//! features from it. Reads never block and never fail: before negotiation,
//! after close, or for an unknown session they return the empty set, whose
//! queries all yield their documented defaults.
//!
//! # Example
//!
//! ```rust
//! use featurekit_core::Format;
//! use featurekit_server::{FeatureSource, Negotiator, get_features};
//!
//! fn render(ctx: &impl FeatureSource, body: &str) -> String {
//!     match ctx.features().format() {
//!         Format::Json => format!("{{\"text\":{body:?}}}"),
//!         Format::Text | Format::Markdown => body.to_string(),
//!     }
//! }
//!
//! let negotiator = Negotiator::default();
//! negotiator.negotiate(None, ["format=json"]);
//!
//! let ctx = negotiator.context(None);
//! assert_eq!(render(&ctx, "hi"), r#"{"text":"hi"}"#);
//! assert!(get_features(&ctx).has_tag("format=json"));
//! ```

use std::sync::Arc;

use featurekit_core::{FeatureSet, Resolution};

use crate::session::{NegotiationState, SessionHandle};

/// Anything a handler can read negotiated features from.
pub trait FeatureSource {
    /// The negotiated features, or the empty set.
    fn features(&self) -> FeatureSet;
}

impl FeatureSource for SessionHandle {
    fn features(&self) -> FeatureSet {
        Self::features(self)
    }
}

impl FeatureSource for FeatureSet {
    fn features(&self) -> FeatureSet {
        self.clone()
    }
}

impl<T: FeatureSource + ?Sized> FeatureSource for Arc<T> {
    fn features(&self) -> FeatureSet {
        (**self).features()
    }
}

impl<T: FeatureSource + ?Sized> FeatureSource for &T {
    fn features(&self) -> FeatureSet {
        (**self).features()
    }
}

/// Read the negotiated features from a handler's context.
#[must_use]
pub fn get_features(source: &impl FeatureSource) -> FeatureSet {
    source.features()
}

/// Per-operation view of the session's negotiation state.
///
/// Cheap to clone and `Send + Sync`, so it can move into spawned work.
#[derive(Debug, Clone)]
pub struct RequestContext {
    session: SessionHandle,
}

impl RequestContext {
    /// Create a context over a session handle.
    #[must_use]
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// The session id, or `None` for the default slot.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session.id()
    }

    /// The session handle.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// The negotiated features, or the empty set.
    #[must_use]
    pub fn features(&self) -> FeatureSet {
        self.session.features()
    }

    /// Every standard query evaluated against the negotiated features.
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.session.resolution()
    }

    /// The session's lifecycle state.
    #[must_use]
    pub fn state(&self) -> NegotiationState {
        self.session.state()
    }
}

impl FeatureSource for RequestContext {
    fn features(&self) -> FeatureSet {
        Self::features(self)
    }
}
