//! Handshake integration.
//!
//! The [`Negotiator`] is the one component that touches the surrounding
//! protocol. The connection layer calls it at three points:
//!
//! 1. [`on_connect`](Negotiator::on_connect) when a connection is established,
//! 2. [`on_initialize`](Negotiator::on_initialize) when the client's
//!    `initialize` request arrives,
//! 3. [`on_close`](Negotiator::on_close) on teardown.
//!
//! Request handlers then read the session's features through a
//! [`RequestContext`] from [`context`](Negotiator::context).
//!
//! # Example
//!
//! ```rust
//! use featurekit_core::{Format, ServerCapabilities};
//! use featurekit_server::Negotiator;
//! use serde_json::json;
//!
//! let negotiator = Negotiator::default();
//!
//! // Advertise support in the initialize result
//! let caps = negotiator.advertise(ServerCapabilities::new());
//! assert!(caps.supports_content_negotiation());
//!
//! // Record what the client declared
//! negotiator.on_connect(Some("conn-7"));
//! negotiator.on_initialize(Some("conn-7"), &json!({
//!     "protocolVersion": "2025-11-25",
//!     "clientInfo": { "name": "agent-cli", "version": "0.1.0" },
//!     "capabilities": {
//!         "experimental": {
//!             "extensions": {
//!                 "io.mcp.content-negotiation": { "features": ["agent", "format=json"] }
//!             }
//!         }
//!     }
//! }));
//!
//! // Read it from any handler
//! let ctx = negotiator.context(Some("conn-7"));
//! assert_eq!(ctx.features().format(), Format::Json);
//! ```

use std::sync::Arc;

use featurekit_core::capability::{extract_tags_for, extract_tags_from_initialize};
use featurekit_core::{FeatureSet, ServerCapabilities, parse};
use serde_json::Value;

use crate::config::NegotiationConfig;
use crate::context::RequestContext;
use crate::error::ConfigError;
use crate::session::{SessionHandle, SessionStore, SetOutcome, label};

/// Connects the handshake to the session store.
#[derive(Debug, Clone)]
pub struct Negotiator {
    store: Arc<SessionStore>,
    config: NegotiationConfig,
}

impl Default for Negotiator {
    fn default() -> Self {
        Self {
            store: Arc::new(SessionStore::new()),
            config: NegotiationConfig::default(),
        }
    }
}

impl Negotiator {
    /// Create a negotiator with its own store.
    pub fn new(config: NegotiationConfig) -> Result<Self, ConfigError> {
        Self::with_store(Arc::new(SessionStore::new()), config)
    }

    /// Create a negotiator over a shared store.
    pub fn with_store(
        store: Arc<SessionStore>,
        config: NegotiationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// The underlying session store.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Add the support marker to the server's advertised capabilities.
    #[must_use]
    pub fn advertise(&self, capabilities: ServerCapabilities) -> ServerCapabilities {
        capabilities.with_extension_marker(&self.config.extension_id)
    }

    /// Register a newly established connection.
    pub fn on_connect(&self, session: Option<&str>) -> SessionHandle {
        tracing::debug!(session = label(session), "session opened");
        self.store.open(session)
    }

    /// Record the tags declared in an `initialize` request's params.
    pub fn on_initialize(&self, session: Option<&str>, params: &Value) -> SetOutcome {
        let tags = extract_tags_from_initialize(params, &self.config.extension_id);
        self.negotiate(session, tags)
    }

    /// Record the tags declared in a bare client capabilities object.
    pub fn on_capabilities(&self, session: Option<&str>, capabilities: &Value) -> SetOutcome {
        let tags = extract_tags_for(capabilities, &self.config.extension_id);
        self.negotiate(session, tags)
    }

    /// Parse raw tokens and record them for the session.
    pub fn negotiate<I, S>(&self, session: Option<&str>, tokens: I) -> SetOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let features = parse(tokens);

        if self.config.log_unknown_tags {
            for tag in features.unknown_tags() {
                tracing::debug!(session = label(session), %tag, "ignoring unknown feature tag");
            }
        }

        let resolution = features.resolution();
        let tags = features.len();
        let outcome = self.store.set(session, features);
        if outcome.is_accepted() {
            tracing::info!(
                session = label(session),
                tags,
                format = %resolution.format,
                verbosity = %resolution.verbosity,
                "negotiated session features"
            );
        }
        outcome
    }

    /// Release a connection's negotiation state.
    pub fn on_close(&self, session: Option<&str>) -> bool {
        self.store.remove(session)
    }

    /// The features negotiated for a session, or the empty set.
    #[must_use]
    pub fn features(&self, session: Option<&str>) -> FeatureSet {
        self.store.get(session)
    }

    /// A request context for a session.
    ///
    /// Unknown sessions get a detached context that reads the empty set;
    /// no store entry is created for them.
    #[must_use]
    pub fn context(&self, session: Option<&str>) -> RequestContext {
        let handle = self
            .store
            .handle(session)
            .unwrap_or_else(|| SessionHandle::detached(session));
        RequestContext::new(handle)
    }

    /// Start the background task reaping sessions that never negotiate.
    #[cfg(feature = "tokio-runtime")]
    pub fn start_cleanup_task(&self) -> tokio::task::JoinHandle<()> {
        self.store
            .start_cleanup_task(self.config.cleanup_interval, self.config.handshake_timeout)
    }
}
