//! Negotiation configuration.
//!
//! [`NegotiationConfig`] is built in code with the `with_*` methods or
//! deserialized from an application's config file:
//!
//! ```rust
//! use featurekit_server::config::NegotiationConfig;
//! use std::time::Duration;
//!
//! let config: NegotiationConfig = serde_json::from_str(r#"{
//!     "handshake_timeout_secs": 10,
//!     "log_unknown_tags": false
//! }"#).unwrap();
//!
//! assert_eq!(config.handshake_timeout, Duration::from_secs(10));
//! assert_eq!(config.extension_id, "io.mcp.content-negotiation");
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use featurekit_core::vocabulary::EXTENSION_ID;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default time a session may stay un-negotiated before it is reaped.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default period of the background cleanup task.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for a [`Negotiator`](crate::negotiator::Negotiator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Extension identifier under which clients declare their tags.
    pub extension_id: String,
    /// Sessions still un-negotiated after this long are dropped by cleanup.
    #[serde(rename = "handshake_timeout_secs", with = "duration_secs")]
    pub handshake_timeout: Duration,
    /// How often the cleanup task runs.
    #[serde(rename = "cleanup_interval_secs", with = "duration_secs")]
    pub cleanup_interval: Duration,
    /// Log well-formed tags outside the standard and vendor vocabulary.
    pub log_unknown_tags: bool,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            extension_id: EXTENSION_ID.to_string(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            log_unknown_tags: true,
        }
    }
}

impl NegotiationConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extension identifier.
    #[must_use]
    pub fn with_extension_id(mut self, extension_id: impl Into<String>) -> Self {
        self.extension_id = extension_id.into();
        self
    }

    /// Set the handshake timeout.
    #[must_use]
    pub const fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Set the cleanup interval.
    #[must_use]
    pub const fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Stop logging unknown tags.
    #[must_use]
    pub const fn without_unknown_tag_logging(mut self) -> Self {
        self.log_unknown_tags = false;
        self
    }

    /// Check the configuration for unusable values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extension_id.is_empty() {
            return Err(ConfigError::EmptyExtensionId);
        }
        if self.handshake_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "handshake_timeout",
            });
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "cleanup_interval",
            });
        }
        Ok(())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)] // signature fixed by serde(with)
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
