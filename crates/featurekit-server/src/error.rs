//! Error types for featurekit-server.

use miette::Diagnostic;
use thiserror::Error;

/// Invalid [`NegotiationConfig`](crate::config::NegotiationConfig).
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The extension identifier is empty.
    #[error("extension id must not be empty")]
    #[diagnostic(
        code(featurekit::config::empty_extension_id),
        help("Use the default 'io.mcp.content-negotiation' unless a peer requires otherwise")
    )]
    EmptyExtensionId,

    /// A duration setting is zero.
    #[error("{field} must be greater than zero")]
    #[diagnostic(code(featurekit::config::zero_duration))]
    ZeroDuration {
        /// Name of the offending setting.
        field: &'static str,
    },
}
