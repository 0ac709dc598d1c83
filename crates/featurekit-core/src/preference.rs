//! Closed preference enums resolved from equality tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

/// Preferred output format (`format=...`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Structured JSON.
    Json,
    /// Plain text.
    Text,
    /// Markdown. The default when nothing valid was declared.
    #[default]
    Markdown,
}

impl Format {
    /// All members, in declaration order.
    pub const ALL: &'static [Self] = &[Self::Json, Self::Text, Self::Markdown];

    /// The wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Markdown => "markdown",
        }
    }
}

impl FromStr for Format {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "markdown" => Ok(Self::Markdown),
            other => Err(UnknownVariant::new("format", other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preferred output detail (`verbosity=...`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Minimal output.
    Compact,
    /// Regular output. The default when nothing valid was declared.
    #[default]
    Standard,
    /// Extended output.
    Verbose,
}

impl Verbosity {
    /// All members, in declaration order.
    pub const ALL: &'static [Self] = &[Self::Compact, Self::Standard, Self::Verbose];

    /// The wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Standard => "standard",
            Self::Verbose => "verbose",
        }
    }
}

impl FromStr for Verbosity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(Self::Compact),
            "standard" => Ok(Self::Standard),
            "verbose" => Ok(Self::Verbose),
            other => Err(UnknownVariant::new("verbosity", other)),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
