//! Error types for rule loading and lookup.

use thiserror::Error;

/// Errors that can occur while building or querying rules.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A raw enchantment identifier does not resolve to a known enchantment.
    #[error("unknown enchantment: {0}")]
    UnknownEnchantment(String),

    /// The configuration violates a rule invariant.
    #[error("invalid configuration at {path}: {reason}")]
    ConfigurationInvalid { path: String, reason: String },

    /// The rule file is not valid TOML or does not match the schema.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// I/O error while reading a rule file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The store's writer lock was poisoned by a panicking writer.
    #[error("rule store lock poisoned: {0}")]
    Lock(String),
}

impl RuleError {
    /// Create a configuration error for a location in the rule file.
    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
