use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid enchantment key '{raw}': {reason}")]
    InvalidEnchantmentKey { raw: String, reason: String },

    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),
}
