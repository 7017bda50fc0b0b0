use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::item::ItemDescriptor;

/// Which fusion rule produced an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// Right item is a repair material for the left item.
    MaterialRepair,
    /// Both items share a damageable material; durability and enchantments combine.
    SameItemRepair,
    /// Both items share a non-damageable material; only enchantments combine.
    EnchantCombine,
    /// Right item is an enchantment carrier consumed to enchant the left item.
    SacrificeBook,
    /// Only the display name changes.
    RenameOnly,
    /// No valid result.
    Unavailable,
}

impl OutcomeKind {
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaterialRepair => write!(f, "MaterialRepair"),
            Self::SameItemRepair => write!(f, "SameItemRepair"),
            Self::EnchantCombine => write!(f, "EnchantCombine"),
            Self::SacrificeBook => write!(f, "SacrificeBook"),
            Self::RenameOnly => write!(f, "RenameOnly"),
            Self::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// BLAKE3 digest of the rule snapshot an outcome was computed with.
///
/// Two outcomes computed from identical inputs and identical fingerprints
/// are identical; this is what makes a fusion replayable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RulesFingerprint([u8; 32]);

impl RulesFingerprint {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short form (first 8 hex characters).
    pub fn short_id(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidFingerprint(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| TypeError::InvalidFingerprint(format!("expected 32 bytes, got {}", b.len())))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for RulesFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RulesFingerprint({})", self.short_id())
    }
}

impl fmt::Display for RulesFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_id())
    }
}

/// The result of one fusion attempt.
///
/// Always freshly constructed per call. An unavailable outcome carries
/// neither a result item nor a cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionOutcome {
    pub kind: OutcomeKind,
    pub result: Option<ItemDescriptor>,
    pub cost: Option<u32>,
    /// How many right-hand items the fusion consumes.
    pub consumed: u32,
    pub fingerprint: RulesFingerprint,
}

impl FusionOutcome {
    pub fn unavailable(fingerprint: RulesFingerprint) -> Self {
        Self {
            kind: OutcomeKind::Unavailable,
            result: None,
            cost: None,
            consumed: 0,
            fingerprint,
        }
    }

    pub fn resolved(
        kind: OutcomeKind,
        result: ItemDescriptor,
        cost: u32,
        consumed: u32,
        fingerprint: RulesFingerprint,
    ) -> Self {
        Self {
            kind,
            result: Some(result),
            cost: Some(cost),
            consumed,
            fingerprint,
        }
    }

    /// Returns `true` if the anvil should show a result.
    pub fn is_available(&self) -> bool {
        self.kind.is_available() && self.result.is_some()
    }
}
