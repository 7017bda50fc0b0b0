//! Immutable, validated rule snapshots.

use anvil_types::RulesFingerprint;

use crate::error::Result;
use crate::file::RuleFile;
use crate::material::MaterialRepairPolicy;
use crate::registry::EnchantmentRegistry;
use crate::settings::{CostRules, FusionSettings};

/// Stock rule set shipped with the crate.
const VANILLA_RULES: &str = include_str!("../assets/vanilla.toml");

/// Everything the fusion engine reads, validated by construction.
///
/// A snapshot is never mutated. Edits go through [`RuleFile`] and produce a
/// new snapshot, which the [`RuleStore`](crate::RuleStore) swaps in
/// atomically.
#[derive(Clone, Debug)]
pub struct RuleSnapshot {
    source: RuleFile,
    registry: EnchantmentRegistry,
    materials: MaterialRepairPolicy,
    fingerprint: RulesFingerprint,
}

impl RuleSnapshot {
    pub(crate) fn assemble(
        source: RuleFile,
        registry: EnchantmentRegistry,
        materials: MaterialRepairPolicy,
    ) -> Self {
        let fingerprint = compute_fingerprint(&source);
        Self {
            source,
            registry,
            materials,
            fingerprint,
        }
    }

    /// The built-in stock rules.
    pub fn vanilla() -> Result<Self> {
        RuleFile::from_toml(VANILLA_RULES)?.compile()
    }

    /// A snapshot with no enchantments, no materials, and default costs.
    pub fn empty() -> Self {
        Self::assemble(
            RuleFile::default(),
            EnchantmentRegistry::default(),
            MaterialRepairPolicy::default(),
        )
    }

    pub fn registry(&self) -> &EnchantmentRegistry {
        &self.registry
    }

    pub fn materials(&self) -> &MaterialRepairPolicy {
        &self.materials
    }

    pub fn costs(&self) -> &CostRules {
        &self.source.costs
    }

    pub fn fusion(&self) -> &FusionSettings {
        &self.source.fusion
    }

    /// The rule file this snapshot was compiled from.
    pub fn source(&self) -> &RuleFile {
        &self.source
    }

    pub fn fingerprint(&self) -> RulesFingerprint {
        self.fingerprint
    }
}

/// BLAKE3 over the canonical JSON form of the rule file.
fn compute_fingerprint(source: &RuleFile) -> RulesFingerprint {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"anvil-rules-v1:");
    match serde_json::to_vec(source) {
        Ok(bytes) => {
            hasher.update(&bytes);
        }
        Err(e) => {
            tracing::warn!(error = %e, "rule file could not be serialized for fingerprinting");
        }
    }
    RulesFingerprint::from_bytes(*hasher.finalize().as_bytes())
}
