use std::collections::BTreeSet;

use anvil_types::MaterialId;
use serde::{Deserialize, Serialize};

use crate::conflict::TieBreak;
use crate::error::{Result, RuleError};

/// Cost table used by the cost calculator.
///
/// Defaults reproduce stock anvil pricing: a cost above 39 is "too
/// expensive".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostRules {
    /// Cost per repair-material unit consumed.
    pub unit_repair: u32,
    /// Cost added when combining two items restores durability.
    pub item_repair: u32,
    /// Cost added when the display name changes.
    pub rename: u32,
    /// Cost per right-hand enchantment lost to a conflict.
    pub illegal_conflict: u32,
    /// Weight for enchantments that do not configure their own.
    pub default_weight: u32,
    /// Weight multiplier when the right item is an enchantment carrier.
    pub sacrifice_multiplier: u32,
    /// Highest acceptable computed cost.
    pub ceiling: u32,
    /// Accept any cost, ignoring `ceiling`.
    pub bypass_ceiling: bool,
    /// Clamp for the displayed cost.
    pub limit: Option<u32>,
}

impl Default for CostRules {
    fn default() -> Self {
        Self {
            unit_repair: 1,
            item_repair: 2,
            rename: 1,
            illegal_conflict: 1,
            default_weight: 1,
            sacrifice_multiplier: 2,
            ceiling: 39,
            bypass_ceiling: false,
            limit: None,
        }
    }
}

impl CostRules {
    /// A table that never rejects an operation for being too expensive.
    pub fn unlimited() -> Self {
        Self {
            bypass_ceiling: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ceiling == 0 {
            return Err(RuleError::invalid("costs.ceiling", "ceiling must be at least 1"));
        }
        if self.sacrifice_multiplier == 0 {
            return Err(RuleError::invalid(
                "costs.sacrifice_multiplier",
                "multiplier must be at least 1",
            ));
        }
        if self.limit == Some(0) {
            return Err(RuleError::invalid("costs.limit", "limit must be at least 1"));
        }
        Ok(())
    }
}

/// Classification settings for the fusion resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FusionSettings {
    /// Materials that carry enchantments for sacrifice (enchanted books).
    pub carriers: BTreeSet<MaterialId>,
    /// Winner of an equal-level conflict.
    pub tie_break: TieBreak,
    /// Bonus durability, in percent of max durability, when two damaged
    /// items of the same material are combined.
    pub combine_bonus_percent: u32,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            carriers: [MaterialId::new("enchanted_book")].into_iter().collect(),
            tie_break: TieBreak::Left,
            combine_bonus_percent: 12,
        }
    }
}

impl FusionSettings {
    pub fn is_carrier(&self, material: &MaterialId) -> bool {
        self.carriers.contains(material)
    }

    pub fn validate(&self) -> Result<()> {
        if self.carriers.iter().any(MaterialId::is_air) {
            return Err(RuleError::invalid("fusion.carriers", "air cannot be a carrier"));
        }
        if self.combine_bonus_percent > 100 {
            return Err(RuleError::invalid(
                "fusion.combine_bonus_percent",
                "bonus must be between 0 and 100",
            ));
        }
        Ok(())
    }
}
