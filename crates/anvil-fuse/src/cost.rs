//! Price calculation for fusion plans.
//!
//! ```text
//! cost = base(kind)
//!      + sum(upgrade_steps * weight)      weight doubled in sacrifice mode
//!      + illegal_conflict * right-hand enchantments lost to conflicts
//!      + rename                           when the name changes
//!      + max(left penalty, right penalty)
//! ```

use std::collections::BTreeMap;

use anvil_rules::{CostRules, EnchantmentRegistry};
use anvil_types::{EnchantmentId, OutcomeKind};
use serde::Serialize;

use crate::merge::{EnchantDelta, MergeResult};

/// Itemized cost of one fusion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub base: u32,
    pub enchantments: u32,
    pub conflicts: u32,
    pub rename: u32,
    pub prior_work: u32,
}

impl CostBreakdown {
    pub fn total(&self) -> u32 {
        self.base
            .saturating_add(self.enchantments)
            .saturating_add(self.conflicts)
            .saturating_add(self.rename)
            .saturating_add(self.prior_work)
    }
}

/// Verdict of the ceiling check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Price {
    /// Acceptable; carries the cost to display.
    Accepted(u32),
    /// Above the ceiling; carries the computed cost.
    TooExpensive(u32),
}

/// Base cost of an operation kind.
///
/// `units` is the number of repair-material units consumed and
/// `durability_changed` whether a same-item combine restored durability.
pub fn base_cost(kind: OutcomeKind, units: u32, durability_changed: bool, costs: &CostRules) -> u32 {
    match kind {
        OutcomeKind::MaterialRepair => costs.unit_repair.saturating_mul(units),
        OutcomeKind::SameItemRepair if durability_changed => costs.item_repair,
        _ => 0,
    }
}

/// Weighted upgrade steps over a merge.
pub fn enchantment_cost(
    deltas: &BTreeMap<EnchantmentId, EnchantDelta>,
    registry: &EnchantmentRegistry,
    costs: &CostRules,
    sacrifice: bool,
) -> u32 {
    let multiplier = if sacrifice { costs.sacrifice_multiplier } else { 1 };
    deltas.iter().fold(0u32, |acc, (id, delta)| {
        let weight = registry.weight_of(id).unwrap_or(costs.default_weight);
        let steps = delta.upgrade_steps();
        acc.saturating_add(steps.saturating_mul(weight).saturating_mul(multiplier))
    })
}

/// Penalty for right-hand enchantments lost to conflicts.
pub fn conflict_cost(merge: &MergeResult, costs: &CostRules) -> u32 {
    merge.right_conflict_losses().saturating_mul(costs.illegal_conflict)
}

/// Apply the ceiling and display limit to a total.
pub fn price(total: u32, costs: &CostRules) -> Price {
    if total > costs.ceiling && !costs.bypass_ceiling {
        return Price::TooExpensive(total);
    }
    match costs.limit {
        Some(limit) => Price::Accepted(total.min(limit)),
        None => Price::Accepted(total),
    }
}
