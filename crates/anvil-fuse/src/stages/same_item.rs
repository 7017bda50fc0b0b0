use anvil_rules::RuleSnapshot;
use anvil_types::OutcomeKind;

use crate::cost::base_cost;
use crate::merge::Merger;
use crate::repair::combined_damage;
use crate::stage::{FusionPlan, FusionRequest, FusionStage, StageDecision};

/// Combine two items of the same material.
///
/// Damageable items pool their durability (`SameItemRepair`); other items
/// only merge enchantments (`EnchantCombine`). Two carriers of the same
/// material combine in sacrifice mode.
pub struct SameItemStage;

impl FusionStage for SameItemStage {
    fn name(&self) -> &str {
        "same_item"
    }

    fn classify(&self, request: &FusionRequest<'_>, rules: &RuleSnapshot) -> StageDecision {
        let (left, right) = (request.left, request.right);
        if right.is_empty() || right.material != left.material {
            return StageDecision::Pass;
        }

        let sacrifice = rules.fusion().is_carrier(&right.material);
        let merge = Merger::new(rules).merge(
            &left.enchantments,
            &right.enchantments,
            &left.material,
            sacrifice,
        );

        let (kind, damage) = if left.is_damageable() {
            let damage = combined_damage(left, right, rules.fusion().combine_bonus_percent);
            (OutcomeKind::SameItemRepair, damage)
        } else {
            (OutcomeKind::EnchantCombine, left.damage)
        };
        let durability_changed = damage < left.damage;

        let result = left
            .clone()
            .with_damage(damage)
            .with_enchantments(merge.enchantments.clone());
        StageDecision::Claim(FusionPlan {
            kind,
            result,
            base_cost: base_cost(kind, 0, durability_changed, rules.costs()),
            consumed: 1,
            merge: Some(merge),
            sacrifice,
            right_penalty: right.repair_cost,
        })
    }
}
