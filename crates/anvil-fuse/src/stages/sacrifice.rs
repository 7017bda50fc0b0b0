use anvil_rules::RuleSnapshot;
use anvil_types::OutcomeKind;

use crate::merge::Merger;
use crate::stage::{FusionPlan, FusionRequest, FusionStage, StageDecision};

/// Consume an enchantment carrier (an enchanted book) to enchant the left
/// item. Durability is untouched.
pub struct SacrificeStage;

impl FusionStage for SacrificeStage {
    fn name(&self) -> &str {
        "sacrifice"
    }

    fn classify(&self, request: &FusionRequest<'_>, rules: &RuleSnapshot) -> StageDecision {
        let (left, right) = (request.left, request.right);
        if right.is_empty() || !rules.fusion().is_carrier(&right.material) {
            return StageDecision::Pass;
        }

        let merge = Merger::new(rules).merge(&left.enchantments, &right.enchantments, &left.material, true);
        let result = left.clone().with_enchantments(merge.enchantments.clone());
        StageDecision::Claim(FusionPlan {
            kind: OutcomeKind::SacrificeBook,
            result,
            base_cost: 0,
            consumed: 1,
            merge: Some(merge),
            sacrifice: true,
            right_penalty: right.repair_cost,
        })
    }
}
