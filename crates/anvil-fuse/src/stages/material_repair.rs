use anvil_rules::RuleSnapshot;
use anvil_types::OutcomeKind;

use crate::cost::base_cost;
use crate::repair::unit_repair;
use crate::stage::{FusionPlan, FusionRequest, FusionStage, StageDecision};

/// Repair with a configured repair material.
///
/// Each right-hand unit restores the material's strength for the left item;
/// only the units needed are consumed. Enchantments are left untouched. An
/// undamaged item can still be renamed here without consuming anything.
pub struct MaterialRepairStage;

impl FusionStage for MaterialRepairStage {
    fn name(&self) -> &str {
        "material_repair"
    }

    fn classify(&self, request: &FusionRequest<'_>, rules: &RuleSnapshot) -> StageDecision {
        let Some(strength) = rules
            .materials()
            .repair_strength_for(&request.right.material, &request.left.material)
        else {
            return StageDecision::Pass;
        };

        let kind = OutcomeKind::MaterialRepair;
        let Some(repair) = unit_repair(request.left, strength, request.right.amount) else {
            // Nothing to repair; a rename still goes through and consumes no units.
            if request.renames() {
                return StageDecision::Claim(FusionPlan::unmerged(kind, request.left.clone(), 0, 0));
            }
            return StageDecision::reject(format!(
                "{} has no damage to repair",
                request.left.material
            ));
        };

        let result = request.left.clone().with_damage(repair.damage);
        StageDecision::Claim(FusionPlan::unmerged(
            kind,
            result,
            base_cost(kind, repair.units, true, rules.costs()),
            repair.units,
        ))
    }
}
