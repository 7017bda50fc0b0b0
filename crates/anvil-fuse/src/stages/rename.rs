use anvil_rules::RuleSnapshot;
use anvil_types::OutcomeKind;

use crate::stage::{FusionPlan, FusionRequest, FusionStage, StageDecision};

/// Rename with an empty right slot.
///
/// Claims every request whose right slot is empty; there is a result only
/// when the requested name differs from the current one.
pub struct RenameStage;

impl FusionStage for RenameStage {
    fn name(&self) -> &str {
        "rename"
    }

    fn classify(&self, request: &FusionRequest<'_>, _rules: &RuleSnapshot) -> StageDecision {
        if !request.right.is_empty() {
            return StageDecision::Pass;
        }
        if !request.renames() {
            return StageDecision::reject("right slot is empty and the name is unchanged");
        }
        StageDecision::Claim(FusionPlan::unmerged(
            OutcomeKind::RenameOnly,
            request.left.clone(),
            0,
            0,
        ))
    }
}
