use anvil_rules::RuleSnapshot;
use anvil_types::{FusionOutcome, ItemDescriptor};

use crate::cost::{conflict_cost, enchantment_cost, price, CostBreakdown, Price};
use crate::merge::MergeResult;
use crate::stage::{FusionPlan, FusionRequest, FusionStage, StageDecision};
use crate::stages::{MaterialRepairStage, RenameStage, SacrificeStage, SameItemStage};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A [`FusionOutcome`] together with how it was reached.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub outcome: FusionOutcome,
    /// Name of the stage that claimed the pair, if any.
    pub stage: Option<String>,
    /// Why there is no result, when unavailable.
    pub reason: Option<String>,
    /// Itemized price, when a plan reached pricing.
    pub breakdown: Option<CostBreakdown>,
    /// Merge details, when enchantments were merged.
    pub merge: Option<MergeResult>,
}

impl Resolution {
    fn unavailable(rules: &RuleSnapshot, stage: Option<&str>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::debug!(stage = stage.unwrap_or("-"), %reason, "fusion unavailable");
        Self {
            outcome: FusionOutcome::unavailable(rules.fingerprint()),
            stage: stage.map(str::to_string),
            reason: Some(reason),
            breakdown: None,
            merge: None,
        }
    }
}

// ---------------------------------------------------------------------------
// FusionResolver
// ---------------------------------------------------------------------------

/// Ordered pipeline of classification stages.
///
/// The first stage that does not pass decides the operation. The resolver
/// holds no state between calls and never fails: anything it cannot make
/// sense of becomes an unavailable outcome.
pub struct FusionResolver {
    stages: Vec<Box<dyn FusionStage>>,
}

impl FusionResolver {
    /// A resolver with no stages. Every request is unavailable until stages
    /// are added.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// The standard pipeline:
    /// Rename -> MaterialRepair -> SameItem -> Sacrifice
    pub fn with_default_stages() -> Self {
        let mut resolver = Self::new();
        resolver.add_stage(Box::new(RenameStage));
        resolver.add_stage(Box::new(MaterialRepairStage));
        resolver.add_stage(Box::new(SameItemStage));
        resolver.add_stage(Box::new(SacrificeStage));
        resolver
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn FusionStage>) {
        self.stages.push(stage);
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Resolve one fusion.
    pub fn resolve(
        &self,
        left: &ItemDescriptor,
        right: &ItemDescriptor,
        rename: Option<&str>,
        rules: &RuleSnapshot,
    ) -> FusionOutcome {
        self.explain(left, right, rename, rules).outcome
    }

    /// Resolve one fusion, keeping the classification and price details.
    pub fn explain(
        &self,
        left: &ItemDescriptor,
        right: &ItemDescriptor,
        rename: Option<&str>,
        rules: &RuleSnapshot,
    ) -> Resolution {
        if left.is_empty() {
            return Resolution::unavailable(rules, None, "left slot is empty");
        }

        let request = FusionRequest::new(left, right, rename);
        for stage in &self.stages {
            match stage.classify(&request, rules) {
                StageDecision::Pass => continue,
                StageDecision::Reject { reason } => {
                    return Resolution::unavailable(rules, Some(stage.name()), reason);
                }
                StageDecision::Claim(plan) => {
                    tracing::debug!(stage = stage.name(), kind = %plan.kind, "classified");
                    return finish(stage.name(), plan, &request, rules);
                }
            }
        }

        Resolution::unavailable(rules, None, "no rule applies to this pair")
    }
}

impl Default for FusionResolver {
    fn default() -> Self {
        Self::with_default_stages()
    }
}

/// Apply the rename, the work penalty, and the price to a claimed plan.
fn finish(
    stage: &str,
    plan: FusionPlan,
    request: &FusionRequest<'_>,
    rules: &RuleSnapshot,
) -> Resolution {
    let left = request.left;
    let renamed = request.renames();
    let mut result = plan.result.with_display_name(request.target_name());

    // Only the work penalty differs: nothing happened.
    result.repair_cost = left.repair_cost;
    if &result == left {
        return Resolution::unavailable(rules, Some(stage), "result is identical to the left item");
    }

    let costs = rules.costs();
    let prior_work = left.repair_cost.max(plan.right_penalty);
    result.repair_cost = prior_work.saturating_mul(2).saturating_add(1);

    let breakdown = CostBreakdown {
        base: plan.base_cost,
        enchantments: plan
            .merge
            .as_ref()
            .map(|m| enchantment_cost(&m.deltas, rules.registry(), costs, plan.sacrifice))
            .unwrap_or(0),
        conflicts: plan.merge.as_ref().map(|m| conflict_cost(m, costs)).unwrap_or(0),
        rename: if renamed { costs.rename } else { 0 },
        prior_work,
    };

    match price(breakdown.total(), costs) {
        Price::Accepted(cost) => Resolution {
            outcome: FusionOutcome::resolved(
                plan.kind,
                result,
                cost,
                plan.consumed,
                rules.fingerprint(),
            ),
            stage: Some(stage.to_string()),
            reason: None,
            breakdown: Some(breakdown),
            merge: plan.merge,
        },
        Price::TooExpensive(cost) => {
            tracing::warn!(cost, ceiling = costs.ceiling, kind = %plan.kind, "fusion too expensive");
            let mut resolution = Resolution::unavailable(
                rules,
                Some(stage),
                format!("too expensive: {cost} exceeds {}", costs.ceiling),
            );
            resolution.breakdown = Some(breakdown);
            resolution.merge = plan.merge;
            resolution
        }
    }
}
