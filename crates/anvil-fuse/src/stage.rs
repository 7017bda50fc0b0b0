use anvil_rules::RuleSnapshot;
use anvil_types::{ItemDescriptor, OutcomeKind};

use crate::merge::MergeResult;

// ---------------------------------------------------------------------------
// FusionRequest
// ---------------------------------------------------------------------------

/// The two anvil inputs and an optional rename, as seen by every stage.
#[derive(Clone, Copy, Debug)]
pub struct FusionRequest<'a> {
    pub left: &'a ItemDescriptor,
    pub right: &'a ItemDescriptor,
    /// Requested display name. An empty string clears a custom name.
    pub rename: Option<&'a str>,
}

impl<'a> FusionRequest<'a> {
    pub fn new(left: &'a ItemDescriptor, right: &'a ItemDescriptor, rename: Option<&'a str>) -> Self {
        Self { left, right, rename }
    }

    /// The display name the result should carry.
    pub fn target_name(&self) -> Option<String> {
        match self.rename {
            None => self.left.display_name.clone(),
            Some(name) if name.trim().is_empty() => None,
            Some(name) => Some(name.to_string()),
        }
    }

    /// Returns `true` if applying the request changes the left item's name.
    pub fn renames(&self) -> bool {
        self.rename.is_some() && self.target_name() != self.left.display_name
    }
}

// ---------------------------------------------------------------------------
// FusionPlan
// ---------------------------------------------------------------------------

/// What a stage decided to produce, before rename, penalty, and pricing.
#[derive(Clone, Debug)]
pub struct FusionPlan {
    pub kind: OutcomeKind,
    /// Result item with durability and enchantments applied.
    pub result: ItemDescriptor,
    /// Base cost of the operation kind.
    pub base_cost: u32,
    /// Right-hand items consumed.
    pub consumed: u32,
    /// Merge details, when enchantments were merged.
    pub merge: Option<MergeResult>,
    /// Right item is an enchantment carrier.
    pub sacrifice: bool,
    /// Right-hand work penalty carried into the result.
    pub right_penalty: u32,
}

impl FusionPlan {
    /// A plan that leaves enchantments untouched.
    pub fn unmerged(kind: OutcomeKind, result: ItemDescriptor, base_cost: u32, consumed: u32) -> Self {
        Self {
            kind,
            result,
            base_cost,
            consumed,
            merge: None,
            sacrifice: false,
            right_penalty: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single classification stage.
#[derive(Clone, Debug)]
pub enum StageDecision {
    /// The pair is not this stage's business; ask the next stage.
    Pass,
    /// The stage owns the pair and produced a plan.
    Claim(FusionPlan),
    /// The stage owns the pair but there is no valid result.
    Reject { reason: String },
}

impl StageDecision {
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: reason.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

// ---------------------------------------------------------------------------
// FusionStage trait
// ---------------------------------------------------------------------------

/// One classification step of the fusion pipeline.
///
/// Stages run in order and the first one that does not pass decides the
/// operation kind. Stages are `Send + Sync` so a resolver can be shared
/// between threads.
pub trait FusionStage: Send + Sync {
    /// Short name of the stage (e.g. "material_repair").
    fn name(&self) -> &str;

    fn classify(&self, request: &FusionRequest<'_>, rules: &RuleSnapshot) -> StageDecision;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rename_keeps_name() {
        let left = ItemDescriptor::new("diamond_sword").with_display_name(Some("Edge".into()));
        let right = ItemDescriptor::empty();
        let req = FusionRequest::new(&left, &right, None);
        assert_eq!(req.target_name().as_deref(), Some("Edge"));
        assert!(!req.renames());
    }

    #[test]
    fn same_name_is_not_a_rename() {
        let left = ItemDescriptor::new("diamond_sword").with_display_name(Some("Edge".into()));
        let right = ItemDescriptor::empty();
        assert!(!FusionRequest::new(&left, &right, Some("Edge")).renames());
        assert!(FusionRequest::new(&left, &right, Some("Blade")).renames());
    }

    #[test]
    fn empty_rename_clears_custom_name() {
        let named = ItemDescriptor::new("diamond_sword").with_display_name(Some("Edge".into()));
        let plain = ItemDescriptor::new("diamond_sword");
        let right = ItemDescriptor::empty();
        assert!(FusionRequest::new(&named, &right, Some("")).renames());
        assert!(!FusionRequest::new(&plain, &right, Some("  ")).renames());
    }
}
