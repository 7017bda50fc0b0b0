//! Fusion engine for the anvil.
//!
//! Given the two items placed in an anvil and a [`RuleSnapshot`], the engine
//! decides which operation applies (material repair, same-item combine,
//! enchanted-book sacrifice, rename), merges enchantments under level caps
//! and conflict sets, and prices the result. Every call is pure: the same
//! inputs and the same snapshot always give the same [`FusionOutcome`].
//!
//! # Quick Start
//!
//! ```rust
//! use anvil_fuse::resolve_fusion;
//! use anvil_rules::RuleSnapshot;
//! use anvil_types::{EnchantmentId, ItemDescriptor, OutcomeKind};
//!
//! let rules = RuleSnapshot::vanilla().unwrap();
//! let sharpness = EnchantmentId::parse("sharpness").unwrap();
//!
//! let sword = ItemDescriptor::new("diamond_sword").with_durability(1561, 1561);
//! let left = sword.clone().with_enchantment(sharpness.clone(), 3);
//! let right = sword.with_enchantment(sharpness.clone(), 3);
//!
//! let outcome = resolve_fusion(&left, &right, None, &rules);
//! assert_eq!(outcome.kind, OutcomeKind::SameItemRepair);
//! assert_eq!(outcome.result.unwrap().level_of(&sharpness), 4);
//! ```

pub mod cost;
pub mod host;
pub mod merge;
pub mod repair;
pub mod resolver;
pub mod stage;
pub mod stages;

use anvil_rules::RuleSnapshot;
use anvil_types::{FusionOutcome, ItemDescriptor};

pub use cost::{CostBreakdown, Price};
pub use host::{fuse_slots, ItemSource, OutcomeSink};
pub use merge::{EnchantDelta, MergeResult, Merger};
pub use resolver::{FusionResolver, Resolution};
pub use stage::{FusionPlan, FusionRequest, FusionStage, StageDecision};
pub use stages::{MaterialRepairStage, RenameStage, SacrificeStage, SameItemStage};

/// Resolve one fusion with the default stage pipeline.
///
/// Total: malformed or unknown input degrades to an unavailable outcome.
pub fn resolve_fusion(
    left: &ItemDescriptor,
    right: &ItemDescriptor,
    rename: Option<&str>,
    rules: &RuleSnapshot,
) -> FusionOutcome {
    FusionResolver::with_default_stages().resolve(left, right, rename, rules)
}


#[cfg(test)]
mod tests {
    use anvil_rules::{CostRules, MaterialSpec, RuleFile, TieBreak};
    use anvil_types::{MaterialId, OutcomeKind};

    use super::*;
    use crate::testing::{id, map, rules};

    fn sword() -> ItemDescriptor {
        ItemDescriptor::new("diamond_sword").with_durability(1561, 1561)
    }

    fn book(entries: &[(&str, u32)]) -> ItemDescriptor {
        ItemDescriptor::new("enchanted_book").with_enchantments(map(entries))
    }

    /// Vanilla rules plus a test material that restores 25 points on a
    /// 64-durability tool.
    fn rules_with_whetstone() -> RuleSnapshot {
        let mut file = rules().source().clone();
        let mut spec = MaterialSpec::new("whetstone");
        spec.repair_strength = 25;
        spec.repairs = vec![MaterialId::new("flint_knife")];
        file.upsert_material(spec);
        file.compile().unwrap()
    }

    fn with_costs(costs: CostRules) -> RuleSnapshot {
        RuleFile {
            costs,
            ..rules().source().clone()
        }
        .compile()
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // 1. Material repair
    // -----------------------------------------------------------------------

    #[test]
    fn material_repair_restores_strength() {
        let rules = rules_with_whetstone();
        let left = ItemDescriptor::new("flint_knife")
            .with_durability(10, 64)
            .with_enchantments(map(&[("sharpness", 3)]))
            .with_repair_cost(3);
        let right = ItemDescriptor::new("whetstone");

        let outcome = resolve_fusion(&left, &right, None, &rules);
        assert_eq!(outcome.kind, OutcomeKind::MaterialRepair);
        let result = outcome.result.unwrap();
        assert_eq!(result.durability(), 35);
        assert_eq!(result.enchantments, left.enchantments);
        // unit_repair * 1 unit + prior penalty
        assert_eq!(outcome.cost, Some(1 + 3));
        assert_eq!(outcome.consumed, 1);
        assert_eq!(result.repair_cost, 7);
    }

    #[test]
    fn material_repair_clips_to_max() {
        let rules = rules_with_whetstone();
        let left = ItemDescriptor::new("flint_knife").with_durability(50, 64);
        let right = ItemDescriptor::new("whetstone").with_amount(64);
        let outcome = resolve_fusion(&left, &right, None, &rules);
        assert_eq!(outcome.result.unwrap().durability(), 64);
        assert_eq!(outcome.consumed, 1);
    }

    #[test]
    fn material_repair_consumes_needed_units() {
        let rules = rules_with_whetstone();
        let left = ItemDescriptor::new("flint_knife").with_durability(10, 64);
        let right = ItemDescriptor::new("whetstone").with_amount(64);
        let outcome = resolve_fusion(&left, &right, None, &rules);
        assert_eq!(outcome.consumed, 3);
        assert_eq!(outcome.cost, Some(3));
    }

    #[test]
    fn material_repair_of_undamaged_item_is_unavailable() {
        let left = ItemDescriptor::new("iron_sword").with_durability(250, 250);
        let right = ItemDescriptor::new("iron_ingot");
        let outcome = resolve_fusion(&left, &right, None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
        let outcome = resolve_fusion(&left, &right, Some(""), &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
    }

    #[test]
    fn undamaged_item_with_repair_material_can_be_renamed() {
        let left = ItemDescriptor::new("iron_sword")
            .with_durability(250, 250)
            .with_repair_cost(3);
        let right = ItemDescriptor::new("iron_ingot").with_amount(4);
        let outcome = resolve_fusion(&left, &right, Some("Shiny"), &rules());
        assert!(outcome.is_available());
        assert_eq!(outcome.kind, OutcomeKind::MaterialRepair);
        assert_eq!(outcome.consumed, 0);
        // rename + prior penalty, no units
        assert_eq!(outcome.cost, Some(1 + 3));
        let result = outcome.result.unwrap();
        assert_eq!(result.display_name.as_deref(), Some("Shiny"));
        assert_eq!(result.durability(), 250);
        assert_eq!(result.repair_cost, 7);
    }

    #[test]
    fn material_repair_with_rename() {
        let left = ItemDescriptor::new("iron_sword").with_durability(100, 250);
        let right = ItemDescriptor::new("iron_ingot");
        let outcome = resolve_fusion(&left, &right, Some("Shiny"), &rules());
        assert_eq!(outcome.kind, OutcomeKind::MaterialRepair);
        assert_eq!(outcome.result.unwrap().display_name.as_deref(), Some("Shiny"));
        assert_eq!(outcome.cost, Some(1 + 1));
    }

    #[test]
    fn wrong_repair_material_is_unavailable() {
        let left = ItemDescriptor::new("diamond_sword").with_durability(100, 1561);
        let right = ItemDescriptor::new("iron_ingot");
        let outcome = resolve_fusion(&left, &right, None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
        assert!(outcome.cost.is_none());
    }

    // -----------------------------------------------------------------------
    // 2. Same-item combine
    // -----------------------------------------------------------------------

    #[test]
    fn same_item_upgrades_equal_levels() {
        let left = sword().with_enchantments(map(&[("sharpness", 3)]));
        let right = sword().with_enchantments(map(&[("sharpness", 3)]));
        let outcome = resolve_fusion(&left, &right, None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::SameItemRepair);
        assert_eq!(outcome.result.unwrap().enchantments, map(&[("sharpness", 4)]));
        // one upgrade step at weight 1, no durability change, no penalty
        assert_eq!(outcome.cost, Some(1));
    }

    #[test]
    fn same_item_pools_durability() {
        let left = ItemDescriptor::new("diamond_sword").with_durability(100, 1561);
        let right = ItemDescriptor::new("diamond_sword").with_durability(200, 1561);
        let outcome = resolve_fusion(&left, &right, None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::SameItemRepair);
        // 100 + 200 + 12% of 1561 (187)
        assert_eq!(outcome.result.unwrap().durability(), 487);
        assert_eq!(outcome.cost, Some(2));
    }

    #[test]
    fn same_item_penalty_takes_the_larger_side() {
        let left = sword().with_enchantments(map(&[("sharpness", 1)])).with_repair_cost(1);
        let right = sword().with_enchantments(map(&[("sharpness", 1)])).with_repair_cost(7);
        let outcome = resolve_fusion(&left, &right, None, &rules());
        assert_eq!(outcome.cost, Some(1 + 7));
        assert_eq!(outcome.result.unwrap().repair_cost, 15);
    }

    #[test]
    fn same_non_damageable_items_combine_enchantments() {
        let left = ItemDescriptor::new("carved_pumpkin");
        let right = ItemDescriptor::new("carved_pumpkin").with_enchantments(map(&[("binding_curse", 1)]));
        let outcome = resolve_fusion(&left, &right, None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::EnchantCombine);
        assert_eq!(outcome.result.unwrap().enchantments, map(&[("binding_curse", 1)]));
    }

    #[test]
    fn two_books_combine_with_sacrifice_weighting() {
        let outcome = resolve_fusion(
            &book(&[("mending", 1)]),
            &book(&[("unbreaking", 2)]),
            None,
            &rules(),
        );
        assert_eq!(outcome.kind, OutcomeKind::EnchantCombine);
        assert_eq!(
            outcome.result.unwrap().enchantments,
            map(&[("mending", 1), ("unbreaking", 2)])
        );
        // unbreaking: 2 steps * weight 2 * 2
        assert_eq!(outcome.cost, Some(8));
    }

    #[test]
    fn identical_unenchanted_items_are_unavailable() {
        let outcome = resolve_fusion(&sword(), &sword(), None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
    }

    // -----------------------------------------------------------------------
    // 3. Sacrifice
    // -----------------------------------------------------------------------

    #[test]
    fn book_conflict_keeps_higher_level() {
        let left = sword().with_enchantments(map(&[("sharpness", 3)]));
        let outcome = resolve_fusion(&left, &book(&[("smite", 2), ("unbreaking", 1)]), None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::SacrificeBook);
        let result = outcome.result.unwrap();
        assert_eq!(result.enchantments, map(&[("sharpness", 3), ("unbreaking", 1)]));
        // unbreaking 1 * 2 * 2 + one illegal conflict
        assert_eq!(outcome.cost, Some(4 + 1));
    }

    #[test]
    fn book_leaves_durability_alone() {
        let left = ItemDescriptor::new("diamond_sword").with_durability(10, 1561);
        let outcome = resolve_fusion(&left, &book(&[("mending", 1)]), None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::SacrificeBook);
        assert_eq!(outcome.result.unwrap().durability(), 10);
        assert_eq!(outcome.cost, Some(8));
    }

    #[test]
    fn book_allows_enchantment_off_target() {
        let left = ItemDescriptor::new("diamond_pickaxe").with_durability(1561, 1561);
        let outcome = resolve_fusion(&left, &book(&[("sharpness", 1)]), None, &rules());
        assert_eq!(outcome.result.unwrap().enchantments, map(&[("sharpness", 1)]));
    }

    #[test]
    fn empty_book_is_unavailable() {
        let outcome = resolve_fusion(&sword(), &book(&[]), None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
    }

    #[test]
    fn right_tie_break_prefers_book() {
        let rules = RuleFile {
            fusion: anvil_rules::FusionSettings {
                tie_break: TieBreak::Right,
                ..Default::default()
            },
            ..rules().source().clone()
        }
        .compile()
        .unwrap();
        let left = sword().with_enchantments(map(&[("sharpness", 2)]));
        let outcome = resolve_fusion(&left, &book(&[("smite", 2)]), None, &rules);
        assert_eq!(outcome.result.unwrap().enchantments, map(&[("smite", 2)]));
    }

    // -----------------------------------------------------------------------
    // 4. Rename and empty slots
    // -----------------------------------------------------------------------

    #[test]
    fn both_empty_is_unavailable() {
        let outcome = resolve_fusion(&ItemDescriptor::empty(), &ItemDescriptor::empty(), None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
        assert!(outcome.result.is_none());
        assert!(outcome.cost.is_none());
    }

    #[test]
    fn left_empty_is_unavailable() {
        let outcome = resolve_fusion(&ItemDescriptor::empty(), &sword(), Some("x"), &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
    }

    #[test]
    fn rename_only() {
        let left = sword().with_repair_cost(1);
        let outcome = resolve_fusion(&left, &ItemDescriptor::empty(), Some("Edge"), &rules());
        assert_eq!(outcome.kind, OutcomeKind::RenameOnly);
        let result = outcome.result.unwrap();
        assert_eq!(result.display_name.as_deref(), Some("Edge"));
        assert_eq!(result.enchantments, left.enchantments);
        assert_eq!(outcome.cost, Some(1 + 1));
        assert_eq!(outcome.consumed, 0);
    }

    #[test]
    fn unchanged_name_with_empty_right_is_unavailable() {
        let left = sword().with_display_name(Some("Edge".into()));
        let outcome = resolve_fusion(&left, &ItemDescriptor::empty(), Some("Edge"), &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
        let outcome = resolve_fusion(&left, &ItemDescriptor::empty(), None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
    }

    #[test]
    fn unrelated_pair_is_unavailable() {
        let outcome = resolve_fusion(&sword(), &ItemDescriptor::new("stick"), None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
    }

    // -----------------------------------------------------------------------
    // 5. Ceiling and limit
    // -----------------------------------------------------------------------

    #[test]
    fn over_ceiling_is_unavailable() {
        let left = sword().with_repair_cost(31);
        let right = book(&[("mending", 1)]);
        // 8 for mending + 31 prior work + 1 rename = 40
        let outcome = resolve_fusion(&left, &right, Some("Edge"), &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
        assert!(outcome.cost.is_none());

        let outcome = resolve_fusion(&left, &right, None, &rules());
        assert_eq!(outcome.cost, Some(39));
    }

    #[test]
    fn bypass_accepts_and_limit_clamps() {
        let rules = with_costs(CostRules {
            limit: Some(39),
            ..CostRules::unlimited()
        });
        let left = sword().with_repair_cost(63);
        let outcome = resolve_fusion(&left, &book(&[("mending", 1)]), None, &rules);
        assert_eq!(outcome.kind, OutcomeKind::SacrificeBook);
        assert_eq!(outcome.cost, Some(39));
    }

    // -----------------------------------------------------------------------
    // 6. Determinism and degraded input
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_enchantments_are_ignored() {
        let left = sword().with_enchantments(map(&[("sharpness", 2), ("mystery:glow", 3)]));
        let right = book(&[("mystery:glow", 3), ("unbreaking", 1)]);
        let outcome = resolve_fusion(&left, &right, None, &rules());
        assert_eq!(outcome.kind, OutcomeKind::SacrificeBook);
        assert_eq!(
            outcome.result.unwrap().enchantments,
            map(&[("sharpness", 2), ("unbreaking", 1)])
        );
    }

    #[test]
    fn same_inputs_same_outcome() {
        let rules = rules();
        let left = sword().with_enchantments(map(&[("sharpness", 3)])).with_repair_cost(3);
        let right = book(&[("smite", 4), ("looting", 2)]);
        let a = resolve_fusion(&left, &right, Some("Edge"), &rules);
        let b = resolve_fusion(&left, &right, Some("Edge"), &rules);
        assert_eq!(a, b);
        assert_eq!(a.fingerprint, rules.fingerprint());
    }

    #[test]
    fn inputs_are_not_mutated() {
        let left = sword().with_enchantments(map(&[("sharpness", 3)]));
        let right = sword().with_enchantments(map(&[("sharpness", 3)]));
        let (l, r) = (left.clone(), right.clone());
        let _ = resolve_fusion(&left, &right, Some("x"), &rules());
        assert_eq!(left, l);
        assert_eq!(right, r);
    }

    #[test]
    fn explain_reports_stage_and_breakdown() {
        let resolver = FusionResolver::with_default_stages();
        let left = sword().with_enchantments(map(&[("sharpness", 3)]));
        let r = resolver.explain(&left, &book(&[("smite", 2)]), None, &rules());
        assert_eq!(r.stage.as_deref(), Some("sacrifice"));
        assert_eq!(r.outcome.kind, OutcomeKind::Unavailable);
        assert!(r.reason.unwrap().contains("identical"));

        let r = resolver.explain(&left, &book(&[("unbreaking", 3)]), None, &rules());
        let breakdown = r.breakdown.unwrap();
        assert_eq!(breakdown.enchantments, 12);
        assert_eq!(breakdown.total(), 12);
        assert_eq!(
            r.merge.unwrap().deltas[&id("unbreaking")],
            EnchantDelta::Added { level: 3 }
        );
    }

    #[test]
    fn empty_pipeline_is_always_unavailable() {
        let resolver = FusionResolver::new();
        assert_eq!(resolver.stage_count(), 0);
        let outcome = resolver.resolve(&sword(), &ItemDescriptor::empty(), Some("x"), &rules());
        assert_eq!(outcome.kind, OutcomeKind::Unavailable);
    }

    #[test]
    fn custom_stage_runs_in_order() {
        struct Refuse;
        impl FusionStage for Refuse {
            fn name(&self) -> &str {
                "refuse"
            }
            fn classify(&self, _: &FusionRequest<'_>, _: &RuleSnapshot) -> StageDecision {
                StageDecision::reject("closed for maintenance")
            }
        }

        let mut resolver = FusionResolver::new();
        resolver.add_stage(Box::new(Refuse));
        resolver.add_stage(Box::new(RenameStage));
        let r = resolver.explain(&sword(), &ItemDescriptor::empty(), Some("x"), &rules());
        assert_eq!(r.stage.as_deref(), Some("refuse"));
        assert_eq!(r.outcome.kind, OutcomeKind::Unavailable);
    }

    #[test]
    fn in_flight_snapshot_is_unaffected_by_store_edit() {
        let store = anvil_rules::RuleStore::new(rules());
        let held = store.load();
        store.remove_material(&MaterialId::new("iron_ingot")).unwrap();

        let left = ItemDescriptor::new("iron_sword").with_durability(100, 250);
        let right = ItemDescriptor::new("iron_ingot");
        assert_eq!(
            resolve_fusion(&left, &right, None, &held).kind,
            OutcomeKind::MaterialRepair
        );
        assert_eq!(
            resolve_fusion(&left, &right, None, &store.load()).kind,
            OutcomeKind::Unavailable
        );
    }

    #[test]
    fn resolver_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FusionResolver>();
    }
}
