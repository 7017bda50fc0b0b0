//! Material repair policy.
//!
//! A [`MaterialRepairRule`] describes one material in two roles: as a repair
//! ingredient (its strength and the item materials it repairs) and as the
//! material of an item being fused (per-material enchantment caps). Lookups
//! are layered: a material-specific value wins, otherwise the global
//! default applies.

use std::collections::{BTreeMap, BTreeSet};

use anvil_types::{EnchantmentId, EnchantmentMap, MaterialId};

use crate::registry::EnchantmentRegistry;

static NO_CAPS: EnchantmentMap = BTreeMap::new();

/// Rules attached to a single material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialRepairRule {
    pub material: MaterialId,
    /// Durability restored per unit consumed. Zero means not a repair material.
    pub repair_strength: u32,
    /// Item materials this material repairs.
    pub repairs: BTreeSet<MaterialId>,
    /// Per-item strength, overriding `repair_strength` for that item.
    pub strength_overrides: BTreeMap<MaterialId, u32>,
    /// Level caps for items made of this material. Can only lower the
    /// registry cap.
    pub enchantment_caps: EnchantmentMap,
}

impl MaterialRepairRule {
    pub fn new(material: impl Into<MaterialId>) -> Self {
        Self {
            material: material.into(),
            repair_strength: 0,
            repairs: BTreeSet::new(),
            strength_overrides: BTreeMap::new(),
            enchantment_caps: EnchantmentMap::new(),
        }
    }

    pub fn with_strength(mut self, strength: u32) -> Self {
        self.repair_strength = strength;
        self
    }

    pub fn repairing(mut self, items: impl IntoIterator<Item = MaterialId>) -> Self {
        self.repairs.extend(items);
        self
    }

    pub fn with_override(mut self, item: impl Into<MaterialId>, strength: u32) -> Self {
        self.strength_overrides.insert(item.into(), strength);
        self
    }

    pub fn with_cap(mut self, id: EnchantmentId, cap: u32) -> Self {
        self.enchantment_caps.insert(id, cap);
        self
    }

    /// Strength applied when repairing `item`, if this rule repairs it.
    pub fn strength_for(&self, item: &MaterialId) -> Option<u32> {
        let strength = match self.strength_overrides.get(item) {
            Some(strength) => *strength,
            None if self.repairs.contains(item) => self.repair_strength,
            None => return None,
        };
        (strength > 0).then_some(strength)
    }

    /// Number of distinct item materials this rule can repair.
    pub fn repairable_count(&self) -> usize {
        self.repairs
            .iter()
            .chain(self.strength_overrides.keys())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Read-only view over every configured material rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialRepairPolicy {
    rules: BTreeMap<MaterialId, MaterialRepairRule>,
}

impl MaterialRepairPolicy {
    pub fn new(rules: impl IntoIterator<Item = MaterialRepairRule>) -> Self {
        Self {
            rules: rules.into_iter().map(|r| (r.material.clone(), r)).collect(),
        }
    }

    pub fn get(&self, material: &MaterialId) -> Option<&MaterialRepairRule> {
        self.rules.get(material)
    }

    /// Base repair strength of `material`; 0 if it is not a repair material.
    pub fn repair_strength_of(&self, material: &MaterialId) -> u32 {
        self.rules.get(material).map(|r| r.repair_strength).unwrap_or(0)
    }

    /// Strength `repair_material` restores on an item of `item_material`,
    /// or `None` when it is not configured to repair that item.
    pub fn repair_strength_for(
        &self,
        repair_material: &MaterialId,
        item_material: &MaterialId,
    ) -> Option<u32> {
        self.rules.get(repair_material)?.strength_for(item_material)
    }

    /// Per-material cap overrides for items of `material` (empty when none).
    pub fn enchantment_caps_for(&self, material: &MaterialId) -> &EnchantmentMap {
        self.rules
            .get(material)
            .map(|r| &r.enchantment_caps)
            .unwrap_or(&NO_CAPS)
    }

    /// Cap for `id` on an item of `material`: the material override when
    /// present, never above the registry cap.
    pub fn effective_cap(
        &self,
        registry: &EnchantmentRegistry,
        material: &MaterialId,
        id: &EnchantmentId,
    ) -> u32 {
        let global = registry.max_level_of(id);
        match self.enchantment_caps_for(material).get(id) {
            Some(cap) => (*cap).min(global),
            None => global,
        }
    }

    /// Materials usable as a repair ingredient for at least one item.
    pub fn repair_materials(&self) -> impl Iterator<Item = &MaterialRepairRule> {
        self.rules
            .values()
            .filter(|r| r.repair_strength > 0 || r.strength_overrides.values().any(|s| *s > 0))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialRepairRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// A copy of this policy with `rule` added or replacing the old rule.
    pub fn with_rule(&self, rule: MaterialRepairRule) -> Self {
        let mut rules = self.rules.clone();
        rules.insert(rule.material.clone(), rule);
        Self { rules }
    }

    /// A copy of this policy without the rule for `material`.
    pub fn without(&self, material: &MaterialId) -> Self {
        let mut rules = self.rules.clone();
        rules.remove(material);
        Self { rules }
    }
}
