//! Conflict sets: groups of enchantments that cannot coexist on one item.

use std::collections::BTreeSet;
use std::fmt;

use anvil_types::{EnchantmentId, MaterialId};
use serde::{Deserialize, Serialize};

/// A named group of mutually exclusive enchantments.
///
/// At most `max_members` members may appear on a fusion result, except on
/// items whose material the group exempts. When more members compete, higher
/// levels win and [`TieBreak`] decides equal levels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictSet {
    pub name: String,
    members: BTreeSet<EnchantmentId>,
    exempt: BTreeSet<MaterialId>,
    max_members: usize,
}

impl ConflictSet {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = EnchantmentId>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().collect(),
            exempt: BTreeSet::new(),
            max_members: 1,
        }
    }

    /// Item materials on which the group never blocks.
    pub fn with_exempt(mut self, materials: impl IntoIterator<Item = MaterialId>) -> Self {
        self.exempt.extend(materials);
        self
    }

    /// Members allowed together before the group blocks. Values below 1 are
    /// raised to 1.
    pub fn with_max_members(mut self, max_members: usize) -> Self {
        self.max_members = max_members.max(1);
        self
    }

    pub fn contains(&self, id: &EnchantmentId) -> bool {
        self.members.contains(id)
    }

    pub fn members(&self) -> &BTreeSet<EnchantmentId> {
        &self.members
    }

    pub fn exempt(&self) -> &BTreeSet<MaterialId> {
        &self.exempt
    }

    pub fn max_members(&self) -> usize {
        self.max_members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `true` if `a` and `b` are distinct members of this set.
    pub fn excludes(&self, a: &EnchantmentId, b: &EnchantmentId) -> bool {
        a != b && self.contains(a) && self.contains(b)
    }

    /// Returns `true` if the group does not apply to items of `material`.
    pub fn exempts(&self, material: &MaterialId) -> bool {
        self.exempt.contains(material)
    }

    /// Returns `true` if one more member may not join `present` members
    /// already on an item of `material`.
    pub fn blocks(&self, material: &MaterialId, present: usize) -> bool {
        !self.exempts(material) && present >= self.max_members
    }
}

/// Which input wins a conflict between members of equal level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// The item in the left slot wins.
    #[default]
    Left,
    /// The item in the right slot wins.
    Right,
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> EnchantmentId {
        EnchantmentId::parse(raw).unwrap()
    }

    #[test]
    fn excludes_distinct_members_only() {
        let set = ConflictSet::new("damage", [id("sharpness"), id("smite")]);
        assert!(set.excludes(&id("sharpness"), &id("smite")));
        assert!(!set.excludes(&id("sharpness"), &id("sharpness")));
        assert!(!set.excludes(&id("sharpness"), &id("unbreaking")));
    }

    #[test]
    fn duplicate_members_collapse() {
        let set = ConflictSet::new("dup", [id("smite"), id("minecraft:smite")]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn blocks_after_max_members() {
        let sword = MaterialId::new("diamond_sword");
        let single = ConflictSet::new("damage", [id("sharpness"), id("smite")]);
        assert!(!single.blocks(&sword, 0));
        assert!(single.blocks(&sword, 1));

        let pair = single.clone().with_max_members(2);
        assert!(!pair.blocks(&sword, 1));
        assert!(pair.blocks(&sword, 2));
    }

    #[test]
    fn exempt_material_never_blocks() {
        let set = ConflictSet::new("damage", [id("sharpness"), id("smite")])
            .with_exempt([MaterialId::new("netherite_sword")]);
        assert!(set.exempts(&MaterialId::new("NETHERITE_SWORD")));
        assert!(!set.blocks(&MaterialId::new("netherite_sword"), 5));
        assert!(set.blocks(&MaterialId::new("diamond_sword"), 1));
    }

    #[test]
    fn max_members_is_at_least_one() {
        let set = ConflictSet::new("x", [id("sharpness")]).with_max_members(0);
        assert_eq!(set.max_members(), 1);
    }

    #[test]
    fn tie_break_defaults_to_left() {
        assert_eq!(TieBreak::default(), TieBreak::Left);
        let parsed: TieBreak = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(parsed, TieBreak::Right);
    }
}
