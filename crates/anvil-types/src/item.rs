use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enchantment::{EnchantmentId, EnchantmentMap};

/// Opaque host material identifier.
///
/// Normalized to trimmed lower case so that `DIAMOND_SWORD` and
/// `diamond_sword` compare equal. An empty identifier is treated as air.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MaterialId(String);

impl MaterialId {
    /// Material of an empty slot.
    pub const AIR: &'static str = "air";

    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().trim().to_ascii_lowercase();
        if normalized.is_empty() {
            Self(Self::AIR.to_string())
        } else {
            Self(normalized)
        }
    }

    pub fn air() -> Self {
        Self(Self::AIR.to_string())
    }

    pub fn is_air(&self) -> bool {
        self.0 == Self::AIR
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MaterialId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for MaterialId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<MaterialId> for String {
    fn from(id: MaterialId) -> Self {
        id.0
    }
}

impl fmt::Debug for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaterialId({})", self.0)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable snapshot of one item placed in (or produced by) the anvil.
///
/// The engine never mutates a descriptor it was given; every result is a
/// fresh value built with the `with_*` helpers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDescriptor {
    /// Host material of the item.
    pub material: MaterialId,
    /// Stack size. Zero means the slot is empty.
    pub amount: u32,
    /// Maximum durability of the material. Zero means not damageable.
    pub max_durability: u32,
    /// Damage taken so far (`max_durability - damage` is what remains).
    pub damage: u32,
    /// Work penalty accrued by earlier anvil uses.
    pub repair_cost: u32,
    /// Enchantments carried by the item (stored enchantments for books).
    pub enchantments: EnchantmentMap,
    /// Custom display name, if any.
    pub display_name: Option<String>,
    /// Unbreakable items never lose or regain durability.
    pub unbreakable: bool,
}

impl Default for ItemDescriptor {
    fn default() -> Self {
        Self::empty()
    }
}

impl ItemDescriptor {
    /// The designated descriptor for an absent slot.
    pub fn empty() -> Self {
        Self {
            material: MaterialId::air(),
            amount: 0,
            max_durability: 0,
            damage: 0,
            repair_cost: 0,
            enchantments: EnchantmentMap::new(),
            display_name: None,
            unbreakable: false,
        }
    }

    /// A single, undamaged, unenchanted item of `material`.
    pub fn new(material: impl Into<MaterialId>) -> Self {
        Self {
            material: material.into(),
            amount: 1,
            ..Self::empty()
        }
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    /// Set durability as `remaining / max`.
    pub fn with_durability(mut self, remaining: u32, max: u32) -> Self {
        self.max_durability = max;
        self.damage = max.saturating_sub(remaining);
        self
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage.min(self.max_durability);
        self
    }

    pub fn with_repair_cost(mut self, repair_cost: u32) -> Self {
        self.repair_cost = repair_cost;
        self
    }

    pub fn with_enchantment(mut self, id: EnchantmentId, level: u32) -> Self {
        if level == 0 {
            self.enchantments.remove(&id);
        } else {
            self.enchantments.insert(id, level);
        }
        self
    }

    pub fn with_enchantments(mut self, enchantments: EnchantmentMap) -> Self {
        self.enchantments = enchantments;
        self.enchantments.retain(|_, level| *level > 0);
        self
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    pub fn with_unbreakable(mut self, unbreakable: bool) -> Self {
        self.unbreakable = unbreakable;
        self
    }

    /// Returns `true` for the empty-slot descriptor (air or zero amount).
    pub fn is_empty(&self) -> bool {
        self.amount == 0 || self.material.is_air()
    }

    /// Returns `true` if the item can lose and regain durability.
    pub fn is_damageable(&self) -> bool {
        self.max_durability > 0 && !self.unbreakable
    }

    pub fn is_damaged(&self) -> bool {
        self.is_damageable() && self.damage > 0
    }

    /// Durability left before the item breaks.
    pub fn durability(&self) -> u32 {
        self.max_durability.saturating_sub(self.damage)
    }

    /// Level of `id` on this item, 0 when absent.
    pub fn level_of(&self, id: &EnchantmentId) -> u32 {
        self.enchantments.get(id).copied().unwrap_or(0)
    }
}
