//! Durability arithmetic for material and same-item repairs.

use anvil_types::ItemDescriptor;

/// Effect of repairing an item with a stack of repair material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitRepair {
    /// Units taken from the right-hand stack.
    pub units: u32,
    /// Durability points restored.
    pub restored: u32,
    /// Damage left on the item afterwards.
    pub damage: u32,
}

/// Repair `item` with up to `stack` units that restore `strength` each.
///
/// Consumes `min(stack, ceil(damage / strength))` units. Returns `None` when
/// there is nothing to repair or nothing to repair with.
pub fn unit_repair(item: &ItemDescriptor, strength: u32, stack: u32) -> Option<UnitRepair> {
    if !item.is_damaged() || strength == 0 || stack == 0 {
        return None;
    }
    let units = item.damage.div_ceil(strength).min(stack);
    let restored = units.saturating_mul(strength).min(item.damage);
    Some(UnitRepair {
        units,
        restored,
        damage: item.damage - restored,
    })
}

/// Damage left on `left` after combining it with another item of the same
/// material.
///
/// Remaining durabilities are summed and a bonus of `bonus_percent` of the
/// maximum is added; the result is clipped to the maximum and never worse
/// than `left` alone.
pub fn combined_damage(left: &ItemDescriptor, right: &ItemDescriptor, bonus_percent: u32) -> u32 {
    if !left.is_damageable() {
        return left.damage;
    }
    let max = left.max_durability;
    let bonus = u64::from(max) * u64::from(bonus_percent) / 100;
    let remaining = u64::from(left.durability()) + u64::from(right.durability().min(max)) + bonus;
    let durability = remaining.min(u64::from(max)) as u32;
    (max - durability).min(left.damage)
}
