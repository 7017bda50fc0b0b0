//! Enchantment merge with level caps and conflict resolution.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use anvil_rules::{EnchantmentRegistry, MaterialRepairPolicy, RuleSnapshot, TieBreak};
use anvil_types::{EnchantmentId, EnchantmentMap, MaterialId};
use serde::Serialize;

/// What happened to one enchantment during a merge, relative to the left
/// item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum EnchantDelta {
    /// Not on the left item; appears on the result.
    Added { level: u32 },
    /// On the left item at `from`; the result has `to`.
    Upgraded { from: u32, to: u32 },
    /// Kept without gaining a level.
    Carried { level: u32 },
    /// Lost a conflict against a stronger or preferred enchantment.
    DroppedByConflict { level: u32, from_right: bool },
    /// Right-hand enchantment not applicable to the left material.
    DroppedInapplicable { level: u32 },
}

impl EnchantDelta {
    /// Upgrade steps this delta contributes to the price.
    pub fn upgrade_steps(&self) -> u32 {
        match *self {
            Self::Added { level } => level,
            Self::Upgraded { from, to } => to.saturating_sub(from),
            _ => 0,
        }
    }
}

/// Output of [`Merger::merge`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub enchantments: EnchantmentMap,
    pub deltas: BTreeMap<EnchantmentId, EnchantDelta>,
}

impl MergeResult {
    /// Right-hand enchantments lost to a conflict.
    pub fn right_conflict_losses(&self) -> u32 {
        let n = self
            .deltas
            .values()
            .filter(|d| matches!(d, EnchantDelta::DroppedByConflict { from_right: true, .. }))
            .count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    Left,
    Right,
    Both,
}

struct Candidate<'a> {
    id: &'a EnchantmentId,
    level: u32,
    left: u32,
    right: u32,
    origin: Origin,
}

/// Merges two enchantment maps under one rule snapshot.
pub struct Merger<'a> {
    registry: &'a EnchantmentRegistry,
    policy: &'a MaterialRepairPolicy,
    tie_break: TieBreak,
}

impl<'a> Merger<'a> {
    pub fn new(rules: &'a RuleSnapshot) -> Self {
        Self {
            registry: rules.registry(),
            policy: rules.materials(),
            tie_break: rules.fusion().tie_break,
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Merge `right` into `left` for an item of `material`.
    ///
    /// In sacrifice mode the right map comes from an enchantment carrier and
    /// may add enchantments the material does not normally accept.
    pub fn merge(
        &self,
        left: &EnchantmentMap,
        right: &EnchantmentMap,
        material: &MaterialId,
        sacrifice: bool,
    ) -> MergeResult {
        let mut out = MergeResult::default();
        let ids: BTreeSet<&EnchantmentId> = left.keys().chain(right.keys()).collect();

        let mut candidates = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(def) = self.registry.get(id) else {
                tracing::debug!(enchantment = %id, "ignoring unregistered enchantment");
                continue;
            };

            let l = left.get(id).copied().unwrap_or(0);
            let mut r = right.get(id).copied().unwrap_or(0);
            if r > 0 && !sacrifice && !def.applies_to(material) {
                tracing::debug!(enchantment = %id, material = %material, "not applicable");
                if l == 0 {
                    out.deltas.insert(id.clone(), EnchantDelta::DroppedInapplicable { level: r });
                    continue;
                }
                r = 0;
            }

            let combined = match (l, r) {
                (0, r) => r,
                (l, 0) => l,
                (l, r) if l == r => l.saturating_add(1),
                (l, r) => l.max(r),
            };
            let level = combined.min(self.policy.effective_cap(self.registry, material, id));
            if level == 0 {
                continue;
            }

            let origin = match (l > 0, r > 0) {
                (true, true) => Origin::Both,
                (true, false) => Origin::Left,
                _ => Origin::Right,
            };
            candidates.push(Candidate {
                id,
                level,
                left: l,
                right: r,
                origin,
            });
        }

        candidates.sort_by_key(|c| (Reverse(c.level), self.rank(c.origin), c.id));

        let mut accepted: Vec<&EnchantmentId> = Vec::with_capacity(candidates.len());
        for c in candidates {
            let blocking = self.registry.conflict_sets_of(c.id).into_iter().find(|set| {
                let present = accepted.iter().filter(|a| set.contains(a)).count();
                set.blocks(material, present)
            });
            if let Some(set) = blocking {
                tracing::debug!(dropped = %c.id, group = %set.name, "conflict");
                out.deltas.insert(
                    c.id.clone(),
                    EnchantDelta::DroppedByConflict {
                        level: c.level,
                        from_right: c.right > 0,
                    },
                );
                continue;
            }

            let delta = if c.left == 0 {
                EnchantDelta::Added { level: c.level }
            } else if c.level > c.left {
                EnchantDelta::Upgraded {
                    from: c.left,
                    to: c.level,
                }
            } else {
                EnchantDelta::Carried { level: c.level }
            };
            out.deltas.insert(c.id.clone(), delta);
            out.enchantments.insert(c.id.clone(), c.level);
            accepted.push(c.id);
        }

        out
    }

    fn rank(&self, origin: Origin) -> u8 {
        match (origin, self.tie_break) {
            (Origin::Both, _) => 0,
            (Origin::Left, TieBreak::Left) | (Origin::Right, TieBreak::Right) => 1,
            _ => 2,
        }
    }
}
