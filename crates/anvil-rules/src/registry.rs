//! Enchantment registry: canonicalization, caps, weights, and conflicts.
//!
//! The registry owns a resolution table from [`RawEnchantmentKey`] to
//! [`EnchantmentId`]. Every canonical id resolves to itself, and configured
//! aliases (keys from other plugin namespaces) resolve to the id they stand
//! for. All queries are read-only; a registry is rebuilt wholesale on reload.

use std::collections::{BTreeMap, BTreeSet};

use anvil_types::{EnchantmentId, EnchantmentMap, MaterialId, RawEnchantmentKey};

use crate::conflict::ConflictSet;
use crate::error::{Result, RuleError};
use crate::names::lookup_key;

/// A registered enchantment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnchantmentDef {
    pub id: EnchantmentId,
    /// Display name used by name lookups.
    pub name: String,
    /// Global level cap. Always at least 1.
    pub max_level: u32,
    /// Cost weight per upgrade step.
    pub weight: u32,
    /// Raw keys from other namespaces that mean this enchantment.
    pub aliases: Vec<RawEnchantmentKey>,
    /// Item materials this enchantment normally applies to; empty means all.
    pub targets: BTreeSet<MaterialId>,
}

impl EnchantmentDef {
    pub fn new(id: EnchantmentId, name: impl Into<String>, max_level: u32, weight: u32) -> Self {
        Self {
            id,
            name: name.into(),
            max_level,
            weight,
            aliases: Vec::new(),
            targets: BTreeSet::new(),
        }
    }

    pub fn with_alias(mut self, alias: RawEnchantmentKey) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn with_targets(mut self, targets: impl IntoIterator<Item = MaterialId>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    /// Returns `true` if the enchantment is normally obtainable on `material`.
    pub fn applies_to(&self, material: &MaterialId) -> bool {
        self.targets.is_empty() || self.targets.contains(material)
    }
}

/// Result of canonicalizing a host's raw enchantment list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Canonicalized {
    pub enchantments: EnchantmentMap,
    /// Raw ids that did not resolve; they are dropped from `enchantments`.
    pub unknown: Vec<String>,
}

/// Read-only lookup over the registered enchantments.
#[derive(Clone, Debug, Default)]
pub struct EnchantmentRegistry {
    defs: BTreeMap<EnchantmentId, EnchantmentDef>,
    resolution: BTreeMap<RawEnchantmentKey, EnchantmentId>,
    conflicts: Vec<ConflictSet>,
    membership: BTreeMap<EnchantmentId, Vec<usize>>,
}

impl EnchantmentRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolve a raw identifier to its canonical id.
    pub fn resolve(&self, raw: &str) -> Result<EnchantmentId> {
        let key = RawEnchantmentKey::parse(raw)
            .map_err(|_| RuleError::UnknownEnchantment(raw.to_string()))?;
        self.resolve_key(&key)
            .cloned()
            .ok_or_else(|| RuleError::UnknownEnchantment(raw.to_string()))
    }

    /// Resolve an already parsed key.
    pub fn resolve_key(&self, key: &RawEnchantmentKey) -> Option<&EnchantmentId> {
        self.resolution.get(key)
    }

    pub fn get(&self, id: &EnchantmentId) -> Option<&EnchantmentDef> {
        self.defs.get(id)
    }

    pub fn contains(&self, id: &EnchantmentId) -> bool {
        self.defs.contains_key(id)
    }

    /// Global cap of `id`; 0 for ids this registry does not know.
    pub fn max_level_of(&self, id: &EnchantmentId) -> u32 {
        self.defs.get(id).map(|d| d.max_level).unwrap_or(0)
    }

    /// Configured weight of `id`, if registered.
    pub fn weight_of(&self, id: &EnchantmentId) -> Option<u32> {
        self.defs.get(id).map(|d| d.weight)
    }

    /// Every conflict set `id` belongs to (empty when none).
    pub fn conflict_sets_of(&self, id: &EnchantmentId) -> Vec<&ConflictSet> {
        self.membership
            .get(id)
            .map(|indices| indices.iter().map(|&i| &self.conflicts[i]).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `a` and `b` share at least one conflict set.
    pub fn conflicts_with(&self, a: &EnchantmentId, b: &EnchantmentId) -> bool {
        if a == b {
            return false;
        }
        match (self.membership.get(a), self.membership.get(b)) {
            (Some(left), Some(right)) => left.iter().any(|i| right.contains(i)),
            _ => false,
        }
    }

    pub fn conflict_sets(&self) -> &[ConflictSet] {
        &self.conflicts
    }

    /// Find enchantments by display name, canonical key, or alias key.
    ///
    /// Matching ignores case, spaces, underscores and hyphens. More than one
    /// id is returned when a name aliases several enchantments; callers must
    /// treat that as ambiguous rather than pick one.
    pub fn discover_by_name(&self, name: &str) -> Vec<EnchantmentId> {
        let wanted = lookup_key(name);
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut found = BTreeSet::new();
        for def in self.defs.values() {
            if lookup_key(&def.name) == wanted || lookup_key(def.id.key()) == wanted {
                found.insert(def.id.clone());
            }
        }
        for (key, id) in &self.resolution {
            if lookup_key(&key.key) == wanted {
                found.insert(id.clone());
            }
        }
        found.into_iter().collect()
    }

    /// Canonicalize a raw enchantment list as reported by a host.
    ///
    /// Unknown or malformed ids are collected in [`Canonicalized::unknown`].
    /// Raw ids that alias the same enchantment keep the higher level. Zero
    /// levels are dropped.
    pub fn canonicalize<'a, I>(&self, raw: I) -> Canonicalized
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut out = Canonicalized::default();
        for (raw_id, level) in raw {
            match self.resolve(raw_id) {
                Ok(id) => {
                    if level == 0 {
                        continue;
                    }
                    let entry = out.enchantments.entry(id).or_insert(0);
                    *entry = (*entry).max(level);
                }
                Err(_) => {
                    tracing::warn!(enchantment = %raw_id, "dropping unknown enchantment");
                    out.unknown.push(raw_id.to_string());
                }
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnchantmentDef> {
        self.defs.values()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Accumulates definitions and conflict sets, validating on [`Self::build`].
#[derive(Default)]
pub struct RegistryBuilder {
    defs: Vec<EnchantmentDef>,
    conflicts: Vec<ConflictSet>,
}

impl RegistryBuilder {
    pub fn enchantment(mut self, def: EnchantmentDef) -> Self {
        self.defs.push(def);
        self
    }

    pub fn conflict(mut self, set: ConflictSet) -> Self {
        self.conflicts.push(set);
        self
    }

    /// Validate and build the registry.
    ///
    /// Fails on caps below 1, duplicate ids, aliases claimed by two
    /// enchantments, and conflict sets naming unregistered ids.
    pub fn build(self) -> Result<EnchantmentRegistry> {
        let mut defs = BTreeMap::new();
        let mut resolution: BTreeMap<RawEnchantmentKey, EnchantmentId> = BTreeMap::new();

        for def in &self.defs {
            let path = format!("enchantments.{}", def.id);
            if def.max_level < 1 {
                return Err(RuleError::invalid(path, "max_level must be at least 1"));
            }
            if defs.contains_key(&def.id) {
                return Err(RuleError::invalid(path, "enchantment registered twice"));
            }
            defs.insert(def.id.clone(), def.clone());
        }

        // Canonical ids first so an alias can never shadow a real id.
        for id in defs.keys() {
            let key = RawEnchantmentKey {
                namespace: id.namespace().to_string(),
                key: id.key().to_string(),
            };
            resolution.insert(key, id.clone());
        }
        for def in defs.values() {
            for alias in &def.aliases {
                match resolution.get(alias) {
                    Some(existing) if existing == &def.id => {}
                    Some(existing) => {
                        return Err(RuleError::invalid(
                            format!("enchantments.{}.aliases", def.id),
                            format!("alias '{alias}' already resolves to {existing}"),
                        ));
                    }
                    None => {
                        resolution.insert(alias.clone(), def.id.clone());
                    }
                }
            }
        }

        let mut membership: BTreeMap<EnchantmentId, Vec<usize>> = BTreeMap::new();
        for (index, set) in self.conflicts.iter().enumerate() {
            if set.name.trim().is_empty() {
                return Err(RuleError::invalid(
                    format!("conflicts[{index}]"),
                    "conflict set name must not be empty",
                ));
            }
            for member in set.members() {
                if !defs.contains_key(member) {
                    return Err(RuleError::invalid(
                        format!("conflicts.{}", set.name),
                        format!("member {member} is not a registered enchantment"),
                    ));
                }
                membership.entry(member.clone()).or_default().push(index);
            }
        }

        Ok(EnchantmentRegistry {
            defs,
            resolution,
            conflicts: self.conflicts,
            membership,
        })
    }
}
