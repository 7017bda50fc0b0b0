//! TOML rule file model.
//!
//! [`RuleFile`] mirrors the on-disk layout. Numeric fields that carry
//! invariants (levels, strengths) are read as signed integers so that a
//! negative value is reported as an invalid configuration, not a parse
//! failure. [`RuleFile::compile`] validates everything and produces a
//! [`RuleSnapshot`].
//!
//! ```toml
//! [costs]
//! rename = 1
//! ceiling = 39
//!
//! [fusion]
//! tie_break = "left"
//!
//! [[enchantments]]
//! id = "minecraft:sharpness"
//! max_level = 5
//! weight = 1
//! aliases = ["enchantplus:sharpness"]
//!
//! [[conflicts]]
//! name = "melee_damage"
//! members = ["sharpness", "smite"]
//! exempt = ["netherite_sword"]
//! max_members = 1
//!
//! [[materials]]
//! id = "diamond"
//! repair_strength = 390
//! repairs = ["diamond_sword"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anvil_types::{EnchantmentId, EnchantmentMap, MaterialId, RawEnchantmentKey};
use serde::{Deserialize, Serialize};

use crate::conflict::ConflictSet;
use crate::error::{Result, RuleError};
use crate::material::{MaterialRepairPolicy, MaterialRepairRule};
use crate::names::title_case;
use crate::registry::{EnchantmentDef, EnchantmentRegistry};
use crate::settings::{CostRules, FusionSettings};
use crate::snapshot::RuleSnapshot;

/// Top-level rule file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleFile {
    pub costs: CostRules,
    pub fusion: FusionSettings,
    pub enchantments: Vec<EnchantmentSpec>,
    pub conflicts: Vec<ConflictSpec>,
    pub materials: Vec<MaterialSpec>,
}

/// One `[[enchantments]]` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnchantmentSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub max_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<MaterialId>,
}

/// One `[[conflicts]]` entry. Members may be canonical ids or aliases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConflictSpec {
    pub name: String,
    pub members: Vec<String>,
    /// Item materials the group does not apply to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exempt: Vec<MaterialId>,
    /// Members allowed together before the group blocks.
    #[serde(default = "one_member", skip_serializing_if = "is_one_member")]
    pub max_members: i64,
}

fn one_member() -> i64 {
    1
}

fn is_one_member(value: &i64) -> bool {
    *value == 1
}

/// One `[[materials]]` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialSpec {
    pub id: MaterialId,
    #[serde(default)]
    pub repair_strength: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repairs: Vec<MaterialId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub strength_overrides: BTreeMap<MaterialId, i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enchantment_caps: BTreeMap<String, i64>,
}

impl MaterialSpec {
    /// An entry for `id` with no repair role and no caps.
    pub fn new(id: impl Into<MaterialId>) -> Self {
        Self {
            id: id.into(),
            repair_strength: 0,
            repairs: Vec::new(),
            strength_overrides: BTreeMap::new(),
            enchantment_caps: BTreeMap::new(),
        }
    }
}

impl RuleFile {
    /// Parse a rule file from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a rule file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    /// Replace (or add) the entry for `spec.id`.
    pub fn upsert_material(&mut self, spec: MaterialSpec) {
        match self.materials.iter_mut().find(|m| m.id == spec.id) {
            Some(existing) => *existing = spec,
            None => self.materials.push(spec),
        }
    }

    /// Remove the entry for `material`, returning `true` if it existed.
    pub fn remove_material(&mut self, material: &MaterialId) -> bool {
        let before = self.materials.len();
        self.materials.retain(|m| &m.id != material);
        self.materials.len() != before
    }

    /// Validate the file and build an immutable snapshot.
    pub fn compile(self) -> Result<RuleSnapshot> {
        self.costs.validate()?;
        self.fusion.validate()?;

        let registry = self.compile_registry()?;
        let materials = self.compile_materials(&registry)?;

        Ok(RuleSnapshot::assemble(self, registry, materials))
    }

    fn compile_registry(&self) -> Result<EnchantmentRegistry> {
        let mut builder = EnchantmentRegistry::builder();

        for (index, spec) in self.enchantments.iter().enumerate() {
            let path = format!("enchantments[{index}]");
            let id = EnchantmentId::parse(&spec.id)
                .map_err(|e| RuleError::invalid(&path, e.to_string()))?;
            let max_level = positive(&format!("{path}.max_level"), spec.max_level)?;
            let weight = match spec.weight {
                Some(w) => non_negative(&format!("{path}.weight"), w)?,
                None => self.costs.default_weight,
            };
            let name = spec.name.clone().unwrap_or_else(|| title_case(id.key()));

            let mut def = EnchantmentDef::new(id, name, max_level, weight)
                .with_targets(spec.targets.iter().cloned());
            for alias in &spec.aliases {
                let key = RawEnchantmentKey::parse(alias)
                    .map_err(|e| RuleError::invalid(format!("{path}.aliases"), e.to_string()))?;
                def = def.with_alias(key);
            }
            builder = builder.enchantment(def);
        }

        // Resolve conflict members through a registry without conflicts so
        // that members may be written as aliases.
        let lookup = alias_lookup(&self.enchantments, self.costs.default_weight)?;
        for (index, spec) in self.conflicts.iter().enumerate() {
            let mut members = Vec::with_capacity(spec.members.len());
            for raw in &spec.members {
                let id = lookup.resolve(raw).map_err(|_| {
                    RuleError::invalid(
                        format!("conflicts[{index}].members"),
                        format!("unknown enchantment '{raw}'"),
                    )
                })?;
                members.push(id);
            }
            let max_members = positive(&format!("conflicts[{index}].max_members"), spec.max_members)?;
            let set = ConflictSet::new(spec.name.clone(), members)
                .with_exempt(spec.exempt.iter().cloned())
                .with_max_members(max_members as usize);
            builder = builder.conflict(set);
        }

        builder.build()
    }

    fn compile_materials(&self, registry: &EnchantmentRegistry) -> Result<MaterialRepairPolicy> {
        let mut rules = Vec::with_capacity(self.materials.len());
        let mut seen = std::collections::BTreeSet::new();

        for spec in &self.materials {
            let path = format!("materials.{}", spec.id);
            if spec.id.is_air() {
                return Err(RuleError::invalid(path, "air cannot carry material rules"));
            }
            if !seen.insert(spec.id.clone()) {
                return Err(RuleError::invalid(path, "material configured twice"));
            }

            let mut rule = MaterialRepairRule::new(spec.id.clone())
                .with_strength(non_negative(&format!("{path}.repair_strength"), spec.repair_strength)?)
                .repairing(spec.repairs.iter().cloned());

            for (item, strength) in &spec.strength_overrides {
                let strength = non_negative(&format!("{path}.strength_overrides.{item}"), *strength)?;
                rule = rule.with_override(item.clone(), strength);
            }

            let mut caps = EnchantmentMap::new();
            for (raw, cap) in &spec.enchantment_caps {
                let cap_path = format!("{path}.enchantment_caps.{raw}");
                let id = registry
                    .resolve(raw)
                    .map_err(|_| RuleError::invalid(&cap_path, "unknown enchantment"))?;
                caps.insert(id, positive(&cap_path, *cap)?);
            }
            rule.enchantment_caps = caps;

            rules.push(rule);
        }

        Ok(MaterialRepairPolicy::new(rules))
    }
}

fn alias_lookup(specs: &[EnchantmentSpec], default_weight: u32) -> Result<EnchantmentRegistry> {
    let mut builder = EnchantmentRegistry::builder();
    for spec in specs {
        // Already validated by the caller; parse failures cannot happen here.
        let Ok(id) = EnchantmentId::parse(&spec.id) else { continue };
        let mut def = EnchantmentDef::new(id, String::new(), 1, default_weight);
        for alias in &spec.aliases {
            if let Ok(key) = RawEnchantmentKey::parse(alias) {
                def = def.with_alias(key);
            }
        }
        builder = builder.enchantment(def);
    }
    builder.build()
}

fn positive(path: &str, value: i64) -> Result<u32> {
    if value < 1 {
        return Err(RuleError::invalid(path, format!("must be at least 1, got {value}")));
    }
    u32::try_from(value).map_err(|_| RuleError::invalid(path, format!("{value} is too large")))
}

fn non_negative(path: &str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(RuleError::invalid(path, format!("must not be negative, got {value}")));
    }
    u32::try_from(value).map_err(|_| RuleError::invalid(path, format!("{value} is too large")))
}
