//! JSON item files and the terminal outcome sink.
//!
//! An item file looks like:
//!
//! ```json
//! {
//!   "material": "diamond_sword",
//!   "max_durability": 1561,
//!   "damage": 300,
//!   "repair_cost": 1,
//!   "enchantments": { "sharpness": 3, "enchantplus:unbreaking": 2 },
//!   "display_name": "Edge"
//! }
//! ```
//!
//! Enchantment keys are raw identifiers and are canonicalized through the
//! registry; unknown ones are dropped with a warning.

use std::collections::BTreeMap;
use std::path::Path;

use anvil_fuse::{ItemSource, OutcomeSink};
use anvil_rules::EnchantmentRegistry;
use anvil_types::{FusionOutcome, ItemDescriptor, MaterialId};
use anyhow::Context;
use colored::Colorize;
use serde::Deserialize;

use crate::cli::OutputFormat;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemFile {
    material: MaterialId,
    #[serde(default = "one")]
    amount: u32,
    #[serde(default)]
    max_durability: u32,
    #[serde(default)]
    damage: u32,
    #[serde(default)]
    repair_cost: u32,
    #[serde(default)]
    enchantments: BTreeMap<String, u32>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    unbreakable: bool,
}

fn one() -> u32 {
    1
}

impl ItemFile {
    fn into_descriptor(self, registry: &EnchantmentRegistry) -> ItemDescriptor {
        let canonical = registry.canonicalize(self.enchantments.iter().map(|(k, v)| (k.as_str(), *v)));
        ItemDescriptor::new(self.material)
            .with_amount(self.amount)
            .with_durability(self.max_durability.saturating_sub(self.damage), self.max_durability)
            .with_repair_cost(self.repair_cost)
            .with_enchantments(canonical.enchantments)
            .with_display_name(self.display_name)
            .with_unbreakable(self.unbreakable)
    }
}

/// Parse one item from JSON text.
pub fn parse_item(text: &str, registry: &EnchantmentRegistry) -> anyhow::Result<ItemDescriptor> {
    let file: ItemFile = serde_json::from_str(text)?;
    Ok(file.into_descriptor(registry))
}

/// Read one item file.
pub fn load_item(path: &Path, registry: &EnchantmentRegistry) -> anyhow::Result<ItemDescriptor> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading item file {}", path.display()))?;
    parse_item(&text, registry).with_context(|| format!("parsing item file {}", path.display()))
}

/// Anvil input slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slot {
    Left,
    Right,
}

/// Items loaded from disk, indexed by slot.
#[derive(Debug, Default)]
pub struct LoadedItems {
    items: BTreeMap<Slot, ItemDescriptor>,
}

impl LoadedItems {
    pub fn insert(&mut self, slot: Slot, item: ItemDescriptor) {
        self.items.insert(slot, item);
    }
}

impl ItemSource for LoadedItems {
    type Handle = Slot;

    fn snapshot(&self, handle: &Slot) -> ItemDescriptor {
        self.items.get(handle).cloned().unwrap_or_else(ItemDescriptor::empty)
    }
}

/// Prints outcomes to stdout.
pub struct Terminal {
    pub format: OutputFormat,
}

impl OutcomeSink for Terminal {
    type Slot = ();

    fn apply(&mut self, _slot: &(), outcome: &FusionOutcome) {
        match self.format {
            OutputFormat::Json => match serde_json::to_string_pretty(outcome) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "outcome could not be serialized"),
            },
            OutputFormat::Text => print_outcome(outcome),
        }
    }
}

fn print_outcome(outcome: &FusionOutcome) {
    let (Some(item), Some(cost)) = (&outcome.result, outcome.cost) else {
        println!("{} no result (rules {})", "✗".red().bold(), outcome.fingerprint.to_string().dimmed());
        return;
    };

    println!(
        "{} {}  cost {}  consumes {}",
        "✓".green().bold(),
        outcome.kind.to_string().cyan().bold(),
        cost.to_string().yellow().bold(),
        outcome.consumed
    );
    let name = item.display_name.as_deref().unwrap_or("-");
    println!("  Item: {} ({})", item.material.to_string().bold(), name);
    if item.max_durability > 0 {
        println!("  Durability: {}/{}", item.durability(), item.max_durability);
    }
    for (id, level) in &item.enchantments {
        println!("  {} {}", id.to_string().blue(), level);
    }
    println!("  Work penalty: {}", item.repair_cost);
    println!("  Rules: {}", outcome.fingerprint.to_string().dimmed());
}
