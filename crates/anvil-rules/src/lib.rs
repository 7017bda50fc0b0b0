//! Rule configuration for the anvil fusion engine.
//!
//! Rules are read from a TOML [`RuleFile`], validated, and compiled into an
//! immutable [`RuleSnapshot`]. The fusion engine only ever reads snapshots;
//! reloads and edits produce a new snapshot that a [`RuleStore`] publishes
//! with a single atomic swap.
//!
//! # Quick Start
//!
//! ```rust
//! use anvil_rules::{RuleSnapshot, RuleStore};
//! use anvil_types::MaterialId;
//!
//! let store = RuleStore::new(RuleSnapshot::vanilla().unwrap());
//! let rules = store.load();
//!
//! let sharpness = rules.registry().resolve("SHARPNESS").unwrap();
//! assert_eq!(rules.registry().max_level_of(&sharpness), 5);
//!
//! let strength = rules
//!     .materials()
//!     .repair_strength_for(&MaterialId::new("iron_ingot"), &MaterialId::new("iron_sword"));
//! assert!(strength.is_some());
//! ```

pub mod catalog;
pub mod conflict;
pub mod error;
pub mod file;
pub mod material;
pub mod names;
pub mod registry;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use catalog::{MaterialCatalog, MaterialView};
pub use conflict::{ConflictSet, TieBreak};
pub use error::{Result, RuleError};
pub use file::{ConflictSpec, EnchantmentSpec, MaterialSpec, RuleFile};
pub use material::{MaterialRepairPolicy, MaterialRepairRule};
pub use registry::{Canonicalized, EnchantmentDef, EnchantmentRegistry, RegistryBuilder};
pub use settings::{CostRules, FusionSettings};
pub use snapshot::RuleSnapshot;
pub use store::RuleStore;
