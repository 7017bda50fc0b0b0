//! Foundation types for the anvil fusion engine.
//!
//! This crate provides the value types passed into and out of the fusion
//! engine. Every other anvil crate depends on `anvil-types`.
//!
//! # Key Types
//!
//! - [`MaterialId`]: Opaque, normalized material identifier
//! - [`RawEnchantmentKey`]: Namespaced enchantment key as a host reports it
//! - [`EnchantmentId`]: Canonical enchantment identifier after registry resolution
//! - [`ItemDescriptor`]: Immutable snapshot of one anvil input or output item
//! - [`OutcomeKind`]: Which fusion rule applied
//! - [`FusionOutcome`]: Result item, price, and consumption of one fusion
//! - [`RulesFingerprint`]: Digest of the rule snapshot an outcome was computed with

pub mod enchantment;
pub mod error;
pub mod item;
pub mod outcome;

pub use enchantment::{EnchantmentId, EnchantmentMap, RawEnchantmentKey, DEFAULT_NAMESPACE};
pub use error::TypeError;
pub use item::{ItemDescriptor, MaterialId};
pub use outcome::{FusionOutcome, OutcomeKind, RulesFingerprint};
