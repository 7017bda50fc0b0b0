//! Seams between the engine and a host game server.
//!
//! A host implements [`ItemSource`] to describe its items and [`OutcomeSink`]
//! to show results. [`fuse_slots`] wires both to a [`RuleStore`] so that one
//! fusion reads exactly one rule snapshot from start to finish.

use anvil_rules::RuleStore;
use anvil_types::{FusionOutcome, ItemDescriptor};

use crate::resolver::FusionResolver;

/// Reads host items as descriptors.
pub trait ItemSource {
    /// Host-specific item handle (slot index, inventory reference, ...).
    type Handle;

    /// Describe the item behind `handle`.
    ///
    /// Missing or empty items must come back as [`ItemDescriptor::empty`].
    fn snapshot(&self, handle: &Self::Handle) -> ItemDescriptor;
}

/// Writes fusion outcomes back to the host.
pub trait OutcomeSink {
    /// Host-specific output slot handle.
    type Slot;

    /// Show the result and price of `outcome`, or clear both when it is
    /// unavailable.
    fn apply(&mut self, slot: &Self::Slot, outcome: &FusionOutcome);
}

/// One anvil interaction: read both inputs, resolve against the current
/// rules, and hand the outcome to the sink.
#[allow(clippy::too_many_arguments)]
pub fn fuse_slots<S, K>(
    resolver: &FusionResolver,
    store: &RuleStore,
    source: &S,
    left: &S::Handle,
    right: &S::Handle,
    rename: Option<&str>,
    sink: &mut K,
    slot: &K::Slot,
) -> FusionOutcome
where
    S: ItemSource,
    K: OutcomeSink,
{
    let rules = store.load();
    let left = source.snapshot(left);
    let right = source.snapshot(right);
    let outcome = resolver.resolve(&left, &right, rename, &rules);
    sink.apply(slot, &outcome);
    outcome
}
