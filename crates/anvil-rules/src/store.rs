//! Atomically swapped holder for the active rule snapshot.
//!
//! Readers call [`RuleStore::load`] and keep the returned `Arc` for the
//! duration of one fusion; they never block and never observe a partially
//! applied edit. Writers are serialized by a mutex, build a complete new
//! snapshot, and publish it with a single pointer swap.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anvil_types::MaterialId;
use arc_swap::ArcSwap;

use crate::error::{Result, RuleError};
use crate::file::{MaterialSpec, RuleFile};
use crate::snapshot::RuleSnapshot;

/// Holder of the current [`RuleSnapshot`].
pub struct RuleStore {
    current: ArcSwap<RuleSnapshot>,
    writer: Mutex<()>,
}

impl RuleStore {
    pub fn new(snapshot: RuleSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            writer: Mutex::new(()),
        }
    }

    /// Create a store from a rule file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(RuleFile::load(path)?.compile()?))
    }

    /// The snapshot in effect right now.
    pub fn load(&self) -> Arc<RuleSnapshot> {
        self.current.load_full()
    }

    /// Publish `snapshot`, returning the one it replaced.
    pub fn replace(&self, snapshot: RuleSnapshot) -> Result<Arc<RuleSnapshot>> {
        let _guard = self.lock()?;
        Ok(self.publish(snapshot))
    }

    /// Re-read a rule file and publish it. On any error the current
    /// snapshot stays in effect.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<Arc<RuleSnapshot>> {
        let snapshot = RuleFile::load(path)?.compile()?;
        let _guard = self.lock()?;
        self.publish(snapshot);
        Ok(self.load())
    }

    /// Add or replace the rule for one material.
    pub fn upsert_material(&self, spec: MaterialSpec) -> Result<Arc<RuleSnapshot>> {
        self.edit(|rules| {
            rules.upsert_material(spec);
            true
        })
        .map(|(snapshot, _)| snapshot)
    }

    /// Remove the rule for one material. Returns `false` if there was none,
    /// in which case nothing is published.
    pub fn remove_material(&self, material: &MaterialId) -> Result<bool> {
        self.edit(|rules| rules.remove_material(material))
            .map(|(_, changed)| changed)
    }

    /// Apply `change` to a copy of the current rule file, then compile and
    /// publish it if `change` reports a modification.
    fn edit<F>(&self, change: F) -> Result<(Arc<RuleSnapshot>, bool)>
    where
        F: FnOnce(&mut RuleFile) -> bool,
    {
        let _guard = self.lock()?;
        let current = self.current.load_full();
        let mut rules = current.source().clone();
        if !change(&mut rules) {
            return Ok((current, false));
        }
        let snapshot = rules.compile()?;
        self.publish(snapshot);
        Ok((self.current.load_full(), true))
    }

    fn publish(&self, snapshot: RuleSnapshot) -> Arc<RuleSnapshot> {
        let fingerprint = snapshot.fingerprint();
        let previous = self.current.swap(Arc::new(snapshot));
        tracing::info!(
            from = %previous.fingerprint(),
            to = %fingerprint,
            "rule snapshot swapped"
        );
        previous
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|e| RuleError::Lock(e.to_string()))
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new(RuleSnapshot::empty())
    }
}
