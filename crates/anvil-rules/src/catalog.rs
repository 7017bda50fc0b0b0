//! Lazily built, per-material views of the repair policy.
//!
//! Views are constructed the first time a material is asked for and reused
//! until a snapshot with a different fingerprint is presented, at which
//! point the whole memo is dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anvil_types::{MaterialId, RulesFingerprint};

use crate::error::{Result, RuleError};
use crate::names::title_case;
use crate::snapshot::RuleSnapshot;

/// Presentation of one repair material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialView {
    pub material: MaterialId,
    /// Human readable label, e.g. `"Repaired by Diamond"`.
    pub label: String,
    pub repair_strength: u32,
    pub repairable_count: usize,
    /// Item materials repaired, with the strength applied to each.
    pub repairs: Vec<(MaterialId, u32)>,
}

#[derive(Default)]
struct Memo {
    fingerprint: Option<RulesFingerprint>,
    views: BTreeMap<MaterialId, Arc<MaterialView>>,
    builds: usize,
}

/// Memo map of [`MaterialView`]s keyed by material.
#[derive(Default)]
pub struct MaterialCatalog {
    memo: Mutex<Memo>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// View of `material` under `snapshot`, or `None` if the material has no
    /// rule there.
    pub fn view(
        &self,
        snapshot: &RuleSnapshot,
        material: &MaterialId,
    ) -> Result<Option<Arc<MaterialView>>> {
        let mut memo = self
            .memo
            .lock()
            .map_err(|e| RuleError::Lock(e.to_string()))?;

        let fingerprint = snapshot.fingerprint();
        if memo.fingerprint != Some(fingerprint) {
            tracing::debug!(fingerprint = %fingerprint, "material catalog invalidated");
            memo.views.clear();
            memo.fingerprint = Some(fingerprint);
        }

        if let Some(view) = memo.views.get(material) {
            return Ok(Some(Arc::clone(view)));
        }
        let Some(view) = build_view(snapshot, material) else {
            return Ok(None);
        };
        let view = Arc::new(view);
        memo.builds += 1;
        memo.views.insert(material.clone(), Arc::clone(&view));
        Ok(Some(view))
    }

    /// Views of every repair material in `snapshot`, in material order.
    pub fn repair_materials(&self, snapshot: &RuleSnapshot) -> Result<Vec<Arc<MaterialView>>> {
        let mut out = Vec::new();
        for rule in snapshot.materials().repair_materials() {
            if let Some(view) = self.view(snapshot, &rule.material)? {
                out.push(view);
            }
        }
        Ok(out)
    }

    /// Number of views constructed since creation.
    pub fn builds(&self) -> usize {
        self.memo.lock().map(|m| m.builds).unwrap_or(0)
    }
}

fn build_view(snapshot: &RuleSnapshot, material: &MaterialId) -> Option<MaterialView> {
    let rule = snapshot.materials().get(material)?;
    let mut repairs: BTreeMap<MaterialId, u32> = BTreeMap::new();
    for item in rule.repairs.iter().chain(rule.strength_overrides.keys()) {
        if let Some(strength) = rule.strength_for(item) {
            repairs.insert(item.clone(), strength);
        }
    }
    Some(MaterialView {
        material: material.clone(),
        label: format!("Repaired by {}", title_case(material.as_str())),
        repair_strength: rule.repair_strength,
        repairable_count: rule.repairable_count(),
        repairs: repairs.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::MaterialSpec;

    fn m(raw: &str) -> MaterialId {
        MaterialId::new(raw)
    }

    #[test]
    fn builds_view_on_demand() {
        let snap = RuleSnapshot::vanilla().unwrap();
        let catalog = MaterialCatalog::new();
        assert_eq!(catalog.builds(), 0);

        let view = catalog.view(&snap, &m("diamond")).unwrap().unwrap();
        assert_eq!(view.label, "Repaired by Diamond");
        assert!(view.repairs.iter().any(|(item, _)| item == &m("diamond_sword")));
        assert_eq!(catalog.builds(), 1);
    }

    #[test]
    fn repeated_lookups_reuse_view() {
        let snap = RuleSnapshot::vanilla().unwrap();
        let catalog = MaterialCatalog::new();
        let a = catalog.view(&snap, &m("iron_ingot")).unwrap().unwrap();
        let b = catalog.view(&snap, &m("iron_ingot")).unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(catalog.builds(), 1);
    }

    #[test]
    fn unknown_material_has_no_view() {
        let snap = RuleSnapshot::vanilla().unwrap();
        let catalog = MaterialCatalog::new();
        assert!(catalog.view(&snap, &m("stick")).unwrap().is_none());
        assert_eq!(catalog.builds(), 0);
    }

    #[test]
    fn new_fingerprint_invalidates() {
        let snap = RuleSnapshot::vanilla().unwrap();
        let catalog = MaterialCatalog::new();
        catalog.view(&snap, &m("diamond")).unwrap();

        let mut rules = snap.source().clone();
        let mut spec = MaterialSpec::new("diamond");
        spec.repair_strength = 1;
        spec.repairs = vec![m("diamond_sword")];
        rules.upsert_material(spec);
        let edited = rules.compile().unwrap();

        let view = catalog.view(&edited, &m("diamond")).unwrap().unwrap();
        assert_eq!(view.repair_strength, 1);
        assert_eq!(view.repairs, vec![(m("diamond_sword"), 1)]);
        assert_eq!(catalog.builds(), 2);
    }

    #[test]
    fn lists_repair_materials() {
        let snap = RuleSnapshot::vanilla().unwrap();
        let catalog = MaterialCatalog::new();
        let views = catalog.repair_materials(&snap).unwrap();
        assert!(views.iter().any(|v| v.material == m("netherite_ingot")));
        assert!(views.windows(2).all(|w| w[0].material < w[1].material));
    }
}
