//! Item catalogue — read-only tech tree database.
//!
//! Constructed once from a list of definitions, immutable thereafter, so
//! every component reads it lock-free. Cost and effect maps are handed out
//! as clones; callers can never mutate the catalogue through a lookup.

use std::collections::{BTreeMap, BTreeSet};

use hexfort_types::effect::ResourceMap;
use hexfort_types::{EffectMap, ItemDef, ItemId, ItemKind};

/// Read-only catalogue of every game item, keyed by iid.
#[derive(Debug, Clone)]
pub struct ItemCatalog {
    items: BTreeMap<ItemId, ItemDef>,
}

impl ItemCatalog {
    pub fn new(defs: Vec<ItemDef>) -> Self {
        let items = defs.into_iter().map(|d| (d.iid.clone(), d)).collect();
        Self { items }
    }

    /// The built-in catalogue.
    pub fn builtin() -> Self {
        Self::new(crate::items::all_items())
    }

    pub fn get(&self, iid: &ItemId) -> Option<&ItemDef> {
        self.items.get(iid)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.values()
    }

    /// All items of one kind, in iid order.
    pub fn of_kind(&self, kind: ItemKind) -> Vec<&ItemDef> {
        self.items.values().filter(|i| i.kind == kind).collect()
    }

    /// Whether every prerequisite of `iid` is in `completed`.
    /// Unknown items never have their requirements met.
    pub fn requirements_met(&self, iid: &ItemId, completed: &BTreeSet<ItemId>) -> bool {
        match self.items.get(iid) {
            Some(item) => item.requirements.iter().all(|req| completed.contains(req)),
            None => false,
        }
    }

    /// All items of `kind` whose requirements are satisfied by `completed`.
    pub fn available_of_kind(&self, kind: ItemKind, completed: &BTreeSet<ItemId>) -> Vec<&ItemDef> {
        self.items
            .values()
            .filter(|i| i.kind == kind)
            .filter(|i| i.requirements.iter().all(|req| completed.contains(req)))
            .collect()
    }

    /// Every critter whose requirements are satisfied by `completed`.
    pub fn available_critters(&self, completed: &BTreeSet<ItemId>) -> Vec<&ItemDef> {
        self.available_of_kind(ItemKind::Critter, completed)
    }

    /// Defensive copy of an item's cost map.
    pub fn costs(&self, iid: &ItemId) -> ResourceMap {
        self.items
            .get(iid)
            .map(|i| i.costs.clone())
            .unwrap_or_default()
    }

    /// Defensive copy of an item's effect map.
    pub fn effects(&self, iid: &ItemId) -> EffectMap {
        self.items
            .get(iid)
            .map(|i| i.effects.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(iids: &[&str]) -> BTreeSet<ItemId> {
        iids.iter().map(|s| ItemId::from(*s)).collect()
    }

    #[test]
    fn builtin_catalogue_loads() {
        let catalog = ItemCatalog::builtin();
        assert!(!catalog.is_empty());
        assert!(catalog.get(&ItemId::from("INIT")).is_some());
    }

    #[test]
    fn requirement_graph_is_a_dag_rooted_at_init() {
        let catalog = ItemCatalog::builtin();
        // Every requirement must exist, and walking requirements from any
        // item must terminate (no cycles) at INIT.
        for item in catalog.iter() {
            let mut frontier = item.requirements.clone();
            let mut seen = BTreeSet::new();
            let mut steps = 0;
            while let Some(req) = frontier.pop() {
                assert!(
                    catalog.get(&req).is_some(),
                    "{} requires unknown item {}",
                    item.iid,
                    req
                );
                if seen.insert(req.clone()) {
                    frontier.extend(catalog.get(&req).unwrap().requirements.clone());
                }
                steps += 1;
                assert!(steps < 10_000, "requirement cycle involving {}", item.iid);
            }
            if !item.requirements.is_empty() {
                assert!(
                    seen.contains(&ItemId::from("INIT")),
                    "{} does not bottom out at INIT",
                    item.iid
                );
            }
        }
    }

    #[test]
    fn requirements_met_checks_all_prereqs() {
        let catalog = ItemCatalog::builtin();
        let fire_place = ItemId::from("FIRE_PLACE");
        assert!(!catalog.requirements_met(&fire_place, &completed(&[])));
        assert!(catalog.requirements_met(&fire_place, &completed(&["INIT"])));
    }

    #[test]
    fn unknown_item_never_available() {
        let catalog = ItemCatalog::builtin();
        assert!(!catalog.requirements_met(&ItemId::from("NO_SUCH"), &completed(&["INIT"])));
    }

    #[test]
    fn available_critters_respects_tech_tree() {
        let catalog = ItemCatalog::builtin();
        let none = catalog.available_critters(&completed(&[]));
        let some = catalog.available_critters(&completed(&["INIT", "FIRE_PLACE", "HUNTING"]));
        assert!(some.len() > none.len());
        for c in some {
            assert_eq!(c.kind, ItemKind::Critter);
        }
    }

    #[test]
    fn cost_lookup_is_a_copy() {
        let catalog = ItemCatalog::builtin();
        let mut costs = catalog.costs(&ItemId::from("MAIN_HOUSE"));
        costs.insert("gold".into(), 0.0);
        // A second lookup is untouched by the mutation above.
        let fresh = catalog.costs(&ItemId::from("MAIN_HOUSE"));
        assert_ne!(fresh.get("gold"), Some(&0.0));
    }
}
