//! Empire engine — per-tick state advancement and all player-initiated
//! empire mutations.
//!
//! Every operation is a plain function over `&mut Empire`; precondition
//! failures return an error value and leave the empire untouched. The
//! per-tick `step` progresses only the queued build/research item;
//! installed-but-unqueued items never advance.

use hexfort_types::config::GameConfig;
use hexfort_types::effect::{self, ResourceMap};
use hexfort_types::empire::{Citizens, Empire, Structure, TileKind};
use hexfort_types::{HexCoord, ItemDef, ItemId, ItemKind, Sid};

use hexfort_data::ItemCatalog;

// =============================================================================
// Errors
// =============================================================================

/// Precondition failures for empire operations.
#[derive(Debug, Clone, PartialEq)]
pub enum EmpireError {
    UnknownItem(ItemId),
    RequirementsNotMet(ItemId),
    AlreadyStarted(ItemId),
    BuildQueueBusy,
    ResearchQueueBusy,
    NotEnough(String),
    NotBuildableHere,
    TileOccupied,
    NotAStructure(ItemId),
    NotBuildable(ItemId),
    UnknownStructure(Sid),
    NotEnoughCitizens,
    LifeAlreadyFull,
}

impl std::fmt::Display for EmpireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownItem(iid) => write!(f, "Unknown item {iid}"),
            Self::RequirementsNotMet(iid) => write!(f, "Requirements not met for {iid}"),
            Self::AlreadyStarted(iid) => write!(f, "Item {iid} already started or completed"),
            Self::BuildQueueBusy => write!(f, "Build queue busy"),
            Self::ResearchQueueBusy => write!(f, "Research queue busy"),
            Self::NotEnough(resource) => write!(f, "Not enough {resource}"),
            Self::NotBuildableHere => write!(f, "Hex is not owned or not buildable"),
            Self::TileOccupied => write!(f, "Hex is already occupied"),
            Self::NotAStructure(iid) => write!(f, "Item {iid} is not a structure"),
            Self::NotBuildable(iid) => write!(f, "Item {iid} cannot be built"),
            Self::UnknownStructure(sid) => write!(f, "Unknown structure {sid}"),
            Self::NotEnoughCitizens => write!(f, "Not enough citizens"),
            Self::LifeAlreadyFull => write!(f, "Life already full"),
        }
    }
}

// =============================================================================
// Tick
// =============================================================================

/// Advance one empire by `dt` seconds. Returns the iids completed this
/// tick (at most one building and one knowledge).
pub fn step(catalog: &ItemCatalog, config: &GameConfig, empire: &mut Empire, dt: f64) -> Vec<ItemId> {
    generate_resources(config, empire, dt);
    let mut completed = Vec::new();
    if let Some(iid) = progress_build(empire, dt) {
        completed.push(iid);
    }
    if let Some(iid) = progress_research(config, empire, dt) {
        completed.push(iid);
    }
    if !completed.is_empty() {
        recalculate_effects(catalog, empire);
    }
    completed
}

/// Generate gold and culture. Life is never passively generated.
///
/// rate = (base + offset) × (1 + citizens × CITIZEN_EFFECT + modifier)
fn generate_resources(config: &GameConfig, empire: &mut Empire, dt: f64) {
    let gold_rate = (config.base_gold_per_sec + empire.effect(effect::GOLD_OFFSET))
        * (1.0
            + empire.citizens.merchant as f64 * config.citizen_effect
            + empire.effect(effect::GOLD_MODIFIER));
    let culture_rate = (config.base_culture_per_sec + empire.effect(effect::CULTURE_OFFSET))
        * (1.0
            + empire.citizens.artist as f64 * config.citizen_effect
            + empire.effect(effect::CULTURE_MODIFIER));

    *empire
        .resources
        .entry(effect::RES_GOLD.to_string())
        .or_insert(0.0) += gold_rate * dt;
    *empire
        .resources
        .entry(effect::RES_CULTURE.to_string())
        .or_insert(0.0) += culture_rate * dt;
}

/// Tick the active build item. Returns the iid if it completed.
fn progress_build(empire: &mut Empire, dt: f64) -> Option<ItemId> {
    let iid = empire.build_queue.clone()?;
    let speed = 1.0 + empire.effect(effect::BUILD_SPEED_MODIFIER);
    let remaining = empire.buildings.get_mut(&iid)?;
    if *remaining <= 0.0 {
        // Already done (restored state); just release the queue.
        empire.build_queue = None;
        return None;
    }
    *remaining -= dt * speed;
    if *remaining <= 0.0 {
        *remaining = 0.0;
        empire.build_queue = None;
        return Some(iid);
    }
    None
}

/// Tick the active research item. Scientists speed research up.
fn progress_research(config: &GameConfig, empire: &mut Empire, dt: f64) -> Option<ItemId> {
    let iid = empire.research_queue.clone()?;
    let speed = 1.0
        + empire.citizens.scientist as f64 * config.citizen_effect
        + empire.effect(effect::RESEARCH_SPEED_MODIFIER);
    let remaining = empire.knowledge.get_mut(&iid)?;
    if *remaining <= 0.0 {
        empire.research_queue = None;
        return None;
    }
    *remaining -= dt * speed;
    if *remaining <= 0.0 {
        *remaining = 0.0;
        empire.research_queue = None;
        return Some(iid);
    }
    None
}

// =============================================================================
// Effects
// =============================================================================

/// Rebuild the aggregated effect map from scratch: completed buildings,
/// completed knowledge, and held artefacts. In-progress items contribute
/// nothing.
pub fn recalculate_effects(catalog: &ItemCatalog, empire: &mut Empire) {
    let mut effects = hexfort_types::EffectMap::new();
    let completed = empire
        .buildings
        .iter()
        .chain(empire.knowledge.iter())
        .filter(|(_, remaining)| **remaining == 0.0)
        .map(|(iid, _)| iid.clone());
    for iid in completed.chain(empire.artefacts.iter().cloned()) {
        if let Some(item) = catalog.get(&iid) {
            for (key, value) in &item.effects {
                *effects.entry(key.clone()).or_insert(0.0) += value;
            }
        }
    }
    empire.effects = effects;
}

// =============================================================================
// Build / research
// =============================================================================

/// Outcome of a successful `build_item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Installed and progressing in its queue.
    Queued,
    /// Zero-effort item: completed synchronously, queue untouched.
    CompletedInstantly,
}

/// Start building or researching an item.
///
/// Preconditions are checked in order: the item exists and is buildable,
/// its requirements are met against the completed set, it has not been
/// started before, the matching queue is free, and the cost is covered.
/// Any failure leaves the empire unchanged.
pub fn build_item(
    catalog: &ItemCatalog,
    empire: &mut Empire,
    iid: &ItemId,
) -> Result<BuildOutcome, EmpireError> {
    let item = catalog
        .get(iid)
        .ok_or_else(|| EmpireError::UnknownItem(iid.clone()))?;
    let is_research = match item.kind {
        ItemKind::Building | ItemKind::Wonder => false,
        ItemKind::Knowledge => true,
        _ => return Err(EmpireError::NotBuildable(iid.clone())),
    };

    if !catalog.requirements_met(iid, &empire.completed_items()) {
        return Err(EmpireError::RequirementsNotMet(iid.clone()));
    }
    if empire.has_item(iid) {
        return Err(EmpireError::AlreadyStarted(iid.clone()));
    }
    if item.effort > 0.0 {
        if is_research && empire.research_queue.is_some() {
            return Err(EmpireError::ResearchQueueBusy);
        }
        if !is_research && empire.build_queue.is_some() {
            return Err(EmpireError::BuildQueueBusy);
        }
    }
    spend(empire, &item.costs)?;

    if is_research {
        empire.knowledge.insert(iid.clone(), item.effort);
        if item.effort > 0.0 {
            empire.research_queue = Some(iid.clone());
        }
    } else {
        empire.buildings.insert(iid.clone(), item.effort);
        if item.effort > 0.0 {
            empire.build_queue = Some(iid.clone());
        }
    }

    if item.effort == 0.0 {
        recalculate_effects(catalog, empire);
        Ok(BuildOutcome::CompletedInstantly)
    } else {
        Ok(BuildOutcome::Queued)
    }
}

/// Check every cost entry, then deduct them all. All-or-nothing.
fn spend(empire: &mut Empire, costs: &ResourceMap) -> Result<(), EmpireError> {
    for (resource, amount) in costs {
        if empire.resource(resource) < *amount {
            return Err(EmpireError::NotEnough(resource.clone()));
        }
    }
    for (resource, amount) in costs {
        *empire.resources.entry(resource.clone()).or_insert(0.0) -= amount;
    }
    Ok(())
}

// =============================================================================
// Structures
// =============================================================================

/// Place a defensive structure on an owned buildable tile.
pub fn place_structure(
    catalog: &ItemCatalog,
    empire: &mut Empire,
    iid: &ItemId,
    position: HexCoord,
) -> Result<Sid, EmpireError> {
    let item = catalog
        .get(iid)
        .ok_or_else(|| EmpireError::UnknownItem(iid.clone()))?;
    if item.kind != ItemKind::Structure {
        return Err(EmpireError::NotAStructure(iid.clone()));
    }
    if !catalog.requirements_met(iid, &empire.completed_items()) {
        return Err(EmpireError::RequirementsNotMet(iid.clone()));
    }
    if empire.tile_at(position) != Some(TileKind::Buildable) {
        return Err(EmpireError::NotBuildableHere);
    }
    if empire.structures.values().any(|s| s.position == position) {
        return Err(EmpireError::TileOccupied);
    }
    spend(empire, &item.costs)?;

    let sid = empire.next_sid;
    empire.next_sid += 1;
    empire.structures.insert(sid, structure_from_item(sid, item, position));
    Ok(sid)
}

/// Copy the numeric stats of a catalogue item into a placed structure.
pub fn structure_from_item(sid: Sid, item: &ItemDef, position: HexCoord) -> Structure {
    Structure {
        sid,
        iid: item.iid.clone(),
        position,
        damage: item.damage,
        range: item.range,
        reload_time_ms: item.reload_time_ms,
        shot_speed: item.shot_speed,
        shot_kind: item.shot_kind,
        effects: item.effects.clone(),
        focus_cid: None,
        reload_remaining_ms: 0.0,
    }
}

/// Remove a structure, refunding a configured fraction of its cost.
pub fn remove_structure(
    catalog: &ItemCatalog,
    config: &GameConfig,
    empire: &mut Empire,
    sid: Sid,
) -> Result<(), EmpireError> {
    let structure = empire
        .structures
        .remove(&sid)
        .ok_or(EmpireError::UnknownStructure(sid))?;
    for (resource, amount) in catalog.costs(&structure.iid) {
        *empire.resources.entry(resource).or_insert(0.0) += amount * config.structure_refund;
    }
    Ok(())
}

/// Upgrade a structure in place: pay the item cost again for sharper stats.
pub fn upgrade_structure(
    catalog: &ItemCatalog,
    empire: &mut Empire,
    sid: Sid,
) -> Result<(), EmpireError> {
    let iid = empire
        .structures
        .get(&sid)
        .map(|s| s.iid.clone())
        .ok_or(EmpireError::UnknownStructure(sid))?;
    let costs = catalog.costs(&iid);
    spend(empire, &costs)?;
    let structure = empire
        .structures
        .get_mut(&sid)
        .ok_or(EmpireError::UnknownStructure(sid))?;
    structure.damage *= 1.25;
    structure.reload_time_ms *= 0.9;
    Ok(())
}

// =============================================================================
// Citizens & life
// =============================================================================

/// Buy one untyped citizen. The price scales linearly with the total.
pub fn upgrade_citizen(config: &GameConfig, empire: &mut Empire) -> Result<u32, EmpireError> {
    let cost = config.citizen_base_cost * (empire.total_citizens + 1) as f64;
    if empire.resource(effect::RES_GOLD) < cost {
        return Err(EmpireError::NotEnough(effect::RES_GOLD.to_string()));
    }
    *empire
        .resources
        .entry(effect::RES_GOLD.to_string())
        .or_insert(0.0) -= cost;
    empire.total_citizens += 1;
    Ok(empire.total_citizens)
}

/// Reassign citizen roles. The role sum may not exceed the total.
pub fn change_citizens(empire: &mut Empire, distribution: Citizens) -> Result<(), EmpireError> {
    if distribution.assigned() > empire.total_citizens {
        return Err(EmpireError::NotEnoughCitizens);
    }
    empire.citizens = distribution;
    Ok(())
}

/// Pay gold to restore one life point, capped at max_life.
pub fn increase_life(config: &GameConfig, empire: &mut Empire) -> Result<f64, EmpireError> {
    if empire.life() >= empire.max_life {
        return Err(EmpireError::LifeAlreadyFull);
    }
    if empire.resource(effect::RES_GOLD) < config.life_cost {
        return Err(EmpireError::NotEnough(effect::RES_GOLD.to_string()));
    }
    *empire
        .resources
        .entry(effect::RES_GOLD.to_string())
        .or_insert(0.0) -= config.life_cost;
    let max_life = empire.max_life;
    let life = empire
        .resources
        .entry(effect::RES_LIFE.to_string())
        .or_insert(0.0);
    *life = (*life + 1.0).min(max_life);
    Ok(*life)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ItemCatalog {
        ItemCatalog::builtin()
    }

    fn config() -> GameConfig {
        GameConfig::default()
    }

    fn empire_with_init() -> Empire {
        let mut empire = Empire::new(1, "Test");
        empire.resources.insert("gold".into(), 500.0);
        empire.resources.insert("culture".into(), 200.0);
        empire.buildings.insert("INIT".into(), 0.0);
        empire
    }

    // -- build_item -------------------------------------------------------

    #[test]
    fn build_with_requirements_met() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        let outcome = build_item(&catalog, &mut empire, &"FIRE_PLACE".into()).unwrap();
        assert_eq!(outcome, BuildOutcome::Queued);
        assert_eq!(empire.buildings[&ItemId::from("FIRE_PLACE")], 20.0);
        assert_eq!(empire.build_queue, Some("FIRE_PLACE".into()));
        assert_eq!(empire.resource("gold"), 480.0);
    }

    #[test]
    fn build_with_requirements_not_met() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        let err = build_item(&catalog, &mut empire, &"MAIN_HOUSE".into()).unwrap_err();
        assert!(err.to_string().contains("Requirements not met"));
        assert!(!empire.buildings.contains_key(&ItemId::from("MAIN_HOUSE")));
        assert_eq!(empire.resource("gold"), 500.0);
    }

    #[test]
    fn in_progress_requirement_does_not_count() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        empire.buildings.insert("FIRE_PLACE".into(), 10.0);
        let err = build_item(&catalog, &mut empire, &"HUNTING".into()).unwrap_err();
        assert!(err.to_string().contains("Requirements not met"));
    }

    #[test]
    fn research_goes_to_research_queue() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        empire.buildings.insert("FIRE_PLACE".into(), 0.0);
        build_item(&catalog, &mut empire, &"HUNTING".into()).unwrap();
        assert_eq!(empire.research_queue, Some("HUNTING".into()));
        assert!(empire.knowledge.contains_key(&ItemId::from("HUNTING")));
        assert!(empire.build_queue.is_none());
    }

    #[test]
    fn duplicate_item_rejected() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        let err = build_item(&catalog, &mut empire, &"INIT".into()).unwrap_err();
        assert!(err.to_string().contains("already"));
    }

    #[test]
    fn queue_busy_rejected() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        build_item(&catalog, &mut empire, &"FIRE_PLACE".into()).unwrap();
        // Force-complete for requirements, but leave the queue occupied.
        empire.buildings.insert("FIRE_PLACE".into(), 0.0);
        let err = build_item(&catalog, &mut empire, &"MAIN_HOUSE".into()).unwrap_err();
        assert!(err.to_string().contains("busy"));
    }

    #[test]
    fn insufficient_resources_leave_state_unchanged() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        empire.buildings.insert("FIRE_PLACE".into(), 0.0);
        empire.resources.insert("gold".into(), 10.0);
        let before = empire.clone();
        let err = build_item(&catalog, &mut empire, &"MAIN_HOUSE".into()).unwrap_err();
        assert!(err.to_string().contains("Not enough"));
        assert_eq!(empire.resources, before.resources);
        assert_eq!(empire.buildings, before.buildings);
        assert_eq!(empire.build_queue, before.build_queue);
        assert_eq!(empire.research_queue, before.research_queue);
    }

    #[test]
    fn zero_effort_item_completes_instantly() {
        let catalog = catalog();
        let mut empire = Empire::new(2, "Fresh");
        let outcome = build_item(&catalog, &mut empire, &"INIT".into()).unwrap();
        assert_eq!(outcome, BuildOutcome::CompletedInstantly);
        assert_eq!(empire.buildings[&ItemId::from("INIT")], 0.0);
        assert!(empire.build_queue.is_none());
    }

    // -- tick -------------------------------------------------------------

    #[test]
    fn only_queued_building_progresses() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_init();
        empire.buildings.insert("FIRE_PLACE".into(), 5.0);
        empire.buildings.insert("SHRINE".into(), 3.0);
        empire.build_queue = Some("FIRE_PLACE".into());

        step(&catalog, &config, &mut empire, 2.0);

        assert_eq!(empire.buildings[&ItemId::from("FIRE_PLACE")], 3.0);
        assert_eq!(empire.buildings[&ItemId::from("SHRINE")], 3.0);
    }

    #[test]
    fn building_completes_clears_queue_and_applies_effects() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_init();
        empire.buildings.insert("FIRE_PLACE".into(), 1.0);
        empire.build_queue = Some("FIRE_PLACE".into());

        let completed = step(&catalog, &config, &mut empire, 2.0);

        assert_eq!(completed, vec![ItemId::from("FIRE_PLACE")]);
        assert_eq!(empire.buildings[&ItemId::from("FIRE_PLACE")], 0.0);
        assert!(empire.build_queue.is_none());
        // FIRE_PLACE grants gold_offset 0.1 once complete.
        assert_eq!(empire.effect(effect::GOLD_OFFSET), 0.1);
    }

    #[test]
    fn scientists_speed_research() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_init();
        empire.knowledge.insert("HUNTING".into(), 10.0);
        empire.research_queue = Some("HUNTING".into());
        empire.total_citizens = 10;
        empire.citizens.scientist = 10;

        step(&catalog, &config, &mut empire, 1.0);

        let expected = 10.0 - (1.0 + 10.0 * config.citizen_effect);
        assert!((empire.knowledge[&ItemId::from("HUNTING")] - expected).abs() < 1e-9);
    }

    #[test]
    fn resource_generation_formula() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_init();
        empire.resources.insert("gold".into(), 0.0);
        empire.total_citizens = 4;
        empire.citizens.merchant = 4;
        empire.effects.insert(effect::GOLD_OFFSET.into(), 0.1);
        empire.effects.insert(effect::GOLD_MODIFIER.into(), 0.2);

        step(&catalog, &config, &mut empire, 10.0);

        let rate = (1.0 + 0.1) * (1.0 + 4.0 * 0.03 + 0.2);
        assert!((empire.resource("gold") - rate * 10.0).abs() < 1e-4);
    }

    #[test]
    fn life_is_not_passively_generated() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_init();
        let life_before = empire.life();
        step(&catalog, &config, &mut empire, 60.0);
        assert_eq!(empire.life(), life_before);
    }

    // -- effects ----------------------------------------------------------

    #[test]
    fn incomplete_building_contributes_no_effects() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        empire.buildings.insert("FIRE_PLACE".into(), 10.0);
        recalculate_effects(&catalog, &mut empire);
        assert_eq!(empire.effect(effect::GOLD_OFFSET), 0.0);

        empire.buildings.insert("FIRE_PLACE".into(), 0.0);
        recalculate_effects(&catalog, &mut empire);
        assert_eq!(empire.effect(effect::GOLD_OFFSET), 0.1);
    }

    #[test]
    fn effects_accumulate_across_completed_items() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        empire.buildings.insert("FIRE_PLACE".into(), 0.0);
        empire.buildings.insert("EXCHANGE_POST".into(), 0.0);
        recalculate_effects(&catalog, &mut empire);
        // FIRE_PLACE 0.1 + EXCHANGE_POST 0.05
        assert!((empire.effect(effect::GOLD_OFFSET) - 0.15).abs() < 1e-9);
        assert!((empire.effect(effect::GOLD_MODIFIER) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn artefacts_contribute_effects() {
        let catalog = catalog();
        let mut empire = empire_with_init();
        empire.artefacts.push("GOLDEN_IDOL".into());
        recalculate_effects(&catalog, &mut empire);
        assert_eq!(empire.effect(effect::GOLD_MODIFIER), 0.2);
    }

    // -- structures -------------------------------------------------------

    fn empire_with_map() -> Empire {
        let mut empire = empire_with_init();
        empire.hex_map = hexfort_data::maps::starter_hex_map();
        empire.buildings.insert("FIRE_PLACE".into(), 0.0);
        empire.knowledge.insert("HUNTING".into(), 0.0);
        empire.knowledge.insert("ARCHERY".into(), 0.0);
        empire
    }

    #[test]
    fn place_structure_on_buildable_tile() {
        let catalog = catalog();
        let mut empire = empire_with_map();
        let sid =
            place_structure(&catalog, &mut empire, &"ARROW_TOWER".into(), HexCoord::new(0, 1))
                .unwrap();
        let s = &empire.structures[&sid];
        assert_eq!(s.damage, 1.0);
        assert_eq!(s.range, 2);
        assert_eq!(empire.resource("gold"), 400.0);
    }

    #[test]
    fn place_structure_rejects_path_tiles_and_overlap() {
        let catalog = catalog();
        let mut empire = empire_with_map();
        let err = place_structure(&catalog, &mut empire, &"ARROW_TOWER".into(), HexCoord::new(0, 0))
            .unwrap_err();
        assert_eq!(err, EmpireError::NotBuildableHere);

        place_structure(&catalog, &mut empire, &"ARROW_TOWER".into(), HexCoord::new(0, 1)).unwrap();
        let err = place_structure(&catalog, &mut empire, &"ARROW_TOWER".into(), HexCoord::new(0, 1))
            .unwrap_err();
        assert_eq!(err, EmpireError::TileOccupied);
    }

    #[test]
    fn remove_structure_refunds_fraction() {
        let catalog = catalog();
        let config = config();
        let mut empire = empire_with_map();
        let sid =
            place_structure(&catalog, &mut empire, &"ARROW_TOWER".into(), HexCoord::new(0, 1))
                .unwrap();
        let gold_after_placing = empire.resource("gold");
        remove_structure(&catalog, &config, &mut empire, sid).unwrap();
        assert!(empire.structures.is_empty());
        assert_eq!(empire.resource("gold"), gold_after_placing + 50.0);
    }

    // -- citizens & life --------------------------------------------------

    #[test]
    fn citizen_cost_scales() {
        let config = config();
        let mut empire = empire_with_init();
        empire.resources.insert("gold".into(), 300.0);
        upgrade_citizen(&config, &mut empire).unwrap();
        assert_eq!(empire.resource("gold"), 200.0);
        upgrade_citizen(&config, &mut empire).unwrap();
        assert_eq!(empire.resource("gold"), 0.0);
        assert!(upgrade_citizen(&config, &mut empire).is_err());
        assert_eq!(empire.total_citizens, 2);
    }

    #[test]
    fn change_citizens_respects_total() {
        let mut empire = empire_with_init();
        empire.total_citizens = 3;
        let ok = Citizens {
            merchant: 2,
            scientist: 1,
            artist: 0,
        };
        change_citizens(&mut empire, ok).unwrap();
        let too_many = Citizens {
            merchant: 2,
            scientist: 2,
            artist: 0,
        };
        assert!(change_citizens(&mut empire, too_many).is_err());
        assert_eq!(empire.citizens, ok);
    }

    #[test]
    fn increase_life_caps_at_max() {
        let config = config();
        let mut empire = empire_with_init();
        empire.resources.insert("life".into(), 9.5);
        increase_life(&config, &mut empire).unwrap();
        assert_eq!(empire.life(), 10.0);
        assert!(increase_life(&config, &mut empire).is_err());
    }
}
