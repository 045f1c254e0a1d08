//! Built-in item catalogue — the default tech tree, towers, critters,
//! artefacts and wonder.
//!
//! The requirement graph is a DAG rooted at `INIT`, the zero-effort
//! bootstrap building every empire completes at creation.

use hexfort_types::effect::{self, ResourceMap};
use hexfort_types::{EffectMap, ItemDef, ItemKind, ShotKind};

fn res(entries: &[(&str, f64)]) -> ResourceMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

fn fx(entries: &[(&str, f64)]) -> EffectMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

fn reqs(iids: &[&str]) -> Vec<hexfort_types::ItemId> {
    iids.iter().map(|s| (*s).into()).collect()
}

/// Every built-in item definition.
pub fn all_items() -> Vec<ItemDef> {
    let mut items = Vec::new();
    items.extend(buildings());
    items.extend(knowledge());
    items.extend(structures());
    items.extend(critters());
    items.extend(artefacts());
    items.extend(wonders());
    items
}

// =============================================================================
// Buildings
// =============================================================================

fn buildings() -> Vec<ItemDef> {
    vec![
        // The bootstrap item: completes instantly at empire creation.
        ItemDef::new("INIT", "Settlement", ItemKind::Building),
        ItemDef {
            effort: 20.0,
            costs: res(&[(effect::RES_GOLD, 20.0)]),
            requirements: reqs(&["INIT"]),
            effects: fx(&[(effect::GOLD_OFFSET, 0.1)]),
            ..ItemDef::new("FIRE_PLACE", "Fire Place", ItemKind::Building)
        },
        ItemDef {
            effort: 40.0,
            costs: res(&[(effect::RES_GOLD, 30.0)]),
            requirements: reqs(&["FIRE_PLACE"]),
            effects: fx(&[(effect::CULTURE_OFFSET, 0.05)]),
            ..ItemDef::new("SHRINE", "Shrine", ItemKind::Building)
        },
        ItemDef {
            effort: 60.0,
            costs: res(&[(effect::RES_GOLD, 50.0)]),
            requirements: reqs(&["FIRE_PLACE"]),
            effects: fx(&[(effect::GOLD_OFFSET, 0.05), (effect::GOLD_MODIFIER, 0.1)]),
            ..ItemDef::new("EXCHANGE_POST", "Exchange Post", ItemKind::Building)
        },
        ItemDef {
            effort: 100.0,
            costs: res(&[(effect::RES_GOLD, 50.0)]),
            requirements: reqs(&["FIRE_PLACE"]),
            ..ItemDef::new("MAIN_HOUSE", "Main House", ItemKind::Building)
        },
        ItemDef {
            effort: 150.0,
            costs: res(&[(effect::RES_GOLD, 120.0)]),
            requirements: reqs(&["MAIN_HOUSE"]),
            effects: fx(&[(effect::BUILD_SPEED_MODIFIER, 0.25)]),
            ..ItemDef::new("WORKSHOP", "Workshop", ItemKind::Building)
        },
        ItemDef {
            effort: 150.0,
            costs: res(&[(effect::RES_GOLD, 100.0), (effect::RES_CULTURE, 30.0)]),
            requirements: reqs(&["MAIN_HOUSE"]),
            effects: fx(&[(effect::RESEARCH_SPEED_MODIFIER, 0.2)]),
            ..ItemDef::new("LIBRARY", "Library", ItemKind::Building)
        },
        ItemDef {
            effort: 200.0,
            costs: res(&[(effect::RES_GOLD, 150.0)]),
            requirements: reqs(&["MAIN_HOUSE"]),
            ..ItemDef::new("BARRACKS", "Barracks", ItemKind::Building)
        },
        ItemDef {
            effort: 300.0,
            costs: res(&[(effect::RES_GOLD, 250.0)]),
            requirements: reqs(&["BARRACKS"]),
            effects: fx(&[(effect::SIEGE_TIME_OFFSET, 30.0)]),
            ..ItemDef::new("CITY_WALL", "City Wall", ItemKind::Building)
        },
        ItemDef {
            effort: 250.0,
            costs: res(&[(effect::RES_GOLD, 200.0)]),
            requirements: reqs(&["EXCHANGE_POST"]),
            effects: fx(&[(effect::TRAVEL_TIME_OFFSET, -30.0)]),
            ..ItemDef::new("CARAVANSERAI", "Caravanserai", ItemKind::Building)
        },
    ]
}

// =============================================================================
// Knowledge
// =============================================================================

fn knowledge() -> Vec<ItemDef> {
    vec![
        ItemDef {
            effort: 20.0,
            requirements: reqs(&["FIRE_PLACE"]),
            ..ItemDef::new("HUNTING", "Hunting", ItemKind::Knowledge)
        },
        ItemDef {
            effort: 50.0,
            costs: res(&[(effect::RES_CULTURE, 10.0)]),
            requirements: reqs(&["FIRE_PLACE"]),
            ..ItemDef::new("CRAFTSMANSHIP", "Craftsmanship", ItemKind::Knowledge)
        },
        ItemDef {
            effort: 60.0,
            costs: res(&[(effect::RES_CULTURE, 20.0)]),
            requirements: reqs(&["HUNTING"]),
            ..ItemDef::new("ARCHERY", "Archery", ItemKind::Knowledge)
        },
        ItemDef {
            effort: 80.0,
            costs: res(&[(effect::RES_CULTURE, 25.0)]),
            requirements: reqs(&["CRAFTSMANSHIP"]),
            ..ItemDef::new("MASONRY", "Masonry", ItemKind::Knowledge)
        },
        ItemDef {
            effort: 120.0,
            costs: res(&[(effect::RES_CULTURE, 40.0)]),
            requirements: reqs(&["CRAFTSMANSHIP"]),
            ..ItemDef::new("IRON_WORKING", "Iron Working", ItemKind::Knowledge)
        },
        ItemDef {
            effort: 150.0,
            costs: res(&[(effect::RES_CULTURE, 60.0)]),
            requirements: reqs(&["MASONRY"]),
            ..ItemDef::new("ALCHEMY", "Alchemy", ItemKind::Knowledge)
        },
        ItemDef {
            effort: 150.0,
            costs: res(&[(effect::RES_CULTURE, 60.0)]),
            requirements: reqs(&["MASONRY"]),
            ..ItemDef::new("FROSTCRAFT", "Frostcraft", ItemKind::Knowledge)
        },
        ItemDef {
            effort: 200.0,
            costs: res(&[(effect::RES_CULTURE, 80.0)]),
            requirements: reqs(&["IRON_WORKING"]),
            ..ItemDef::new("SIEGECRAFT", "Siegecraft", ItemKind::Knowledge)
        },
    ]
}

// =============================================================================
// Structures (towers)
// =============================================================================

fn structures() -> Vec<ItemDef> {
    vec![
        ItemDef {
            costs: res(&[(effect::RES_GOLD, 100.0)]),
            requirements: reqs(&["ARCHERY"]),
            damage: 1.0,
            range: 2,
            reload_time_ms: 1000.0,
            shot_speed: 8.0,
            shot_kind: ShotKind::Normal,
            ..ItemDef::new("ARROW_TOWER", "Arrow Tower", ItemKind::Structure)
        },
        ItemDef {
            costs: res(&[(effect::RES_GOLD, 250.0)]),
            requirements: reqs(&["ALCHEMY"]),
            damage: 2.0,
            range: 2,
            reload_time_ms: 1500.0,
            shot_speed: 6.0,
            shot_kind: ShotKind::Burn,
            effects: fx(&[
                (effect::BURN_TARGET_DPS, 1.5),
                (effect::BURN_TARGET_DURATION, 3.0),
            ]),
            ..ItemDef::new("FLAME_TOWER", "Flame Tower", ItemKind::Structure)
        },
        ItemDef {
            costs: res(&[(effect::RES_GOLD, 250.0)]),
            requirements: reqs(&["FROSTCRAFT"]),
            damage: 1.0,
            range: 2,
            reload_time_ms: 1200.0,
            shot_speed: 7.0,
            shot_kind: ShotKind::Cold,
            effects: fx(&[
                (effect::SLOW_TARGET, 0.5),
                (effect::SLOW_TARGET_DURATION, 2.0),
            ]),
            ..ItemDef::new("FROST_TOWER", "Frost Tower", ItemKind::Structure)
        },
        ItemDef {
            costs: res(&[(effect::RES_GOLD, 400.0)]),
            requirements: reqs(&["SIEGECRAFT"]),
            damage: 5.0,
            range: 3,
            reload_time_ms: 2500.0,
            shot_speed: 6.0,
            shot_kind: ShotKind::Splash,
            effects: fx(&[
                (effect::SPLASH_DAMAGE, 2.0),
                (effect::SPLASH_RADIUS, 1.0),
            ]),
            ..ItemDef::new("CANNON_TOWER", "Cannon Tower", ItemKind::Structure)
        },
    ]
}

// =============================================================================
// Critters
// =============================================================================

fn critters() -> Vec<ItemDef> {
    vec![
        ItemDef {
            requirements: reqs(&["HUNTING"]),
            health: 3.0,
            speed: 0.3,
            armour: 0.0,
            value: 1.0,
            spawn_interval_ms: 500.0,
            capture: res(&[(effect::RES_LIFE, 1.0)]),
            ..ItemDef::new("SCOUT", "Scout", ItemKind::Critter)
        },
        ItemDef {
            requirements: reqs(&["CRAFTSMANSHIP"]),
            health: 8.0,
            speed: 0.15,
            armour: 0.0,
            value: 2.0,
            spawn_interval_ms: 800.0,
            capture: res(&[(effect::RES_LIFE, 1.0), (effect::RES_GOLD, 5.0)]),
            ..ItemDef::new("SOLDIER", "Soldier", ItemKind::Critter)
        },
        ItemDef {
            requirements: reqs(&["IRON_WORKING"]),
            health: 15.0,
            speed: 0.12,
            armour: 2.0,
            value: 4.0,
            spawn_interval_ms: 1200.0,
            capture: res(&[(effect::RES_LIFE, 1.0), (effect::RES_GOLD, 10.0)]),
            ..ItemDef::new("ARMORED_ORC", "Armored Orc", ItemKind::Critter)
        },
        ItemDef {
            requirements: reqs(&["IRON_WORKING"]),
            health: 10.0,
            speed: 0.3,
            armour: 1.0,
            value: 5.0,
            spawn_interval_ms: 900.0,
            capture: res(&[(effect::RES_LIFE, 1.0), (effect::RES_CULTURE, 3.0)]),
            ..ItemDef::new("BERSERKER", "Berserker", ItemKind::Critter)
        },
        ItemDef {
            requirements: reqs(&["ALCHEMY"]),
            health: 2.0,
            speed: 0.35,
            armour: 0.0,
            value: 1.0,
            spawn_interval_ms: 300.0,
            scale: 0.6,
            capture: res(&[(effect::RES_LIFE, 1.0)]),
            ..ItemDef::new("HATCHLING", "Hatchling", ItemKind::Critter)
        },
        ItemDef {
            requirements: reqs(&["ALCHEMY"]),
            health: 20.0,
            speed: 0.12,
            armour: 0.0,
            value: 6.0,
            spawn_interval_ms: 2000.0,
            scale: 1.4,
            capture: res(&[(effect::RES_LIFE, 2.0)]),
            spawn_on_death: [("HATCHLING".into(), 3u32)].into_iter().collect(),
            ..ItemDef::new("BROODMOTHER", "Broodmother", ItemKind::Critter)
        },
        ItemDef {
            requirements: reqs(&["SIEGECRAFT"]),
            health: 40.0,
            speed: 0.08,
            armour: 4.0,
            value: 8.0,
            spawn_interval_ms: 3000.0,
            scale: 1.8,
            capture: res(&[(effect::RES_LIFE, 2.0), (effect::RES_GOLD, 25.0)]),
            bonus: res(&[(effect::RES_CULTURE, 5.0)]),
            spawn_on_death: [("SCOUT".into(), 2u32)].into_iter().collect(),
            ..ItemDef::new("WAR_TURTLE", "War Turtle", ItemKind::Critter)
        },
    ]
}

// =============================================================================
// Artefacts & wonders
// =============================================================================

fn artefacts() -> Vec<ItemDef> {
    vec![
        ItemDef {
            effects: fx(&[(effect::GOLD_MODIFIER, 0.2)]),
            ..ItemDef::new("GOLDEN_IDOL", "Golden Idol", ItemKind::Artefact)
        },
        ItemDef {
            effects: fx(&[(effect::RESEARCH_SPEED_MODIFIER, 0.3)]),
            ..ItemDef::new("CRYSTAL_SKULL", "Crystal Skull", ItemKind::Artefact)
        },
        ItemDef {
            effects: fx(&[(effect::TRAVEL_TIME_OFFSET, -60.0)]),
            ..ItemDef::new("WAR_BANNER", "War Banner", ItemKind::Artefact)
        },
    ]
}

fn wonders() -> Vec<ItemDef> {
    vec![ItemDef {
        effort: 1000.0,
        costs: res(&[(effect::RES_GOLD, 2000.0), (effect::RES_CULTURE, 500.0)]),
        requirements: reqs(&["SIEGECRAFT", "ALCHEMY"]),
        effects: fx(&[
            (effect::GOLD_MODIFIER, 0.25),
            (effect::CULTURE_MODIFIER, 0.25),
        ]),
        ..ItemDef::new("GREAT_BEACON", "Great Beacon", ItemKind::Wonder)
    }]
}
