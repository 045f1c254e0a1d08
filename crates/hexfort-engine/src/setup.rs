//! Initial state construction — new empires and their starting map.

use hexfort_types::config::GameConfig;
use hexfort_types::effect;
use hexfort_types::empire::Empire;
use hexfort_types::Uid;

use hexfort_data::maps::starter_hex_map;
use hexfort_data::ItemCatalog;

use crate::empire::{build_item, recalculate_effects};
use crate::world::WorldState;

/// Build a fresh empire: starting resources from config, the starter hex
/// map, and the bootstrap item completed.
pub fn new_empire(config: &GameConfig, catalog: &ItemCatalog, uid: Uid, name: &str) -> Empire {
    let mut empire = Empire::new(uid, name);
    empire
        .resources
        .insert(effect::RES_GOLD.to_string(), config.starting_gold);
    empire
        .resources
        .insert(effect::RES_CULTURE.to_string(), config.starting_culture);
    empire
        .resources
        .insert(effect::RES_LIFE.to_string(), config.starting_life);
    empire.max_life = config.starting_max_life;
    empire.hex_map = starter_hex_map();

    // INIT is zero-effort and free; it roots the tech tree.
    if build_item(catalog, &mut empire, &"INIT".into()).is_err() {
        tracing::warn!(uid, "catalogue has no INIT bootstrap item");
    }
    recalculate_effects(catalog, &mut empire);
    empire
}

/// Create and register a new empire in the world.
pub fn create_empire<'a>(world: &'a mut WorldState, uid: Uid, name: &str) -> &'a mut Empire {
    let empire = new_empire(&world.config, &world.catalog, uid, name);
    tracing::info!(uid, name, "empire registered");
    world.empires.entry(uid).or_insert(empire)
}
