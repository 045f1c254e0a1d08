//! Effect key constants and the aggregated effect map.
//!
//! Effects live only on immutable items; an empire stores one aggregated
//! map rebuilt from its completed items. Keys are plain strings so the
//! catalogue can introduce new effects without a code change.

use std::collections::BTreeMap;

/// Aggregated passive effects, keyed by effect name.
pub type EffectMap = BTreeMap<String, f64>;

/// Resource amounts keyed by resource name ("gold", "culture", "life", ...).
pub type ResourceMap = BTreeMap<String, f64>;

// -- Resource keys -------------------------------------------------------

pub const RES_GOLD: &str = "gold";
pub const RES_CULTURE: &str = "culture";
pub const RES_LIFE: &str = "life";

// -- Resource generation -------------------------------------------------

pub const GOLD_OFFSET: &str = "gold_offset";
pub const GOLD_MODIFIER: &str = "gold_modifier";
pub const CULTURE_OFFSET: &str = "culture_offset";
pub const CULTURE_MODIFIER: &str = "culture_modifier";
pub const LIFE_OFFSET: &str = "life_offset";

// -- Building & research -------------------------------------------------

pub const BUILD_SPEED_MODIFIER: &str = "build_speed_modifier";
pub const RESEARCH_SPEED_MODIFIER: &str = "research_speed_modifier";

// -- Structure / tower ---------------------------------------------------

pub const SLOW_TARGET: &str = "slow_target";
pub const SLOW_TARGET_DURATION: &str = "slow_target_duration";
pub const BURN_TARGET_DPS: &str = "burn_target_dps";
pub const BURN_TARGET_DURATION: &str = "burn_target_duration";
pub const SPLASH_DAMAGE: &str = "splash_damage";
pub const SPLASH_RADIUS: &str = "splash_radius";

// -- Army ----------------------------------------------------------------

pub const SLOT_OFFSET: &str = "slot_offset";

// -- Travel & siege ------------------------------------------------------

pub const TRAVEL_TIME_OFFSET: &str = "travel_time_offset";
pub const SIEGE_TIME_OFFSET: &str = "siege_time_offset";

/// Look up an effect with a default of 0.
pub fn effect(effects: &EffectMap, key: &str) -> f64 {
    effects.get(key).copied().unwrap_or(0.0)
}
