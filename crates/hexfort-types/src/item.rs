//! Item definitions — the immutable catalogue entries.
//!
//! One `ItemDef` describes a building, a piece of knowledge, a defensive
//! structure, a critter, an artefact, or a wonder. Not every field applies
//! to every kind; irrelevant fields keep their defaults and are ignored by
//! the consuming code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effect::{EffectMap, ResourceMap};
use crate::ids::ItemId;

/// The category of a catalogue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Building,
    Knowledge,
    Structure,
    Critter,
    Artefact,
    Wonder,
}

/// Projectile behaviour of a structure's shots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotKind {
    #[default]
    Normal,
    Burn,
    Cold,
    Splash,
}

/// Complete definition of a game item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub iid: ItemId,
    pub name: String,
    pub kind: ItemKind,

    // Common
    /// Build / research effort in tick-seconds. 0 completes instantly.
    pub effort: f64,
    pub costs: ResourceMap,
    pub requirements: Vec<ItemId>,
    pub effects: EffectMap,

    // Structure
    pub damage: f64,
    pub range: u32,
    pub reload_time_ms: f64,
    pub shot_speed: f64,
    pub shot_kind: ShotKind,

    // Critter
    /// Movement speed in hex fields per second.
    pub speed: f64,
    pub health: f64,
    pub armour: f64,
    /// Slot cost per critter in a wave.
    pub slots: u32,
    /// Milliseconds between critter spawns within a wave.
    pub spawn_interval_ms: f64,
    /// Gold awarded to the defender when this critter is killed.
    pub value: f64,
    /// Display scale hint for clients.
    pub scale: f64,
    /// Resources captured when the critter reaches the castle.
    pub capture: ResourceMap,
    /// Resources granted to the defender on kill.
    pub bonus: ResourceMap,
    /// Critters spawned in place when this critter dies.
    pub spawn_on_death: BTreeMap<ItemId, u32>,
}

impl ItemDef {
    /// A blank definition of the given kind; callers fill in what applies.
    pub fn new(iid: impl Into<ItemId>, name: &str, kind: ItemKind) -> Self {
        Self {
            iid: iid.into(),
            name: name.to_string(),
            kind,
            effort: 0.0,
            costs: BTreeMap::new(),
            requirements: Vec::new(),
            effects: BTreeMap::new(),
            damage: 0.0,
            range: 0,
            reload_time_ms: 0.0,
            shot_speed: 0.0,
            shot_kind: ShotKind::Normal,
            speed: 0.0,
            health: 0.0,
            armour: 0.0,
            slots: 1,
            spawn_interval_ms: 500.0,
            value: 0.0,
            scale: 1.0,
            capture: BTreeMap::new(),
            bonus: BTreeMap::new(),
            spawn_on_death: BTreeMap::new(),
        }
    }
}
