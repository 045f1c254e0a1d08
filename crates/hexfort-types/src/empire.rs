//! Empire state — a player's complete owned game state.
//!
//! An empire holds resources, buildings, research, citizens, structures,
//! armies, artefacts, the aggregated effect map, and the player's hex map.
//! Structures and armies are owned by value; nothing holds a back-pointer
//! to the empire — operations receive the empire as an argument.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::army::{Army, SpyArmy};
use crate::effect::{EffectMap, ResourceMap, RES_CULTURE, RES_GOLD, RES_LIFE};
use crate::hex::HexCoord;
use crate::ids::{Aid, Cid, ItemId, Sid, Uid};
use crate::item::ShotKind;

// =============================================================================
// Tiles
// =============================================================================

/// Tile types on a player's hex map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Empty,
    /// Critters walk here.
    Path,
    Spawnpoint,
    Castle,
    /// Structures may be placed here.
    Buildable,
    Blocked,
    Void,
}

impl TileKind {
    /// Tiles critters may traverse on their way to the castle.
    pub fn is_walkable(self) -> bool {
        matches!(self, Self::Spawnpoint | Self::Path | Self::Castle)
    }
}

// =============================================================================
// Citizens
// =============================================================================

/// Citizen role distribution. The role sum never exceeds `Empire::total_citizens`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citizens {
    #[serde(default)]
    pub merchant: u32,
    #[serde(default)]
    pub scientist: u32,
    #[serde(default)]
    pub artist: u32,
}

impl Citizens {
    pub fn assigned(&self) -> u32 {
        self.merchant + self.scientist + self.artist
    }
}

// =============================================================================
// Structures
// =============================================================================

/// A defensive tower placed on the hex map. Numeric stats are copied from
/// the catalogue at placement time; `focus_cid` and `reload_remaining_ms`
/// are transient battle state, reset between battles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub sid: Sid,
    pub iid: ItemId,
    pub position: HexCoord,
    pub damage: f64,
    pub range: u32,
    pub reload_time_ms: f64,
    pub shot_speed: f64,
    pub shot_kind: ShotKind,
    pub effects: EffectMap,

    // Transient battle state
    #[serde(default)]
    pub focus_cid: Option<Cid>,
    #[serde(default)]
    pub reload_remaining_ms: f64,
}

impl Structure {
    /// Clear transient battle state (fresh copy for a new battle).
    pub fn reset_transient(&mut self) {
        self.focus_cid = None;
        self.reload_remaining_ms = 0.0;
    }
}

// =============================================================================
// Empire
// =============================================================================

/// Complete state of a player's empire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empire {
    pub uid: Uid,
    pub name: String,

    pub resources: ResourceMap,
    /// Building iid → remaining effort (0 = complete).
    pub buildings: BTreeMap<ItemId, f64>,
    /// The building currently under construction; only this one progresses.
    pub build_queue: Option<ItemId>,
    /// Knowledge iid → remaining effort (0 = complete).
    pub knowledge: BTreeMap<ItemId, f64>,
    /// The knowledge currently being researched.
    pub research_queue: Option<ItemId>,

    pub structures: BTreeMap<Sid, Structure>,
    pub next_sid: Sid,
    pub armies: Vec<Army>,
    pub spies: Vec<SpyArmy>,
    pub next_aid: Aid,

    pub citizens: Citizens,
    /// Citizens bought so far; unassigned ones idle.
    pub total_citizens: u32,

    /// Aggregated effects of all completed buildings, knowledge and
    /// artefacts. Rebuilt whenever the completion set changes.
    pub effects: EffectMap,
    pub artefacts: Vec<ItemId>,

    /// Player-owned tiles by "q,r" key.
    pub hex_map: BTreeMap<String, TileKind>,
    pub max_life: f64,
}

impl Empire {
    pub fn new(uid: Uid, name: impl Into<String>) -> Self {
        let mut resources = ResourceMap::new();
        resources.insert(RES_GOLD.to_string(), 0.0);
        resources.insert(RES_CULTURE.to_string(), 0.0);
        resources.insert(RES_LIFE.to_string(), 10.0);
        Self {
            uid,
            name: name.into(),
            resources,
            buildings: BTreeMap::new(),
            build_queue: None,
            knowledge: BTreeMap::new(),
            research_queue: None,
            structures: BTreeMap::new(),
            next_sid: 1,
            armies: Vec::new(),
            spies: Vec::new(),
            next_aid: 1,
            citizens: Citizens::default(),
            total_citizens: 0,
            effects: EffectMap::new(),
            artefacts: Vec::new(),
            hex_map: BTreeMap::new(),
            max_life: 10.0,
        }
    }

    /// Look up an effect value with a default of 0.
    pub fn effect(&self, key: &str) -> f64 {
        self.effects.get(key).copied().unwrap_or(0.0)
    }

    /// Current amount of a resource (0 when absent).
    pub fn resource(&self, key: &str) -> f64 {
        self.resources.get(key).copied().unwrap_or(0.0)
    }

    pub fn life(&self) -> f64 {
        self.resource(RES_LIFE)
    }

    /// The set of completed item ids (remaining effort 0), across buildings
    /// and knowledge. In-progress items are excluded.
    pub fn completed_items(&self) -> std::collections::BTreeSet<ItemId> {
        self.buildings
            .iter()
            .chain(self.knowledge.iter())
            .filter(|(_, remaining)| **remaining == 0.0)
            .map(|(iid, _)| iid.clone())
            .collect()
    }

    /// Whether an item has been started (in progress or complete).
    pub fn has_item(&self, iid: &ItemId) -> bool {
        self.buildings.contains_key(iid) || self.knowledge.contains_key(iid)
    }

    pub fn army(&self, aid: Aid) -> Option<&Army> {
        self.armies.iter().find(|a| a.aid == aid)
    }

    pub fn army_mut(&mut self, aid: Aid) -> Option<&mut Army> {
        self.armies.iter_mut().find(|a| a.aid == aid)
    }

    /// The tile type at a hex, if owned.
    pub fn tile_at(&self, hex: HexCoord) -> Option<TileKind> {
        self.hex_map.get(&hex.key()).copied()
    }
}
