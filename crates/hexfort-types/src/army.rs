//! Army and wave types.
//!
//! An army is an ordered list of critter waves. During a battle each wave
//! spawns its critters one at a time at the critter's spawn interval; the
//! wave carries its own spawn counters so a battle snapshot is
//! self-contained.

use arrayvec::ArrayVec;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::ids::{Aid, ItemId, Uid};

/// Max waves per army.
pub const MAX_ARMY_WAVES: usize = 8;

/// A wave of identical critters within an army.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritterWave {
    pub wave_id: u32,
    pub critter_iid: ItemId,
    /// Capacity of this wave, i.e. the number of critters it spawns.
    pub slots: u32,
    /// Critters spawned so far (battle-time counter).
    #[serde(default)]
    pub spawned: u32,
    /// Countdown to the next critter spawn (battle-time counter).
    #[serde(default)]
    pub next_spawn_ms: f64,
}

impl CritterWave {
    pub fn new(wave_id: u32, critter_iid: impl Into<ItemId>, slots: u32) -> Self {
        Self {
            wave_id,
            critter_iid: critter_iid.into(),
            slots,
            spawned: 0,
            next_spawn_ms: 0.0,
        }
    }

    /// True when every slot has spawned.
    pub fn is_dispatched(&self) -> bool {
        self.spawned >= self.slots
    }
}

/// An attacking army: ordered critter waves owned by one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Army {
    pub aid: Aid,
    pub owner_uid: Uid,
    pub name: String,
    pub waves: ArrayVec<CritterWave, MAX_ARMY_WAVES>,
}

impl Army {
    pub fn new(aid: Aid, owner_uid: Uid, name: impl Into<String>) -> Self {
        Self {
            aid,
            owner_uid,
            name: name.into(),
            waves: ArrayVec::new(),
        }
    }

    /// True once the last wave has spawned everything (or there are no waves).
    pub fn is_dispatched(&self) -> bool {
        self.waves.iter().all(CritterWave::is_dispatched)
    }

    /// Total critter slots across all waves.
    pub fn total_slots(&self) -> u32 {
        self.waves.iter().map(|w| w.slots).sum()
    }
}

// =============================================================================
// Spy armies
// =============================================================================

bitflags! {
    /// Intelligence gathered by a spy army, packed into a u32 bitfield.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpyOptions: u32 {
        const DEFENSE        = 1 << 0;
        const BUILD_QUEUE    = 1 << 1;
        const RESEARCH_QUEUE = 1 << 2;
        const ATTACKS        = 1 << 3;
        const ARTEFACTS      = 1 << 4;
    }
}

// Manual serde for SpyOptions as a u32 value.
impl Serialize for SpyOptions {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SpyOptions {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Ok(SpyOptions::from_bits_truncate(bits))
    }
}

impl SpyOptions {
    /// Parse a wire option name ("defense", "build_queue", ...).
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "defense" => Some(Self::DEFENSE),
            "build_queue" => Some(Self::BUILD_QUEUE),
            "research_queue" => Some(Self::RESEARCH_QUEUE),
            "attacks" => Some(Self::ATTACKS),
            "artefacts" => Some(Self::ARTEFACTS),
            _ => None,
        }
    }
}

/// A spy army — gathers intelligence instead of attacking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpyArmy {
    pub aid: Aid,
    pub owner_uid: Uid,
    pub options: SpyOptions,
}
