//! Battle state — the mutable container for one running tower-defense
//! battle.
//!
//! A `BattleState` is created when an attack's siege completes and destroyed
//! when its simulator exits. Critters, structure copies and pending shots
//! belong exclusively to their battle and are never shared. All maps are
//! BTreeMaps so iteration order (and therefore the tick) is deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::army::Army;
use crate::effect::{EffectMap, ResourceMap};
use crate::empire::Structure;
use crate::hex::HexCoord;
use crate::ids::{AttackId, Bid, Cid, ItemId, Sid, Uid};
use crate::item::ShotKind;
use crate::rng::RngState;

// =============================================================================
// Critters
// =============================================================================

/// A single critter on the battlefield, moving along the battle path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critter {
    pub cid: Cid,
    pub iid: ItemId,
    pub health: f64,
    pub max_health: f64,
    /// Base movement speed in hex fields per second.
    pub speed: f64,
    /// Damage reduction for non-burn damage.
    pub armour: f64,
    /// Gold awarded to the defender on kill.
    pub value: f64,
    /// Display scale hint for clients.
    pub scale: f64,
    /// Fractional position along the battle path, normalised to [0, 1].
    pub path_progress: f64,

    pub capture: ResourceMap,
    pub bonus: ResourceMap,
    pub spawn_on_death: BTreeMap<ItemId, u32>,

    // Status effects
    pub slow_remaining_ms: f64,
    /// Movement speed while slowed (hex fields per second).
    pub slow_speed: f64,
    pub burn_remaining_ms: f64,
    pub burn_dps: f64,
}

impl Critter {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_finished(&self) -> bool {
        self.path_progress >= 1.0
    }

    /// Current speed accounting for slow effects.
    pub fn effective_speed(&self) -> f64 {
        if self.slow_remaining_ms > 0.0 {
            self.slow_speed
        } else {
            self.speed
        }
    }

    /// The path index for a progress value on a path of `len` hexes.
    pub fn path_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let idx = (self.path_progress * (len - 1) as f64) as usize;
        idx.min(len - 1)
    }
}

// =============================================================================
// Shots
// =============================================================================

/// Source sid used for splash sub-shots, which have no firing structure.
pub const SPLASH_SOURCE_SID: i64 = -1;

/// A projectile in flight from a structure to a critter. Pure data; the
/// battle engine applies damage when `flight_remaining_ms` reaches 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub damage: f64,
    pub target_cid: Cid,
    /// Sid of the firing structure, or `SPLASH_SOURCE_SID` for sub-shots.
    pub source_sid: i64,
    pub kind: ShotKind,
    /// Effect map copied from the firing structure.
    pub effects: EffectMap,
    pub flight_remaining_ms: f64,
    /// Total flight time, for display progress.
    pub total_flight_ms: f64,
    pub origin: HexCoord,
    /// Display progress in [0, 1], updated during flight.
    pub progress: f64,
}

// =============================================================================
// Removal journal & broadcast deltas
// =============================================================================

/// Why a critter left the battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    Died,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedCritter {
    pub cid: Cid,
    pub reason: RemovalReason,
}

/// Changes since the last broadcast, cleared after each delta is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleJournal {
    pub spawned_cids: Vec<Cid>,
    pub removed: Vec<RemovedCritter>,
    /// (sid, cid) pairs of shots fired since the last broadcast.
    pub shots_fired: Vec<(Sid, Cid)>,
}

impl BattleJournal {
    pub fn clear(&mut self) {
        self.spawned_cids.clear();
        self.removed.clear();
        self.shots_fired.clear();
    }
}

// =============================================================================
// BattleState
// =============================================================================

/// Mutable state of one active battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleState {
    pub bid: Bid,
    pub defender_uid: Uid,
    pub attacker_uids: Vec<Uid>,
    /// Back-reference to the attack this battle resolves, if any.
    pub attack_id: Option<AttackId>,

    /// Snapshot of the attacking army, including per-wave spawn counters.
    pub army: Army,
    /// Copies of the defender's structures, transient state reset.
    pub structures: BTreeMap<Sid, Structure>,
    /// Precomputed spawn → castle path all critters follow.
    pub path: Vec<HexCoord>,

    pub critters: BTreeMap<Cid, Critter>,
    pub pending_shots: Vec<Shot>,
    pub next_cid: Cid,

    /// Battle-scoped PRNG so loot and tie-breaks replay identically.
    pub rng: RngState,

    pub elapsed_ms: f64,
    pub broadcast_timer_ms: f64,
    pub broadcast_interval_ms: f64,
    /// No finish condition may fire before this much battle time.
    pub min_keep_alive_ms: f64,
    /// Delay inserted before each wave after the first.
    pub inter_wave_delay_ms: f64,
    /// Flight time of splash sub-shots.
    pub splash_flight_ms: f64,

    pub keep_alive: bool,
    pub is_finished: bool,
    pub defender_won: Option<bool>,

    pub observers: BTreeSet<Uid>,
    pub journal: BattleJournal,
    pub removed_critters: Vec<RemovedCritter>,

    /// Resources gained per attacker uid, applied after the battle.
    pub attacker_gains: BTreeMap<Uid, ResourceMap>,
    /// Resources lost by the defender, applied after the battle.
    pub defender_losses: ResourceMap,
}

impl BattleState {
    /// True when enough time has passed for a network update.
    pub fn should_broadcast(&self) -> bool {
        self.broadcast_timer_ms <= 0.0
    }

    pub fn reset_broadcast(&mut self) {
        self.broadcast_timer_ms = self.broadcast_interval_ms;
        self.journal.clear();
    }

    /// Hand out the next critter instance id.
    pub fn alloc_cid(&mut self) -> Cid {
        let cid = self.next_cid;
        self.next_cid += 1;
        cid
    }
}
