//! Periodic state snapshots — capture and rehydrate the whole world.
//!
//! The snapshot carries every empire, every active attack, the AI's
//! adaptation state, and the id counters. The attack engine's
//! started-battle flags are deliberately not persisted: an attack restored
//! in the IN_BATTLE phase yields one fresh `BattleStartRequested` on the
//! first post-restore step.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use hexfort_types::attack::Attack;
use hexfort_types::empire::Empire;
use hexfort_types::{AttackId, Bid, Uid};

use crate::ai::AiSnapshot;
use crate::attack::AttackEngine;
use crate::world::WorldState;

/// Serialisable world state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub empires: BTreeMap<Uid, Empire>,
    pub attacks: Vec<Attack>,
    pub next_attack_id: AttackId,
    pub next_bid: Bid,
    pub ai: AiSnapshot,
}

impl Snapshot {
    /// Capture the current world. Structures' transient battle fields are
    /// reset so a restore starts from a quiet state.
    pub fn capture(world: &WorldState) -> Self {
        let mut empires = world.empires.clone();
        for empire in empires.values_mut() {
            for structure in empire.structures.values_mut() {
                structure.reset_transient();
            }
        }
        Self {
            empires,
            attacks: world.attacks.attacks().to_vec(),
            next_attack_id: world.attacks.next_attack_id(),
            next_bid: world.next_bid,
            ai: world.ai.snapshot(),
        }
    }

    /// Rehydrate a world from this snapshot.
    pub fn restore(self, world: &mut WorldState) {
        world.empires = self.empires;
        world.attacks = AttackEngine::restore(self.attacks, self.next_attack_id);
        world.next_bid = self.next_bid;
        world.ai.restore(self.ai);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(io::Error::other)
    }
}
