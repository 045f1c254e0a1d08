//! Attack engine — the TRAVELLING → IN_SIEGE → IN_BATTLE → FINISHED state
//! machine.
//!
//! Only one attack per defender may hold the siege slot; arrivals wait at
//! ETA 0 until the slot frees, in attack order. The `battles_started` set
//! guarantees an attack entering IN_BATTLE is returned from `step_all`
//! exactly once — including attacks restored from a snapshot already in
//! that phase.

use std::collections::{BTreeMap, BTreeSet};

use hexfort_types::attack::{Attack, AttackPhase};
use hexfort_types::config::GameConfig;
use hexfort_types::effect;
use hexfort_types::empire::Empire;
use hexfort_types::{Aid, AttackId, Uid};

use crate::events::{EventBus, GameEvent};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum AttackError {
    UnknownEmpire(Uid),
    UnknownArmy(Aid),
    EmptyArmy(Aid),
    InvalidTarget,
    NoActiveSiege,
}

impl std::fmt::Display for AttackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEmpire(uid) => write!(f, "Empire {uid} not found"),
            Self::UnknownArmy(aid) => write!(f, "Unknown army {aid}"),
            Self::EmptyArmy(aid) => write!(f, "Army {aid} has no waves"),
            Self::InvalidTarget => write!(f, "Invalid target"),
            Self::NoActiveSiege => write!(f, "No siege in progress"),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Owns every active attack and serialises all mutations to the list.
#[derive(Debug, Default)]
pub struct AttackEngine {
    attacks: Vec<Attack>,
    /// defender uid → attack currently holding the siege slot.
    siege_slots: BTreeMap<Uid, AttackId>,
    /// Attacks whose battle start has already been signalled.
    battles_started: BTreeSet<AttackId>,
    next_attack_id: AttackId,
}

impl AttackEngine {
    pub fn new() -> Self {
        Self {
            attacks: Vec::new(),
            siege_slots: BTreeMap::new(),
            battles_started: BTreeSet::new(),
            next_attack_id: 1,
        }
    }

    pub fn attacks(&self) -> &[Attack] {
        &self.attacks
    }

    pub fn get(&self, attack_id: AttackId) -> Option<&Attack> {
        self.attacks.iter().find(|a| a.attack_id == attack_id)
    }

    /// Rebuild from snapshot state. `battles_started` is intentionally
    /// left empty so restored IN_BATTLE attacks re-signal once.
    pub fn restore(attacks: Vec<Attack>, next_attack_id: AttackId) -> Self {
        let mut siege_slots = BTreeMap::new();
        for attack in &attacks {
            if attack.phase == AttackPhase::InSiege {
                siege_slots.insert(attack.defender_uid, attack.attack_id);
            }
        }
        Self {
            attacks,
            siege_slots,
            battles_started: BTreeSet::new(),
            next_attack_id,
        }
    }

    pub fn next_attack_id(&self) -> AttackId {
        self.next_attack_id
    }

    // -- Starting attacks --------------------------------------------------

    /// Start a player attack. Travel time is the base plus the attacker's
    /// travel_time_offset effect, floored at one second.
    pub fn start_attack(
        &mut self,
        config: &GameConfig,
        empires: &BTreeMap<Uid, Empire>,
        attacker_uid: Uid,
        defender_uid: Uid,
        army_aid: Aid,
    ) -> Result<AttackId, AttackError> {
        if attacker_uid == defender_uid || !empires.contains_key(&defender_uid) {
            return Err(AttackError::InvalidTarget);
        }
        let attacker = empires
            .get(&attacker_uid)
            .ok_or(AttackError::UnknownEmpire(attacker_uid))?;
        let army = attacker
            .army(army_aid)
            .ok_or(AttackError::UnknownArmy(army_aid))?;
        if army.waves.is_empty() {
            return Err(AttackError::EmptyArmy(army_aid));
        }

        let eta = (config.base_travel_seconds + attacker.effect(effect::TRAVEL_TIME_OFFSET))
            .max(1.0);
        Ok(self.push_attack(attacker_uid, defender_uid, army_aid, eta))
    }

    /// Start an AI attack with an explicit travel time. The AI's army is
    /// registered with its empire by the caller.
    pub fn start_ai_attack(
        &mut self,
        attacker_uid: Uid,
        defender_uid: Uid,
        army_aid: Aid,
        travel_seconds: f64,
    ) -> AttackId {
        self.push_attack(attacker_uid, defender_uid, army_aid, travel_seconds.max(1.0))
    }

    fn push_attack(
        &mut self,
        attacker_uid: Uid,
        defender_uid: Uid,
        army_aid: Aid,
        eta_seconds: f64,
    ) -> AttackId {
        let attack_id = self.next_attack_id;
        self.next_attack_id += 1;
        tracing::info!(attack_id, attacker_uid, defender_uid, army_aid, eta_seconds, "attack started");
        self.attacks
            .push(Attack::new(attack_id, attacker_uid, defender_uid, army_aid, eta_seconds));
        attack_id
    }

    // -- Stepping ----------------------------------------------------------

    /// Advance every active attack by `dt` seconds. Returns clones of the
    /// attacks that entered IN_BATTLE this tick (each exactly once over
    /// the engine's lifetime).
    pub fn step_all(
        &mut self,
        config: &GameConfig,
        empires: &BTreeMap<Uid, Empire>,
        bus: &EventBus,
        dt: f64,
    ) -> Vec<Attack> {
        let mut entering_battle = Vec::new();
        for idx in 0..self.attacks.len() {
            if let Some(attack) = self.step_one(idx, config, empires, bus, dt) {
                entering_battle.push(attack);
            }
        }
        entering_battle
    }

    fn step_one(
        &mut self,
        idx: usize,
        config: &GameConfig,
        empires: &BTreeMap<Uid, Empire>,
        bus: &EventBus,
        dt: f64,
    ) -> Option<Attack> {
        let attack = &mut self.attacks[idx];
        match attack.phase {
            AttackPhase::Travelling => {
                attack.eta_seconds = (attack.eta_seconds - dt).max(0.0);
                if attack.eta_seconds > 0.0 {
                    return None;
                }
                // Arrived. The siege slot may be taken; wait at ETA 0.
                let defender_uid = attack.defender_uid;
                if self.siege_slots.contains_key(&defender_uid) {
                    return None;
                }
                let attack = &mut self.attacks[idx];
                let siege = siege_duration(config, empires.get(&defender_uid));
                attack.phase = AttackPhase::InSiege;
                attack.siege_remaining_seconds = siege;
                attack.total_siege_seconds = siege;
                self.siege_slots.insert(defender_uid, attack.attack_id);
                tracing::info!(
                    attack_id = attack.attack_id,
                    defender_uid,
                    siege,
                    "attack entered siege"
                );
                bus.emit(&phase_event(attack));
                None
            }
            AttackPhase::InSiege => {
                attack.siege_remaining_seconds = (attack.siege_remaining_seconds - dt).max(0.0);
                if attack.siege_remaining_seconds > 0.0 {
                    return None;
                }
                attack.phase = AttackPhase::InBattle;
                self.siege_slots.remove(&attack.defender_uid);
                tracing::info!(attack_id = attack.attack_id, "siege complete, battle starts");
                let attack = self.attacks[idx].clone();
                bus.emit(&phase_event(&attack));
                self.mark_started(idx, bus)
            }
            AttackPhase::InBattle => {
                // Restored from a snapshot mid-battle: signal once.
                self.mark_started(idx, bus)
            }
            AttackPhase::Finished => None,
        }
    }

    /// Return the attack for battle creation if it has not been signalled
    /// before.
    fn mark_started(&mut self, idx: usize, bus: &EventBus) -> Option<Attack> {
        let attack = &self.attacks[idx];
        if !self.battles_started.insert(attack.attack_id) {
            return None;
        }
        bus.emit(&GameEvent::BattleStartRequested {
            attack_id: attack.attack_id,
            attacker_uid: attack.attacker_uid,
            defender_uid: attack.defender_uid,
            army_aid: attack.army_aid,
        });
        Some(attack.clone())
    }

    // -- Defender actions --------------------------------------------------

    /// The defender forces the active siege to expire; the battle starts
    /// on the next step.
    pub fn end_siege(&mut self, defender_uid: Uid) -> Result<AttackId, AttackError> {
        let attack_id = *self
            .siege_slots
            .get(&defender_uid)
            .ok_or(AttackError::NoActiveSiege)?;
        if let Some(attack) = self.attacks.iter_mut().find(|a| a.attack_id == attack_id) {
            attack.siege_remaining_seconds = 0.0;
        }
        Ok(attack_id)
    }

    // -- Completion --------------------------------------------------------

    /// Mark an attack finished once its battle concluded, dropping it from
    /// the active list.
    pub fn finish(&mut self, attack_id: AttackId) {
        if let Some(attack) = self.attacks.iter_mut().find(|a| a.attack_id == attack_id) {
            attack.phase = AttackPhase::Finished;
        }
        self.battles_started.remove(&attack_id);
        self.attacks.retain(|a| a.attack_id != attack_id);
    }
}

/// Siege duration: base plus the defender's siege_time_offset, floored at
/// one second. A missing defender falls back to the base.
fn siege_duration(config: &GameConfig, defender: Option<&Empire>) -> f64 {
    let offset = defender
        .map(|e| e.effect(effect::SIEGE_TIME_OFFSET))
        .unwrap_or(0.0);
    (config.base_siege_seconds + offset).max(1.0)
}

fn phase_event(attack: &Attack) -> GameEvent {
    GameEvent::AttackPhaseChanged {
        attack_id: attack.attack_id,
        attacker_uid: attack.attacker_uid,
        defender_uid: attack.defender_uid,
        army_aid: attack.army_aid,
        phase: attack.phase,
    }
}
