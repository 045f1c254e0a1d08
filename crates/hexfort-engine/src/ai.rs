//! AI opponent — adaptive attacks that converge on a target win-rate.
//!
//! The AI owns the reserved uid 0. It scores a player's empire, spends a
//! budget proportional to that score on critter waves, and dispatches the
//! army through the attack engine. Scripted waves (item or citizen
//! triggers) take priority over synthesis. After every battle the outcome
//! lands in a rolling window; each time the window fills, the power
//! multiplier is nudged toward the target win-rate.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use hexfort_types::army::{Army, CritterWave};
use hexfort_types::config::{GameConfig, ScriptedWavePrecedence};
use hexfort_types::effect;
use hexfort_types::empire::Empire;
use hexfort_types::{Aid, AttackId, ItemDef, ItemId, ItemKind, Uid, AI_UID};

use hexfort_data::waves::WaveScript;
use hexfort_data::ItemCatalog;

use crate::attack::AttackEngine;

/// Critters at or above this speed count as "fast" for pool selection.
const FAST_SPEED: f64 = 0.25;

// =============================================================================
// Parameters
// =============================================================================

/// Tunable parameters for the AI attack heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiParams {
    /// Overall army-strength factor, adapted at runtime.
    pub power_multiplier: f64,

    /// Share of waves using armored critters.
    pub armor_bias: f64,
    /// Share of waves using fast critters.
    pub speed_bias: f64,

    pub wave_count: u32,
    pub max_slots_per_wave: u32,
    pub min_slots_per_wave: u32,

    // Player assessment weights
    pub building_weight: f64,
    pub research_weight: f64,
    pub culture_weight: f64,
    pub tile_weight: f64,

    // Adaptation
    pub win_rate_target: f64,
    pub adaptation_rate: f64,
    pub min_power_multiplier: f64,
    pub max_power_multiplier: f64,
    pub history_window: usize,
}

impl Default for AiParams {
    fn default() -> Self {
        Self {
            power_multiplier: 1.0,
            armor_bias: 0.30,
            speed_bias: 0.20,
            wave_count: 3,
            max_slots_per_wave: 20,
            min_slots_per_wave: 2,
            building_weight: 1.0,
            research_weight: 0.8,
            culture_weight: 0.015,
            tile_weight: 0.8,
            win_rate_target: 0.50,
            adaptation_rate: 0.08,
            min_power_multiplier: 0.2,
            max_power_multiplier: 5.0,
            history_window: 10,
        }
    }
}

// =============================================================================
// Opponent
// =============================================================================

/// The adaptive AI attacker.
#[derive(Debug)]
pub struct AiOpponent {
    pub params: AiParams,
    scripts: Vec<WaveScript>,
    precedence: ScriptedWavePrecedence,
    /// Recent outcomes; true = AI won.
    history: VecDeque<bool>,
    /// Outstanding AI battles: attack id → defender uid.
    pending: BTreeMap<AttackId, Uid>,
    /// High range so AI armies never clash with player aids.
    next_army_aid: Aid,
}

impl AiOpponent {
    pub fn new(scripts: Vec<WaveScript>, precedence: ScriptedWavePrecedence) -> Self {
        Self {
            params: AiParams::default(),
            scripts,
            precedence,
            history: VecDeque::new(),
            pending: BTreeMap::new(),
            next_army_aid: 10_000,
        }
    }

    pub fn pending(&self) -> &BTreeMap<AttackId, Uid> {
        &self.pending
    }

    // -- Scoring -----------------------------------------------------------

    /// A scalar "player power" score: completed building and research
    /// effort, culture, and defensive structures. Floored so new players
    /// stay attackable.
    pub fn assess_player(&self, catalog: &ItemCatalog, empire: &Empire) -> f64 {
        let p = &self.params;
        let effort_of = |iid: &ItemId| catalog.get(iid).map(|i| i.effort).unwrap_or(0.0);

        let building_score: f64 = empire
            .buildings
            .iter()
            .filter(|(_, remaining)| **remaining == 0.0)
            .map(|(iid, _)| effort_of(iid))
            .sum::<f64>()
            * p.building_weight;
        let research_score: f64 = empire
            .knowledge
            .iter()
            .filter(|(_, remaining)| **remaining == 0.0)
            .map(|(iid, _)| effort_of(iid))
            .sum::<f64>()
            * p.research_weight;
        let culture_score = empire.resource(effect::RES_CULTURE) * p.culture_weight;
        let tile_score = empire.structures.len() as f64 * 1000.0 * p.tile_weight;

        (building_score + research_score + culture_score + tile_score).max(500.0)
    }

    // -- Item-completion hook ----------------------------------------------

    /// Called once per `ItemCompleted` for a non-AI empire. Every scripted
    /// wave whose trigger fires for this completion is dispatched.
    pub fn on_item_completed(
        &mut self,
        config: &GameConfig,
        empires: &mut BTreeMap<Uid, Empire>,
        attacks: &mut AttackEngine,
        empire_uid: Uid,
        iid: &ItemId,
    ) {
        if empire_uid == AI_UID {
            return;
        }
        let Some(empire) = empires.get(&empire_uid) else {
            return;
        };
        let total_citizens = empire.total_citizens;

        let matching: Vec<WaveScript> = self
            .scripts
            .iter()
            .filter(|script| {
                let item_hit = script.trigger.items.contains(iid);
                let citizen_hit = script
                    .trigger
                    .citizen
                    .map(|threshold| total_citizens >= threshold)
                    .unwrap_or(false);
                item_hit || citizen_hit
            })
            .cloned()
            .collect();

        for script in matching {
            tracing::info!(
                defender_uid = empire_uid,
                script = %script.name,
                trigger = %iid,
                "scripted wave triggered"
            );
            let army = self.army_from_script(&script);
            self.dispatch(config, empires, attacks, empire_uid, army);
        }
    }

    // -- Adaptive attack ---------------------------------------------------

    /// Launch one adaptive attack against a player empire.
    pub fn attack_player(
        &mut self,
        catalog: &ItemCatalog,
        config: &GameConfig,
        empires: &mut BTreeMap<Uid, Empire>,
        attacks: &mut AttackEngine,
        defender_uid: Uid,
    ) -> Option<AttackId> {
        let empire = empires.get(&defender_uid)?;
        let army = self.build_army(catalog, empire)?;
        Some(self.dispatch(config, empires, attacks, defender_uid, army))
    }

    /// Construct an army for a defender: a fully item-triggered script
    /// wins (per the configured precedence), otherwise synthesis.
    pub fn build_army(&mut self, catalog: &ItemCatalog, empire: &Empire) -> Option<Army> {
        if let Some(script) = self.match_scripted(empire) {
            tracing::info!(script = %script.name, "using scripted army");
            let script = script.clone();
            return Some(self.army_from_script(&script));
        }
        let power = self.assess_player(catalog, empire);
        self.synthesize_army(catalog, empire, power * self.params.power_multiplier)
    }

    /// The scripted entry whose full item trigger is satisfied, if any.
    fn match_scripted(&self, empire: &Empire) -> Option<&WaveScript> {
        let completed = empire.completed_items();
        let satisfied = |script: &&WaveScript| {
            !script.trigger.items.is_empty()
                && script.trigger.items.iter().all(|iid| completed.contains(iid))
        };
        match self.precedence {
            ScriptedWavePrecedence::LastMatch => self.scripts.iter().rev().find(satisfied),
            ScriptedWavePrecedence::FirstMatch => self.scripts.iter().find(satisfied),
        }
    }

    fn army_from_script(&mut self, script: &WaveScript) -> Army {
        let mut army = Army::new(self.alloc_aid(), AI_UID, script.name.clone());
        for (i, wave) in script.army.iter().enumerate() {
            if army.waves.is_full() {
                tracing::warn!(script = %script.name, "script exceeds max waves, truncating");
                break;
            }
            army.waves.push(CritterWave::new(
                i as u32 + 1,
                wave.critter_iid.clone(),
                wave.slots.max(1),
            ));
        }
        army
    }

    /// Build waves worth `budget` health from the defender's own unlocked
    /// critters, split into fast / armored / normal pools.
    fn synthesize_army(
        &mut self,
        catalog: &ItemCatalog,
        empire: &Empire,
        budget: f64,
    ) -> Option<Army> {
        let completed = empire.completed_items();
        let mut available = catalog.available_critters(&completed);
        if available.is_empty() {
            // The player has unlocked nothing yet; use the whole roster.
            available = catalog.of_kind(ItemKind::Critter);
        }
        if available.is_empty() {
            return None;
        }

        let fast_pool: Vec<&ItemDef> = available
            .iter()
            .copied()
            .filter(|c| c.speed >= FAST_SPEED)
            .collect();
        let armored_pool: Vec<&ItemDef> =
            available.iter().copied().filter(|c| c.armour > 0.0).collect();
        let mut normal_pool: Vec<&ItemDef> = available
            .iter()
            .copied()
            .filter(|c| c.speed < FAST_SPEED && c.armour <= 0.0)
            .collect();
        if normal_pool.is_empty() {
            normal_pool = available.clone();
        }

        let toughest = |pool: &[&ItemDef]| -> Option<ItemDef> {
            pool.iter()
                .max_by(|a, b| {
                    a.health
                        .partial_cmp(&b.health)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.iid.cmp(&b.iid).reverse())
                })
                .map(|i| (*i).clone())
        };

        let p = self.params.clone();
        let mut shares: Vec<(ItemDef, f64)> = Vec::new();
        if p.speed_bias > 0.0 {
            if let Some(best) = toughest(&fast_pool) {
                shares.push((best, p.speed_bias));
            }
        }
        if p.armor_bias > 0.0 {
            if let Some(best) = toughest(&armored_pool) {
                shares.push((best, p.armor_bias));
            }
        }
        let used: f64 = shares.iter().map(|(_, s)| s).sum();
        let normal_share = (1.0 - used).max(0.0);
        if normal_share > 0.0 {
            if let Some(best) = toughest(&normal_pool) {
                shares.push((best, normal_share));
            }
        }
        if shares.is_empty() {
            let best = toughest(&normal_pool)?;
            shares.push((best, 1.0));
        }

        let mut army = Army::new(self.alloc_aid(), AI_UID, "AI Assault");
        for i in 0..p.wave_count {
            if army.waves.is_full() {
                break;
            }
            let (item, share) = &shares[i as usize % shares.len()];
            let waves_for_share = ((p.wave_count as f64 * share).round() as u32).max(1);
            let wave_budget = budget * share / waves_for_share as f64;
            let slots = (wave_budget / item.health.max(1.0)).ceil() as u32;
            let slots = slots.clamp(p.min_slots_per_wave, p.max_slots_per_wave);
            army.waves
                .push(CritterWave::new(i + 1, item.iid.clone(), slots));
        }
        Some(army)
    }

    // -- Dispatch ----------------------------------------------------------

    /// Register the army with the AI empire and launch the attack.
    fn dispatch(
        &mut self,
        config: &GameConfig,
        empires: &mut BTreeMap<Uid, Empire>,
        attacks: &mut AttackEngine,
        defender_uid: Uid,
        army: Army,
    ) -> AttackId {
        let ai_empire = empires
            .entry(AI_UID)
            .or_insert_with(|| Empire::new(AI_UID, "AI"));
        let aid = army.aid;
        ai_empire.armies.retain(|a| a.aid != aid);
        ai_empire.armies.push(army);

        let attack_id =
            attacks.start_ai_attack(AI_UID, defender_uid, aid, config.ai_travel_seconds);
        self.pending.insert(attack_id, defender_uid);
        tracing::info!(attack_id, defender_uid, aid, "AI attack dispatched");
        attack_id
    }

    fn alloc_aid(&mut self) -> Aid {
        let aid = self.next_army_aid;
        self.next_army_aid += 1;
        aid
    }

    // -- Adaptation --------------------------------------------------------

    /// Record the outcome of an AI battle. Each time the rolling window
    /// fills, the win-rate is compared against the target band and the
    /// power multiplier adjusted one notch, then the window restarts.
    pub fn on_battle_finished(&mut self, attack_id: AttackId, defender_won: bool) {
        let Some(defender_uid) = self.pending.remove(&attack_id) else {
            return;
        };
        let ai_won = !defender_won;
        self.history.push_back(ai_won);
        if self.history.len() < self.params.history_window {
            return;
        }

        let wins = self.history.iter().filter(|w| **w).count();
        let win_rate = wins as f64 / self.history.len() as f64;
        let p = &mut self.params;
        let old = p.power_multiplier;
        if win_rate > p.win_rate_target + 0.05 {
            p.power_multiplier = (old - p.adaptation_rate).max(p.min_power_multiplier);
        } else if win_rate < p.win_rate_target - 0.05 {
            p.power_multiplier = (old + p.adaptation_rate).min(p.max_power_multiplier);
        }
        self.history.clear();

        tracing::info!(
            defender_uid,
            ai_won,
            win_rate,
            old_multiplier = old,
            new_multiplier = self.params.power_multiplier,
            "AI adaptation"
        );
    }

    // -- Snapshot support --------------------------------------------------

    pub fn snapshot(&self) -> AiSnapshot {
        AiSnapshot {
            params: self.params.clone(),
            history: self.history.iter().copied().collect(),
            pending: self.pending.clone(),
            next_army_aid: self.next_army_aid,
        }
    }

    pub fn restore(&mut self, snapshot: AiSnapshot) {
        self.params = snapshot.params;
        self.history = snapshot.history.into_iter().collect();
        self.pending = snapshot.pending;
        self.next_army_aid = snapshot.next_army_aid;
    }
}

/// Serialisable AI state for snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSnapshot {
    pub params: AiParams,
    pub history: Vec<bool>,
    pub pending: BTreeMap<AttackId, Uid>,
    pub next_army_aid: Aid,
}
