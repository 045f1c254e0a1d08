//! World loop — the coarse 1-second tick that drives empires and attacks
//! and spawns battle simulators.
//!
//! `WorldState::step(dt)` is the deterministic entry point; the async
//! runner in the server binary calls it once per `step_length_ms` and
//! launches a simulator task for every battle it returns.

use std::collections::BTreeMap;
use std::time::Instant;

use hexfort_types::battle::BattleState;
use hexfort_types::config::GameConfig;
use hexfort_types::empire::Empire;
use hexfort_types::{Bid, ItemId, Uid};

use hexfort_data::waves::builtin_wave_scripts;
use hexfort_data::ItemCatalog;

use crate::ai::AiOpponent;
use crate::attack::AttackEngine;
use crate::battle::create_battle;
use crate::events::{EventBus, GameEvent};
use crate::loot::{apply_battle_resources, loot_defender};

// =============================================================================
// Telemetry
// =============================================================================

/// Monitoring counters for the world loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldTelemetry {
    pub tick_count: u64,
    /// Wall-clock dt of the latest tick, in seconds.
    pub last_dt_seconds: f64,
    /// Work time of the latest tick, in milliseconds.
    pub last_work_ms: f64,
    pub avg_work_ms: f64,
    work_ms_sum: f64,
}

impl WorldTelemetry {
    fn record(&mut self, dt_seconds: f64, work_ms: f64) {
        self.tick_count += 1;
        self.last_dt_seconds = dt_seconds;
        self.last_work_ms = work_ms;
        self.work_ms_sum += work_ms;
        self.avg_work_ms = self.work_ms_sum / self.tick_count as f64;
    }
}

// =============================================================================
// WorldState
// =============================================================================

/// The authoritative game state: every empire, attack, and the AI, plus
/// the event bus tying them together.
pub struct WorldState {
    pub config: GameConfig,
    pub catalog: ItemCatalog,
    pub bus: EventBus,
    pub empires: BTreeMap<Uid, Empire>,
    pub attacks: AttackEngine,
    pub ai: AiOpponent,
    pub next_bid: Bid,
    pub telemetry: WorldTelemetry,
}

impl WorldState {
    pub fn new(config: GameConfig) -> Self {
        let precedence = config.scripted_wave_precedence;
        Self {
            config,
            catalog: ItemCatalog::builtin(),
            bus: EventBus::new(),
            empires: BTreeMap::new(),
            attacks: AttackEngine::new(),
            ai: AiOpponent::new(builtin_wave_scripts(), precedence),
            next_bid: 1,
            telemetry: WorldTelemetry::default(),
        }
    }

    /// One world tick: advance every empire, advance every attack, and
    /// build a `BattleState` for each attack whose siege just completed.
    /// The caller owns the returned battles and runs their simulators.
    pub fn step(&mut self, dt_seconds: f64) -> Vec<BattleState> {
        let started_at = Instant::now();

        // 1. Empires: resources, build and research progress.
        let mut completions: Vec<(Uid, ItemId)> = Vec::new();
        for (uid, empire) in self.empires.iter_mut() {
            let completed =
                crate::empire::step(&self.catalog, &self.config, empire, dt_seconds);
            completions.extend(completed.into_iter().map(|iid| (*uid, iid)));
        }
        for (uid, iid) in &completions {
            tracing::info!(empire_uid = uid, %iid, "item completed");
            self.bus.emit(&GameEvent::ItemCompleted {
                empire_uid: *uid,
                iid: iid.clone(),
            });
            self.ai.on_item_completed(
                &self.config,
                &mut self.empires,
                &mut self.attacks,
                *uid,
                iid,
            );
        }

        // 2. Attacks: travel countdown, sieges, battle-entry signals.
        let entering_battle =
            self.attacks
                .step_all(&self.config, &self.empires, &self.bus, dt_seconds);

        // 3. Instantiate a battle per signalled attack.
        let mut battles = Vec::new();
        for attack in entering_battle {
            match self.instantiate_battle(&attack) {
                Some(battle) => battles.push(battle),
                None => {
                    tracing::warn!(
                        attack_id = attack.attack_id,
                        "battle could not be instantiated, attack dropped"
                    );
                    self.attacks.finish(attack.attack_id);
                }
            }
        }

        let work_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        self.telemetry.record(dt_seconds, work_ms);
        metrics::counter!("hexfort_world_ticks_total").increment(1);
        metrics::gauge!("hexfort_world_tick_work_ms").set(work_ms);
        metrics::gauge!("hexfort_active_attacks").set(self.attacks.attacks().len() as f64);
        metrics::gauge!("hexfort_active_empires").set(self.empires.len() as f64);

        battles
    }

    fn instantiate_battle(
        &mut self,
        attack: &hexfort_types::attack::Attack,
    ) -> Option<BattleState> {
        let army = self
            .empires
            .get(&attack.attacker_uid)?
            .army(attack.army_aid)?
            .clone();
        let defender = self.empires.get(&attack.defender_uid)?;
        let bid = self.next_bid;
        self.next_bid += 1;
        let battle = create_battle(&self.config, bid, attack, army, defender);
        tracing::info!(
            bid,
            attack_id = attack.attack_id,
            attacker_uid = attack.attacker_uid,
            defender_uid = attack.defender_uid,
            "battle instantiated"
        );
        metrics::counter!("hexfort_battles_started_total").increment(1);
        Some(battle)
    }

    /// Post-battle bookkeeping: loot transfer, attack finalisation, AI
    /// adaptation, and the `BattleFinished` announcement.
    pub fn on_battle_finished(&mut self, battle: &mut BattleState) {
        let defender_won = battle.defender_won.unwrap_or(true);

        apply_battle_resources(battle, &mut self.empires);
        loot_defender(&self.catalog, &self.config, battle, &mut self.empires);

        if let Some(attack_id) = battle.attack_id {
            self.ai.on_battle_finished(attack_id, defender_won);
            self.attacks.finish(attack_id);
        }

        self.bus.emit(&GameEvent::BattleFinished {
            battle_id: battle.bid,
            defender_won,
        });
        metrics::counter!("hexfort_battles_finished_total").increment(1);
        tracing::info!(bid = battle.bid, defender_won, "battle finished");
    }
}
