//! Long-running tasks: the world loop, one simulator task per battle,
//! and the periodic snapshot writer.
//!
//! All game state lives behind `AppState`. The world loop ticks the
//! deterministic `WorldState::step` once per `step_length_ms`; each battle
//! task ticks its own `BattleState` every ~15 ms, locking the world only
//! to touch the defender's resources. Everything observes the shared stop
//! flag.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::time::Duration;

use hexfort_engine::battle;
use hexfort_engine::snapshot::Snapshot;
use hexfort_engine::{Outbound, WorldState};
use hexfort_types::battle::BattleState;
use hexfort_types::config::GameConfig;
use hexfort_types::messages::ServerMessage;
use hexfort_types::Bid;

use crate::accounts::AccountStore;
use crate::session::SessionHub;

/// Shared server state handed to every task and request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: GameConfig,
    pub world: Arc<Mutex<WorldState>>,
    pub hub: Arc<SessionHub>,
    pub accounts: Arc<Mutex<AccountStore>>,
    /// Battles currently simulating, shared so handlers can manage
    /// observer registrations.
    pub battles: Arc<Mutex<BTreeMap<Bid, Arc<Mutex<BattleState>>>>>,
    pub stop: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: GameConfig) -> Self {
        let world = WorldState::new(config.clone());
        Self {
            config,
            world: Arc::new(Mutex::new(world)),
            hub: Arc::new(SessionHub::new()),
            accounts: Arc::new(Mutex::new(AccountStore::new())),
            battles: Arc::new(Mutex::new(BTreeMap::new())),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

// =============================================================================
// World loop
// =============================================================================

/// Tick the world once per `step_length_ms` until the stop flag is set.
/// New battles are registered and get their own simulator task.
pub async fn run_world_loop(state: AppState) {
    let step = Duration::from_millis(state.config.step_length_ms as u64);
    let mut last = Instant::now();
    tracing::info!("world loop running");

    while !state.stop_requested() {
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64();
        last = now;

        let new_battles = state.world.lock().unwrap().step(dt);
        for battle_state in new_battles {
            spawn_battle(&state, battle_state);
        }

        tokio::time::sleep(step).await;
    }
    tracing::info!("world loop stopped");
}

/// Register a battle and launch its simulator task.
pub fn spawn_battle(state: &AppState, battle_state: BattleState) {
    let bid = battle_state.bid;
    let shared = Arc::new(Mutex::new(battle_state));
    state.battles.lock().unwrap().insert(bid, shared.clone());
    let state = state.clone();
    tokio::spawn(async move {
        run_battle(state, bid, shared).await;
    });
}

/// One battle simulator: tick, broadcast on the throttle, exit on finish
/// or external cancellation.
async fn run_battle(state: AppState, bid: Bid, shared: Arc<Mutex<BattleState>>) {
    let tick = Duration::from_millis(state.config.battle_tick_ms.max(1.0) as u64);
    let mut last = Instant::now();
    tracing::info!(bid, "battle loop running");

    loop {
        let now = Instant::now();
        let dt_ms = now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;

        let done = {
            let mut battle = shared.lock().unwrap();
            if state.stop_requested() {
                battle.keep_alive = false;
            }

            // The battle owns its state; the world lock is held only for
            // the duration of one tick to reach the defender's resources.
            {
                let mut world_guard = state.world.lock().unwrap();
                let world = &mut *world_guard;
                if let Some(defender) = world.empires.get_mut(&battle.defender_uid) {
                    battle::tick(&world.catalog, &mut battle, defender, dt_ms);
                } else {
                    // Defender vanished; void the battle in the defender's favor.
                    battle.is_finished = true;
                    battle.defender_won = Some(true);
                }
            }

            if battle.should_broadcast() && !battle.is_finished {
                let update = ServerMessage::battle_update(&battle);
                state.hub.broadcast(&battle.observers, &update);
                battle.reset_broadcast();
            }

            if battle.is_finished {
                let summary = ServerMessage::battle_summary(&battle);
                state.hub.broadcast(&battle.observers, &summary);
                state.world.lock().unwrap().on_battle_finished(&mut battle);
                true
            } else if !battle.keep_alive {
                // External cancellation: emit what we know and exit.
                let summary = ServerMessage::battle_summary(&battle);
                state.hub.broadcast(&battle.observers, &summary);
                true
            } else {
                false
            }
        };

        if done {
            state.battles.lock().unwrap().remove(&bid);
            tracing::info!(bid, "battle loop exited");
            return;
        }
        tokio::time::sleep(tick).await;
    }
}

// =============================================================================
// Snapshots
// =============================================================================

/// Periodically capture the world to disk. Also writes a final snapshot
/// when the stop flag is raised.
pub async fn run_snapshot_loop(state: AppState, path: PathBuf, interval_seconds: u64) {
    let interval = Duration::from_secs(interval_seconds.max(1));
    loop {
        tokio::time::sleep(interval).await;
        write_snapshot(&state, &path);
        if state.stop_requested() {
            return;
        }
    }
}

pub fn write_snapshot(state: &AppState, path: &std::path::Path) {
    let snapshot = Snapshot::capture(&state.world.lock().unwrap());
    match snapshot.save(path) {
        Ok(()) => tracing::debug!(?path, "snapshot written"),
        Err(error) => tracing::error!(?path, %error, "snapshot write failed"),
    }
}
