//! Gameplay configuration — every tunable constant, loadable from JSON.
//!
//! Each field has a sensible default so the server can start without a
//! config file. Loading is the caller's business (the server binary reads
//! a JSON file via serde); the engine only ever sees this struct.

use serde::{Deserialize, Serialize};

/// Gold costs for spy operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpyCosts {
    pub defense: f64,
    pub build_queue: f64,
    pub research_queue: f64,
    pub attacks: f64,
    pub artefacts: f64,
}

impl Default for SpyCosts {
    fn default() -> Self {
        Self {
            defense: 500.0,
            build_queue: 1000.0,
            research_queue: 2000.0,
            attacks: 5000.0,
            artefacts: 10000.0,
        }
    }
}

/// Which scripted wave wins when several match at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedWavePrecedence {
    /// Later entries are more specific and win.
    #[default]
    LastMatch,
    FirstMatch,
}

/// All tunable gameplay constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // -- Timing ------------------------------------------------------
    /// World loop tick interval.
    pub step_length_ms: f64,
    /// Battle simulator tick interval.
    pub battle_tick_ms: f64,
    /// Minimum interval between battle broadcast updates.
    pub broadcast_interval_ms: f64,
    /// Minimum battle duration before finish checks.
    pub min_keep_alive_ms: f64,
    /// Delay before each wave after the first.
    pub initial_wave_delay_ms: f64,
    /// Flight time for splash sub-shots.
    pub splash_flight_ms: f64,

    // -- Economy -----------------------------------------------------
    pub base_gold_per_sec: f64,
    pub base_culture_per_sec: f64,
    /// Per-citizen resource generation modifier.
    pub citizen_effect: f64,
    /// Gold cost of the first citizen; scales linearly with the total.
    pub citizen_base_cost: f64,
    /// Gold cost to restore one life point.
    pub life_cost: f64,
    /// Fraction of a structure's cost refunded on removal.
    pub structure_refund: f64,

    // -- New empire defaults -----------------------------------------
    pub starting_gold: f64,
    pub starting_culture: f64,
    pub starting_life: f64,
    pub starting_max_life: f64,

    // -- Travel & siege ----------------------------------------------
    /// Base travel time in seconds.
    pub base_travel_seconds: f64,
    /// Base siege duration in seconds.
    pub base_siege_seconds: f64,

    // -- Armies ------------------------------------------------------
    /// Base slot capacity of a wave, before slot_offset effects.
    pub wave_slot_base: u32,

    // -- Battle loot -------------------------------------------------
    pub min_lose_knowledge: f64,
    pub max_lose_knowledge: f64,
    pub min_lose_culture: f64,
    pub max_lose_culture: f64,
    pub artefact_steal_chance: f64,

    // -- AI ----------------------------------------------------------
    /// Travel time for AI attacks in seconds.
    pub ai_travel_seconds: f64,
    pub scripted_wave_precedence: ScriptedWavePrecedence,

    // -- Spy costs ---------------------------------------------------
    pub spy_costs: SpyCosts,

    // -- Account validation ------------------------------------------
    pub min_username_length: usize,
    pub max_username_length: usize,
    pub min_password_length: usize,

    // -- Network -----------------------------------------------------
    pub port: u16,
    /// Per-session outbound buffer; messages beyond it are dropped.
    pub session_buffer: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            step_length_ms: 1000.0,
            battle_tick_ms: 15.0,
            broadcast_interval_ms: 250.0,
            min_keep_alive_ms: 10_000.0,
            initial_wave_delay_ms: 15_000.0,
            splash_flight_ms: 500.0,

            base_gold_per_sec: 1.0,
            base_culture_per_sec: 0.5,
            citizen_effect: 0.03,
            citizen_base_cost: 100.0,
            life_cost: 50.0,
            structure_refund: 0.5,

            starting_gold: 0.0,
            starting_culture: 0.0,
            starting_life: 10.0,
            starting_max_life: 10.0,

            base_travel_seconds: 300.0,
            base_siege_seconds: 900.0,

            wave_slot_base: 10,

            min_lose_knowledge: 0.03,
            max_lose_knowledge: 0.15,
            min_lose_culture: 0.01,
            max_lose_culture: 0.05,
            artefact_steal_chance: 0.33,

            ai_travel_seconds: 30.0,
            scripted_wave_precedence: ScriptedWavePrecedence::LastMatch,

            spy_costs: SpyCosts::default(),

            min_username_length: 2,
            max_username_length: 20,
            min_password_length: 4,

            port: 8765,
            session_buffer: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.step_length_ms, 1000.0);
        assert_eq!(cfg.battle_tick_ms, 15.0);
        assert!(cfg.min_lose_knowledge <= cfg.max_lose_knowledge);
        assert!(cfg.min_lose_culture <= cfg.max_lose_culture);
    }
}
