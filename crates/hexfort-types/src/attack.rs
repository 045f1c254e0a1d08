//! Attack state — the travel → siege → battle → finished state machine data.

use serde::{Deserialize, Serialize};

use crate::ids::{Aid, AttackId, Uid};

/// Phases of an attack. Progression is strictly monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackPhase {
    Travelling,
    InSiege,
    InBattle,
    Finished,
}

/// State of an in-progress attack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attack {
    pub attack_id: AttackId,
    pub attacker_uid: Uid,
    pub defender_uid: Uid,
    pub army_aid: Aid,
    pub phase: AttackPhase,

    /// Remaining travel time in seconds.
    pub eta_seconds: f64,
    /// Initial travel time, kept for progress display.
    pub total_eta_seconds: f64,
    /// Remaining siege countdown in seconds.
    pub siege_remaining_seconds: f64,
    /// Initial siege duration, kept for progress display.
    pub total_siege_seconds: f64,
}

impl Attack {
    pub fn new(
        attack_id: AttackId,
        attacker_uid: Uid,
        defender_uid: Uid,
        army_aid: Aid,
        eta_seconds: f64,
    ) -> Self {
        Self {
            attack_id,
            attacker_uid,
            defender_uid,
            army_aid,
            phase: AttackPhase::Travelling,
            eta_seconds,
            total_eta_seconds: eta_seconds,
            siege_remaining_seconds: 0.0,
            total_siege_seconds: 0.0,
        }
    }
}
