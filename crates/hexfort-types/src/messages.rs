//! Wire protocol — tagged client ↔ server message shapes.
//!
//! Every frame is a JSON object with a mandatory `type` discriminator and
//! an optional `request_id` that the server echoes back (the echo is
//! injected at the transport layer, not carried in these enums). Unknown
//! types and malformed frames yield a structured `error` response; the
//! connection stays open.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attack::AttackPhase;
use crate::battle::BattleState;
use crate::effect::{EffectMap, ResourceMap};
use crate::empire::{Citizens, Structure};
use crate::ids::{Aid, AttackId, Bid, Cid, ItemId, Sid, Uid};
use crate::item::ShotKind;

// =============================================================================
// Client → Server
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    AuthRequest {
        username: String,
        password: String,
    },
    Signup {
        username: String,
        password: String,
        #[serde(default)]
        email: String,
        #[serde(default)]
        empire_name: String,
    },
    SummaryRequest {},
    ItemRequest {},
    NewItem {
        iid: ItemId,
    },
    NewStructure {
        iid: ItemId,
        hex_q: i32,
        hex_r: i32,
    },
    DeleteStructure {
        sid: Sid,
    },
    UpgradeStructure {
        sid: Sid,
    },
    CitizenUpgrade {},
    ChangeCitizen {
        citizens: Citizens,
    },
    IncreaseLife {},
    MilitaryRequest {},
    NewArmy {
        name: String,
    },
    ChangeArmy {
        aid: Aid,
        #[serde(default)]
        name: Option<String>,
    },
    NewWave {
        aid: Aid,
        #[serde(default)]
        critter_iid: Option<ItemId>,
    },
    ChangeWave {
        aid: Aid,
        wave_number: u32,
        #[serde(default)]
        critter_iid: Option<ItemId>,
        #[serde(default)]
        slots: Option<u32>,
    },
    NewAttackRequest {
        target_uid: Uid,
        army_aid: Aid,
        #[serde(default)]
        spy_options: Vec<String>,
    },
    EndSiege {},
    BattleRegister {
        bid: Bid,
    },
    BattleUnregister {
        bid: Bid,
    },
    UserMessage {
        to_uid: Uid,
        text: String,
    },
    TimelineRequest {},
    UserinfoRequest {
        #[serde(default)]
        uid: Option<Uid>,
    },
    HallOfFameRequest {},
    PreferencesRequest {},
    ChangePreferences {
        preferences: BTreeMap<String, String>,
    },
}

// =============================================================================
// Server → Client
// =============================================================================

/// Client-facing critter snapshot inside a battle update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritterView {
    pub cid: Cid,
    pub iid: ItemId,
    pub health: f64,
    pub max_health: f64,
    pub path_progress: f64,
    pub slow_remaining_ms: f64,
    pub burn_remaining_ms: f64,
    pub scale: f64,
}

/// Client-facing in-flight shot snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotView {
    pub source_sid: i64,
    pub target_cid: Cid,
    pub shot_type: ShotKind,
    pub path_progress: f64,
    pub origin_q: i32,
    pub origin_r: i32,
}

/// Client-facing structure summary (battle setup, spy reports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureView {
    pub sid: Sid,
    pub iid: ItemId,
    pub q: i32,
    pub r: i32,
    pub range: u32,
}

impl StructureView {
    pub fn of(s: &Structure) -> Self {
        Self {
            sid: s.sid,
            iid: s.iid.clone(),
            q: s.position.q,
            r: s.position.r,
            range: s.range,
        }
    }
}

/// One wave of the attacking army, previewed at battle setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavePreview {
    pub wave_id: u32,
    pub critter_iid: ItemId,
    pub slots: u32,
}

/// An attack as seen in military overviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackView {
    pub attack_id: AttackId,
    pub attacker_uid: Uid,
    pub defender_uid: Uid,
    pub phase: AttackPhase,
    /// Phase progress in [0, 1] (travel or siege).
    pub progress: f64,
}

/// One army as seen in military overviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmyView {
    pub aid: Aid,
    pub name: String,
    pub waves: Vec<WavePreview>,
}

/// Intelligence delivered by a spy army.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpyReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<Vec<StructureView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_queue: Option<Option<ItemId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_queue: Option<Option<ItemId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attacks: Option<Vec<AttackView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artefacts: Option<Vec<ItemId>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub uid: Uid,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    AuthResponse {
        success: bool,
        uid: Uid,
        reason: String,
    },
    SignupResponse {
        success: bool,
        uid: Uid,
        reason: String,
    },
    SummaryResponse {
        resources: ResourceMap,
        citizens: Citizens,
        total_citizens: u32,
        artefacts: Vec<ItemId>,
        effects: EffectMap,
        max_life: f64,
    },
    ItemResponse {
        buildings: BTreeMap<ItemId, f64>,
        knowledge: BTreeMap<ItemId, f64>,
    },
    BuildResponse {
        success: bool,
        iid: ItemId,
        error: String,
        build_queue: Option<ItemId>,
        research_queue: Option<ItemId>,
    },
    StructureResponse {
        success: bool,
        sid: Sid,
        error: String,
    },
    CitizenResponse {
        success: bool,
        error: String,
        citizens: Citizens,
        total_citizens: u32,
    },
    LifeResponse {
        success: bool,
        error: String,
        life: f64,
    },
    MilitaryResponse {
        armies: Vec<ArmyView>,
        available_critters: Vec<ItemId>,
        attacks_incoming: Vec<AttackView>,
        attacks_outgoing: Vec<AttackView>,
    },
    ArmyResponse {
        success: bool,
        aid: Aid,
        error: String,
    },
    AttackResponse {
        success: bool,
        attack_id: AttackId,
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spy_report: Option<SpyReport>,
    },
    SiegeResponse {
        success: bool,
        error: String,
    },
    BattleSetup {
        bid: Bid,
        defender_uid: Uid,
        structures: Vec<StructureView>,
        path: Vec<(i32, i32)>,
        wave_preview: Vec<WavePreview>,
    },
    BattleUpdate {
        bid: Bid,
        elapsed_ms: f64,
        critters: Vec<CritterView>,
        shots: Vec<ShotView>,
    },
    BattleSummary {
        bid: Bid,
        defender_won: bool,
        attacker_gains: BTreeMap<Uid, ResourceMap>,
        defender_losses: ResourceMap,
    },
    UserMessage {
        from_uid: Uid,
        text: String,
    },
    TimelineResponse {
        entries: Vec<String>,
    },
    UserinfoResponse {
        uid: Uid,
        name: String,
        empire_score: f64,
    },
    HallOfFameResponse {
        rankings: Vec<RankingEntry>,
    },
    PreferencesResponse {
        preferences: BTreeMap<String, String>,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// Build a `battle_update` delta from the battle's current state.
    pub fn battle_update(battle: &BattleState) -> Self {
        let critters = battle
            .critters
            .values()
            .map(|c| CritterView {
                cid: c.cid,
                iid: c.iid.clone(),
                health: c.health,
                max_health: c.max_health,
                path_progress: c.path_progress,
                slow_remaining_ms: c.slow_remaining_ms.max(0.0),
                burn_remaining_ms: c.burn_remaining_ms.max(0.0),
                scale: c.scale,
            })
            .collect();
        let shots = battle
            .pending_shots
            .iter()
            .map(|s| ShotView {
                source_sid: s.source_sid,
                target_cid: s.target_cid,
                shot_type: s.kind,
                path_progress: s.progress,
                origin_q: s.origin.q,
                origin_r: s.origin.r,
            })
            .collect();
        Self::BattleUpdate {
            bid: battle.bid,
            elapsed_ms: battle.elapsed_ms,
            critters,
            shots,
        }
    }

    /// Build the final `battle_summary` for a finished battle.
    pub fn battle_summary(battle: &BattleState) -> Self {
        Self::BattleSummary {
            bid: battle.bid,
            defender_won: battle.defender_won.unwrap_or(true),
            attacker_gains: battle.attacker_gains.clone(),
            defender_losses: battle.defender_losses.clone(),
        }
    }

    /// Build the `battle_setup` sent to newly registered observers.
    pub fn battle_setup(battle: &BattleState) -> Self {
        Self::BattleSetup {
            bid: battle.bid,
            defender_uid: battle.defender_uid,
            structures: battle.structures.values().map(StructureView::of).collect(),
            path: battle.path.iter().map(|h| (h.q, h.r)).collect(),
            wave_preview: battle
                .army
                .waves
                .iter()
                .map(|w| WavePreview {
                    wave_id: w.wave_id,
                    critter_iid: w.critter_iid.clone(),
                    slots: w.slots,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_round_trip() {
        let json = r#"{"type":"new_item","iid":"FIRE_PLACE"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::NewItem { iid } => assert_eq!(iid.as_str(), "FIRE_PLACE"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let json = r#"{"type":"frobnicate"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn server_message_tags() {
        let msg = ServerMessage::Error {
            message: "nope".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"error""#));
    }
}
