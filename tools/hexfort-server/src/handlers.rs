//! Request handlers — one function per client message family.
//!
//! Every handler returns a `ServerMessage` (or nothing, for fire-and-
//! forget messages). Precondition failures surface as
//! `{success: false, error}` responses rendered from the engine's error
//! values; nothing here panics on bad input.

use hexfort_engine::army as army_ops;
use hexfort_engine::empire as empire_ops;
use hexfort_engine::setup::new_empire;
use hexfort_engine::Outbound;
use hexfort_types::army::{SpyArmy, SpyOptions};
use hexfort_types::attack::AttackPhase;
use hexfort_types::messages::{
    ArmyView, AttackView, ClientMessage, RankingEntry, ServerMessage, SpyReport, StructureView,
    WavePreview,
};
use hexfort_types::{Aid, HexCoord, ItemId, Uid, AI_UID};

use crate::runtime::AppState;

/// Dispatch one parsed client message. `session_uid` is the connection's
/// bound identity; auth and signup set it.
pub fn handle_message(
    state: &AppState,
    session_uid: &mut Option<Uid>,
    msg: ClientMessage,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::AuthRequest { username, password } => {
            Some(auth(state, session_uid, &username, &password))
        }
        ClientMessage::Signup {
            username,
            password,
            empire_name,
            ..
        } => Some(signup(state, session_uid, &username, &password, &empire_name)),
        other => {
            let Some(uid) = *session_uid else {
                return Some(ServerMessage::Error {
                    message: "Not authenticated".to_string(),
                });
            };
            handle_authenticated(state, uid, other)
        }
    }
}

fn handle_authenticated(state: &AppState, uid: Uid, msg: ClientMessage) -> Option<ServerMessage> {
    match msg {
        ClientMessage::SummaryRequest {} => Some(summary(state, uid)),
        ClientMessage::ItemRequest {} => Some(items(state, uid)),
        ClientMessage::NewItem { iid } => Some(new_item(state, uid, &iid)),
        ClientMessage::NewStructure { iid, hex_q, hex_r } => {
            Some(new_structure(state, uid, &iid, HexCoord::new(hex_q, hex_r)))
        }
        ClientMessage::DeleteStructure { sid } => Some(delete_structure(state, uid, sid)),
        ClientMessage::UpgradeStructure { sid } => Some(upgrade_structure(state, uid, sid)),
        ClientMessage::CitizenUpgrade {} => Some(citizen_upgrade(state, uid)),
        ClientMessage::ChangeCitizen { citizens } => Some(change_citizen(state, uid, citizens)),
        ClientMessage::IncreaseLife {} => Some(increase_life(state, uid)),
        ClientMessage::MilitaryRequest {} => Some(military(state, uid)),
        ClientMessage::NewArmy { name } => Some(new_army(state, uid, &name)),
        ClientMessage::ChangeArmy { aid, name } => Some(change_army(state, uid, aid, name)),
        ClientMessage::NewWave { aid, critter_iid } => {
            Some(new_wave(state, uid, aid, critter_iid.as_ref()))
        }
        ClientMessage::ChangeWave {
            aid,
            wave_number,
            critter_iid,
            slots,
        } => Some(change_wave(state, uid, aid, wave_number, critter_iid.as_ref(), slots)),
        ClientMessage::NewAttackRequest {
            target_uid,
            army_aid,
            spy_options,
        } => Some(new_attack(state, uid, target_uid, army_aid, &spy_options)),
        ClientMessage::EndSiege {} => Some(end_siege(state, uid)),
        ClientMessage::BattleRegister { bid } => Some(battle_register(state, uid, bid)),
        ClientMessage::BattleUnregister { bid } => {
            battle_unregister(state, uid, bid);
            None
        }
        ClientMessage::UserMessage { to_uid, text } => {
            user_message(state, uid, to_uid, text);
            None
        }
        ClientMessage::TimelineRequest {} => Some(timeline(state, uid)),
        ClientMessage::UserinfoRequest { uid: target } => {
            Some(userinfo(state, target.unwrap_or(uid)))
        }
        ClientMessage::HallOfFameRequest {} => Some(hall_of_fame(state)),
        ClientMessage::PreferencesRequest {} => Some(preferences(state, uid)),
        ClientMessage::ChangePreferences { preferences } => {
            Some(change_preferences(state, uid, preferences))
        }
        ClientMessage::AuthRequest { .. } | ClientMessage::Signup { .. } => unreachable!(),
    }
}

// =============================================================================
// Auth
// =============================================================================

fn auth(
    state: &AppState,
    session_uid: &mut Option<Uid>,
    username: &str,
    password: &str,
) -> ServerMessage {
    match state.accounts.lock().unwrap().login(username, password) {
        Ok(uid) => {
            *session_uid = Some(uid);
            tracing::info!(uid, username, "login");
            ServerMessage::AuthResponse {
                success: true,
                uid,
                reason: String::new(),
            }
        }
        Err(reason) => ServerMessage::AuthResponse {
            success: false,
            uid: 0,
            reason,
        },
    }
}

fn signup(
    state: &AppState,
    session_uid: &mut Option<Uid>,
    username: &str,
    password: &str,
    empire_name: &str,
) -> ServerMessage {
    let result =
        state
            .accounts
            .lock()
            .unwrap()
            .signup(&state.config, username, password, empire_name);
    match result {
        Ok(uid) => {
            let empire_name = state
                .accounts
                .lock()
                .unwrap()
                .by_uid(uid)
                .map(|a| a.empire_name.clone())
                .unwrap_or_default();
            {
                let mut world = state.world.lock().unwrap();
                let empire = new_empire(&world.config, &world.catalog, uid, &empire_name);
                world.empires.insert(uid, empire);
            }
            *session_uid = Some(uid);
            tracing::info!(uid, username, "signup");
            ServerMessage::SignupResponse {
                success: true,
                uid,
                reason: String::new(),
            }
        }
        Err(reason) => ServerMessage::SignupResponse {
            success: false,
            uid: 0,
            reason,
        },
    }
}

// =============================================================================
// Empire queries & mutations
// =============================================================================

fn summary(state: &AppState, uid: Uid) -> ServerMessage {
    let world = state.world.lock().unwrap();
    let Some(empire) = world.empires.get(&uid) else {
        return missing_empire();
    };
    ServerMessage::SummaryResponse {
        resources: empire.resources.clone(),
        citizens: empire.citizens,
        total_citizens: empire.total_citizens,
        artefacts: empire.artefacts.clone(),
        effects: empire.effects.clone(),
        max_life: empire.max_life,
    }
}

fn items(state: &AppState, uid: Uid) -> ServerMessage {
    let world = state.world.lock().unwrap();
    let Some(empire) = world.empires.get(&uid) else {
        return missing_empire();
    };
    ServerMessage::ItemResponse {
        buildings: empire.buildings.clone(),
        knowledge: empire.knowledge.clone(),
    }
}

fn new_item(state: &AppState, uid: Uid, iid: &ItemId) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let world = &mut *world;
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    let result = empire_ops::build_item(&world.catalog, empire, iid);
    ServerMessage::BuildResponse {
        success: result.is_ok(),
        iid: iid.clone(),
        error: result.err().map(|e| e.to_string()).unwrap_or_default(),
        build_queue: empire.build_queue.clone(),
        research_queue: empire.research_queue.clone(),
    }
}

fn new_structure(state: &AppState, uid: Uid, iid: &ItemId, position: HexCoord) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let world = &mut *world;
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    match empire_ops::place_structure(&world.catalog, empire, iid, position) {
        Ok(sid) => ServerMessage::StructureResponse {
            success: true,
            sid,
            error: String::new(),
        },
        Err(error) => ServerMessage::StructureResponse {
            success: false,
            sid: 0,
            error: error.to_string(),
        },
    }
}

fn delete_structure(state: &AppState, uid: Uid, sid: u64) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let world = &mut *world;
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    let result = empire_ops::remove_structure(&world.catalog, &world.config, empire, sid);
    ServerMessage::StructureResponse {
        success: result.is_ok(),
        sid,
        error: result.err().map(|e| e.to_string()).unwrap_or_default(),
    }
}

fn upgrade_structure(state: &AppState, uid: Uid, sid: u64) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let world = &mut *world;
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    let result = empire_ops::upgrade_structure(&world.catalog, empire, sid);
    ServerMessage::StructureResponse {
        success: result.is_ok(),
        sid,
        error: result.err().map(|e| e.to_string()).unwrap_or_default(),
    }
}

fn citizen_upgrade(state: &AppState, uid: Uid) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let world = &mut *world;
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    let result = empire_ops::upgrade_citizen(&world.config, empire);
    ServerMessage::CitizenResponse {
        success: result.is_ok(),
        error: result.err().map(|e| e.to_string()).unwrap_or_default(),
        citizens: empire.citizens,
        total_citizens: empire.total_citizens,
    }
}

fn change_citizen(
    state: &AppState,
    uid: Uid,
    citizens: hexfort_types::empire::Citizens,
) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    let result = empire_ops::change_citizens(empire, citizens);
    ServerMessage::CitizenResponse {
        success: result.is_ok(),
        error: result.err().map(|e| e.to_string()).unwrap_or_default(),
        citizens: empire.citizens,
        total_citizens: empire.total_citizens,
    }
}

fn increase_life(state: &AppState, uid: Uid) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let world = &mut *world;
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    match empire_ops::increase_life(&world.config, empire) {
        Ok(life) => ServerMessage::LifeResponse {
            success: true,
            error: String::new(),
            life,
        },
        Err(error) => ServerMessage::LifeResponse {
            success: false,
            error: error.to_string(),
            life: empire.life(),
        },
    }
}

// =============================================================================
// Military
// =============================================================================

fn attack_view(attack: &hexfort_types::attack::Attack) -> AttackView {
    let progress = match attack.phase {
        AttackPhase::Travelling => {
            if attack.total_eta_seconds > 0.0 {
                1.0 - attack.eta_seconds / attack.total_eta_seconds
            } else {
                1.0
            }
        }
        AttackPhase::InSiege => {
            if attack.total_siege_seconds > 0.0 {
                1.0 - attack.siege_remaining_seconds / attack.total_siege_seconds
            } else {
                1.0
            }
        }
        AttackPhase::InBattle | AttackPhase::Finished => 1.0,
    };
    AttackView {
        attack_id: attack.attack_id,
        attacker_uid: attack.attacker_uid,
        defender_uid: attack.defender_uid,
        phase: attack.phase,
        progress: progress.clamp(0.0, 1.0),
    }
}

fn military(state: &AppState, uid: Uid) -> ServerMessage {
    let world = state.world.lock().unwrap();
    let Some(empire) = world.empires.get(&uid) else {
        return missing_empire();
    };
    let armies = empire
        .armies
        .iter()
        .map(|army| ArmyView {
            aid: army.aid,
            name: army.name.clone(),
            waves: army
                .waves
                .iter()
                .map(|w| WavePreview {
                    wave_id: w.wave_id,
                    critter_iid: w.critter_iid.clone(),
                    slots: w.slots,
                })
                .collect(),
        })
        .collect();
    let available_critters = world
        .catalog
        .available_critters(&empire.completed_items())
        .iter()
        .map(|item| item.iid.clone())
        .collect();
    let attacks_incoming = world
        .attacks
        .attacks()
        .iter()
        .filter(|a| a.defender_uid == uid)
        .map(attack_view)
        .collect();
    let attacks_outgoing = world
        .attacks
        .attacks()
        .iter()
        .filter(|a| a.attacker_uid == uid)
        .map(attack_view)
        .collect();

    ServerMessage::MilitaryResponse {
        armies,
        available_critters,
        attacks_incoming,
        attacks_outgoing,
    }
}

fn new_army(state: &AppState, uid: Uid, name: &str) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    let aid = army_ops::create_army(empire, name);
    ServerMessage::ArmyResponse {
        success: true,
        aid,
        error: String::new(),
    }
}

fn change_army(state: &AppState, uid: Uid, aid: Aid, name: Option<String>) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    let result = match name {
        Some(name) => army_ops::rename_army(empire, aid, &name),
        None => Ok(()),
    };
    ServerMessage::ArmyResponse {
        success: result.is_ok(),
        aid,
        error: result.err().map(|e| e.to_string()).unwrap_or_default(),
    }
}

fn new_wave(state: &AppState, uid: Uid, aid: Aid, critter_iid: Option<&ItemId>) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let world = &mut *world;
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    let result = army_ops::add_wave(&world.catalog, empire, aid, critter_iid);
    ServerMessage::ArmyResponse {
        success: result.is_ok(),
        aid,
        error: result.err().map(|e| e.to_string()).unwrap_or_default(),
    }
}

fn change_wave(
    state: &AppState,
    uid: Uid,
    aid: Aid,
    wave_number: u32,
    critter_iid: Option<&ItemId>,
    slots: Option<u32>,
) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let world = &mut *world;
    let Some(empire) = world.empires.get_mut(&uid) else {
        return missing_empire();
    };
    let result = army_ops::change_wave(
        &world.catalog,
        &world.config,
        empire,
        aid,
        wave_number,
        critter_iid,
        slots,
    );
    ServerMessage::ArmyResponse {
        success: result.is_ok(),
        aid,
        error: result.err().map(|e| e.to_string()).unwrap_or_default(),
    }
}

// =============================================================================
// Attacks
// =============================================================================

fn new_attack(
    state: &AppState,
    uid: Uid,
    target_uid: Uid,
    army_aid: Aid,
    spy_options: &[String],
) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    let world = &mut *world;

    // Resolve spy options up front so a bad request costs nothing.
    let mut flags = SpyOptions::empty();
    let mut spy_cost = 0.0;
    for name in spy_options {
        let Some(flag) = SpyOptions::from_wire_name(name) else {
            return attack_error(format!("Unknown spy option {name}"));
        };
        flags |= flag;
        let costs = &world.config.spy_costs;
        spy_cost += if flag == SpyOptions::DEFENSE {
            costs.defense
        } else if flag == SpyOptions::BUILD_QUEUE {
            costs.build_queue
        } else if flag == SpyOptions::RESEARCH_QUEUE {
            costs.research_queue
        } else if flag == SpyOptions::ATTACKS {
            costs.attacks
        } else {
            costs.artefacts
        };
    }
    if spy_cost > 0.0 {
        let Some(attacker) = world.empires.get(&uid) else {
            return missing_empire();
        };
        if attacker.resource("gold") < spy_cost {
            return attack_error("Not enough gold".to_string());
        }
    }

    let attack_id =
        match world
            .attacks
            .start_attack(&world.config, &world.empires, uid, target_uid, army_aid)
        {
            Ok(id) => id,
            Err(error) => return attack_error(error.to_string()),
        };

    let mut spy_report = None;
    if !flags.is_empty() {
        if let Some(attacker) = world.empires.get_mut(&uid) {
            *attacker.resources.entry("gold".to_string()).or_insert(0.0) -= spy_cost;
            let aid = attacker.next_aid;
            attacker.next_aid += 1;
            attacker.spies.push(SpyArmy {
                aid,
                owner_uid: uid,
                options: flags,
            });
        }
        spy_report = Some(build_spy_report(world, target_uid, flags));
    }

    ServerMessage::AttackResponse {
        success: true,
        attack_id,
        error: String::new(),
        spy_report,
    }
}

fn build_spy_report(
    world: &hexfort_engine::WorldState,
    target_uid: Uid,
    flags: SpyOptions,
) -> SpyReport {
    let mut report = SpyReport::default();
    let Some(target) = world.empires.get(&target_uid) else {
        return report;
    };
    if flags.contains(SpyOptions::DEFENSE) {
        report.defense = Some(target.structures.values().map(StructureView::of).collect());
    }
    if flags.contains(SpyOptions::BUILD_QUEUE) {
        report.build_queue = Some(target.build_queue.clone());
    }
    if flags.contains(SpyOptions::RESEARCH_QUEUE) {
        report.research_queue = Some(target.research_queue.clone());
    }
    if flags.contains(SpyOptions::ATTACKS) {
        report.attacks = Some(
            world
                .attacks
                .attacks()
                .iter()
                .filter(|a| a.defender_uid == target_uid || a.attacker_uid == target_uid)
                .map(attack_view)
                .collect(),
        );
    }
    if flags.contains(SpyOptions::ARTEFACTS) {
        report.artefacts = Some(target.artefacts.clone());
    }
    report
}

fn end_siege(state: &AppState, uid: Uid) -> ServerMessage {
    let mut world = state.world.lock().unwrap();
    match world.attacks.end_siege(uid) {
        Ok(_) => ServerMessage::SiegeResponse {
            success: true,
            error: String::new(),
        },
        Err(error) => ServerMessage::SiegeResponse {
            success: false,
            error: error.to_string(),
        },
    }
}

// =============================================================================
// Battles
// =============================================================================

fn battle_register(state: &AppState, uid: Uid, bid: u64) -> ServerMessage {
    let battles = state.battles.lock().unwrap();
    let Some(battle) = battles.get(&bid) else {
        return ServerMessage::Error {
            message: format!("Unknown battle {bid}"),
        };
    };
    let mut battle = battle.lock().unwrap();
    battle.observers.insert(uid);
    ServerMessage::battle_setup(&battle)
}

fn battle_unregister(state: &AppState, uid: Uid, bid: u64) {
    let battles = state.battles.lock().unwrap();
    if let Some(battle) = battles.get(&bid) {
        battle.lock().unwrap().observers.remove(&uid);
    }
}

// =============================================================================
// Social / info
// =============================================================================

fn user_message(state: &AppState, from_uid: Uid, to_uid: Uid, text: String) {
    let delivered = state
        .hub
        .send(to_uid, &ServerMessage::UserMessage { from_uid, text });
    if !delivered {
        tracing::debug!(from_uid, to_uid, "user message dropped, recipient offline");
    }
}

fn timeline(state: &AppState, uid: Uid) -> ServerMessage {
    let world = state.world.lock().unwrap();
    let entries = world
        .attacks
        .attacks()
        .iter()
        .filter(|a| a.attacker_uid == uid || a.defender_uid == uid)
        .map(|a| {
            let role = if a.attacker_uid == uid { "outgoing" } else { "incoming" };
            format!(
                "{role} attack #{} ({:?})",
                a.attack_id, a.phase
            )
        })
        .collect();
    ServerMessage::TimelineResponse { entries }
}

fn userinfo(state: &AppState, uid: Uid) -> ServerMessage {
    let world = state.world.lock().unwrap();
    let Some(empire) = world.empires.get(&uid) else {
        return missing_empire();
    };
    ServerMessage::UserinfoResponse {
        uid,
        name: empire.name.clone(),
        empire_score: world.ai.assess_player(&world.catalog, empire),
    }
}

fn hall_of_fame(state: &AppState) -> ServerMessage {
    let world = state.world.lock().unwrap();
    let mut rankings: Vec<RankingEntry> = world
        .empires
        .values()
        .filter(|e| e.uid != AI_UID)
        .map(|e| RankingEntry {
            uid: e.uid,
            name: e.name.clone(),
            score: world.ai.assess_player(&world.catalog, e),
        })
        .collect();
    rankings.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.uid.cmp(&b.uid))
    });
    ServerMessage::HallOfFameResponse { rankings }
}

fn preferences(state: &AppState, uid: Uid) -> ServerMessage {
    let accounts = state.accounts.lock().unwrap();
    ServerMessage::PreferencesResponse {
        preferences: accounts
            .by_uid(uid)
            .map(|a| a.preferences.clone())
            .unwrap_or_default(),
    }
}

fn change_preferences(
    state: &AppState,
    uid: Uid,
    preferences: std::collections::BTreeMap<String, String>,
) -> ServerMessage {
    let mut accounts = state.accounts.lock().unwrap();
    if let Some(account) = accounts.by_uid_mut(uid) {
        account.preferences = preferences.clone();
    }
    ServerMessage::PreferencesResponse { preferences }
}

// =============================================================================
// Helpers
// =============================================================================

fn missing_empire() -> ServerMessage {
    ServerMessage::Error {
        message: "Empire not found".to_string(),
    }
}

fn attack_error(error: String) -> ServerMessage {
    ServerMessage::AttackResponse {
        success: false,
        attack_id: 0,
        error,
        spy_report: None,
    }
}
