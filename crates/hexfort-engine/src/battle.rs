//! Battle runtime — the fine-tick tower-defense simulator.
//!
//! One `BattleState` per battle, advanced by the deterministic
//! `tick(catalog, battle, defender, dt_ms)`. Phases run in a fixed order:
//!
//! 1. shots    — decrement flight time, apply damage and effects on arrival
//! 2. critters — movement along the path, burn ticks, death/finish handling
//! 3. towers   — reload countdown, target acquisition, firing
//! 4. armies   — wave timers, critter spawning
//! 5. bookkeeping — elapsed/broadcast timers, finish conditions
//!
//! Critters and structures are iterated in cid/sid order, so the same
//! state ticked by the same dt always yields the same next state. The
//! simulator may only mutate the defender's resources (life and loot
//! keys); buildings, research and armies are off limits mid-battle.

use hexfort_types::attack::Attack;
use hexfort_types::army::Army;
use hexfort_types::battle::{
    BattleState, Critter, RemovalReason, RemovedCritter, Shot, SPLASH_SOURCE_SID,
};
use hexfort_types::config::GameConfig;
use hexfort_types::effect::{self, ResourceMap};
use hexfort_types::empire::Empire;
use hexfort_types::{Bid, Cid, HexCoord, ItemDef, RngState, ShotKind};

use hexfort_data::ItemCatalog;

use crate::pathfinding::find_path_from_spawn_to_castle;

// =============================================================================
// Construction
// =============================================================================

/// Instantiate a battle from an attack that finished its siege.
///
/// The attacking army is snapshotted (spawn counters reset, wave delays
/// seeded), the defender's structures are copied with transient state
/// cleared, and the critter path is computed from the defender's hex map.
/// When the castle is unreachable the battle is born finished with the
/// defender winning, since nothing can reach the castle.
pub fn create_battle(
    config: &GameConfig,
    bid: Bid,
    attack: &Attack,
    army: Army,
    defender: &Empire,
) -> BattleState {
    let mut army = army;
    for (i, wave) in army.waves.iter_mut().enumerate() {
        wave.spawned = 0;
        wave.next_spawn_ms = if i == 0 { 0.0 } else { config.initial_wave_delay_ms };
    }

    let mut structures = defender.structures.clone();
    for structure in structures.values_mut() {
        structure.reset_transient();
    }

    let path = find_path_from_spawn_to_castle(&defender.hex_map).unwrap_or_default();
    let unreachable = path.len() < 2;
    if unreachable {
        tracing::warn!(bid, defender_uid = defender.uid, "castle unreachable, battle void");
    }

    BattleState {
        bid,
        defender_uid: defender.uid,
        attacker_uids: vec![attack.attacker_uid],
        attack_id: Some(attack.attack_id),
        army,
        structures,
        path,
        critters: Default::default(),
        pending_shots: Vec::new(),
        next_cid: 1,
        rng: RngState::new(bid as u32),
        elapsed_ms: 0.0,
        broadcast_timer_ms: config.broadcast_interval_ms,
        broadcast_interval_ms: config.broadcast_interval_ms,
        min_keep_alive_ms: config.min_keep_alive_ms,
        inter_wave_delay_ms: config.initial_wave_delay_ms,
        splash_flight_ms: config.splash_flight_ms,
        keep_alive: !unreachable,
        is_finished: unreachable,
        defender_won: unreachable.then_some(true),
        observers: Default::default(),
        journal: Default::default(),
        removed_critters: Vec::new(),
        attacker_gains: Default::default(),
        defender_losses: ResourceMap::new(),
    }
}

/// Copy a catalogue critter into a live battle instance.
pub fn critter_from_item(cid: Cid, item: &ItemDef, path_progress: f64) -> Critter {
    Critter {
        cid,
        iid: item.iid.clone(),
        health: item.health,
        max_health: item.health,
        speed: item.speed,
        armour: item.armour,
        value: item.value,
        scale: item.scale,
        path_progress,
        capture: item.capture.clone(),
        bonus: item.bonus.clone(),
        spawn_on_death: item.spawn_on_death.clone(),
        slow_remaining_ms: 0.0,
        slow_speed: 0.0,
        burn_remaining_ms: 0.0,
        burn_dps: 0.0,
    }
}

// =============================================================================
// Tick
// =============================================================================

/// One deterministic battle tick.
pub fn tick(catalog: &ItemCatalog, battle: &mut BattleState, defender: &mut Empire, dt_ms: f64) {
    step_shots(battle, dt_ms);
    step_critters(catalog, battle, defender, dt_ms);
    step_towers(battle, dt_ms);
    step_armies(catalog, battle, dt_ms);

    battle.elapsed_ms += dt_ms;
    battle.broadcast_timer_ms -= dt_ms;
    check_finished(battle, defender);
}

// -- Shots phase ---------------------------------------------------------

fn step_shots(battle: &mut BattleState, dt_ms: f64) {
    let mut arrived = Vec::new();
    for shot in battle.pending_shots.iter_mut() {
        if shot.total_flight_ms <= 0.0 {
            // First touch of a shot restored without a total; derive it.
            shot.total_flight_ms = shot.flight_remaining_ms.max(dt_ms);
        }
        shot.flight_remaining_ms -= dt_ms;
        shot.progress = (1.0 - shot.flight_remaining_ms / shot.total_flight_ms).clamp(0.0, 1.0);
    }

    let mut index = 0;
    while index < battle.pending_shots.len() {
        if battle.pending_shots[index].flight_remaining_ms <= 0.0 {
            let shot = battle.pending_shots.remove(index);
            arrived.push(shot);
        } else {
            index += 1;
        }
    }

    for shot in arrived {
        apply_shot(battle, &shot);
    }
}

/// Apply an arrived shot to its target, if it still exists, and resolve
/// per-kind side effects. The shot is gone either way.
pub fn apply_shot(battle: &mut BattleState, shot: &Shot) {
    let path_len = battle.path.len();
    let Some(critter) = battle.critters.get_mut(&shot.target_cid) else {
        return;
    };

    match shot.kind {
        ShotKind::Normal => {
            critter.health -= (shot.damage - critter.armour).max(0.0);
        }
        ShotKind::Cold => {
            critter.health -= (shot.damage - critter.armour).max(0.0);
            let factor = effect::effect(&shot.effects, effect::SLOW_TARGET);
            let duration_s = effect::effect(&shot.effects, effect::SLOW_TARGET_DURATION);
            critter.slow_remaining_ms = duration_s * 1000.0;
            critter.slow_speed = critter.speed * factor;
        }
        ShotKind::Burn => {
            // Burn bypasses armour.
            critter.health -= shot.damage;
            critter.burn_dps = effect::effect(&shot.effects, effect::BURN_TARGET_DPS);
            critter.burn_remaining_ms =
                effect::effect(&shot.effects, effect::BURN_TARGET_DURATION) * 1000.0;
        }
        ShotKind::Splash => {
            critter.health -= (shot.damage - critter.armour).max(0.0);
            let impact = battle.path.get(critter.path_index(path_len)).copied();
            if let Some(impact) = impact {
                splash_sub_shots(battle, shot, impact);
            }
        }
    }
}

/// Enqueue Normal sub-shots against every other critter within the splash
/// radius of the impact hex.
fn splash_sub_shots(battle: &mut BattleState, shot: &Shot, impact: HexCoord) {
    let radius = effect::effect(&shot.effects, effect::SPLASH_RADIUS).max(1.0) as u32;
    let damage = effect::effect(&shot.effects, effect::SPLASH_DAMAGE);
    if damage <= 0.0 {
        return;
    }
    let path_len = battle.path.len();
    let targets: Vec<Cid> = battle
        .critters
        .values()
        .filter(|c| c.cid != shot.target_cid)
        .filter(|c| {
            battle
                .path
                .get(c.path_index(path_len))
                .map(|hex| hex.distance(impact) <= radius)
                .unwrap_or(false)
        })
        .map(|c| c.cid)
        .collect();
    for cid in targets {
        battle.pending_shots.push(Shot {
            damage,
            target_cid: cid,
            source_sid: SPLASH_SOURCE_SID,
            kind: ShotKind::Normal,
            effects: Default::default(),
            flight_remaining_ms: battle.splash_flight_ms,
            total_flight_ms: battle.splash_flight_ms,
            origin: impact,
            progress: 0.0,
        });
    }
}

// -- Critters phase ------------------------------------------------------

fn step_critters(
    catalog: &ItemCatalog,
    battle: &mut BattleState,
    defender: &mut Empire,
    dt_ms: f64,
) {
    let cids: Vec<Cid> = battle.critters.keys().copied().collect();
    let steps = battle.path.len().saturating_sub(1) as f64;
    let dt_s = dt_ms / 1000.0;

    for cid in cids {
        let Some(critter) = battle.critters.get_mut(&cid) else {
            continue;
        };

        if critter.is_alive() && !critter.is_finished() {
            if steps > 0.0 {
                critter.path_progress =
                    (critter.path_progress + critter.effective_speed() * dt_s / steps)
                        .clamp(0.0, 1.0);
            }

            if critter.burn_remaining_ms > 0.0 {
                let burn_ms = dt_ms.min(critter.burn_remaining_ms);
                critter.health -= critter.burn_dps * burn_ms / 1000.0;
                critter.burn_remaining_ms = (critter.burn_remaining_ms - dt_ms).max(0.0);
            }
            if critter.slow_remaining_ms > 0.0 {
                critter.slow_remaining_ms = (critter.slow_remaining_ms - dt_ms).max(0.0);
            }
        }

        let critter = &battle.critters[&cid];
        if !critter.is_alive() {
            critter_died(catalog, battle, defender, cid);
        } else if critter.is_finished() {
            critter_finished(battle, defender, cid);
        }
    }
}

/// A critter was killed: the defender collects its value in gold plus its
/// bonus map, and spawn-on-death children appear at the parent's position.
fn critter_died(catalog: &ItemCatalog, battle: &mut BattleState, defender: &mut Empire, cid: Cid) {
    let Some(critter) = battle.critters.remove(&cid) else {
        return;
    };

    *defender
        .resources
        .entry(effect::RES_GOLD.to_string())
        .or_insert(0.0) += critter.value;
    for (resource, amount) in &critter.bonus {
        *defender.resources.entry(resource.clone()).or_insert(0.0) += amount;
    }

    // Replacement critters start where the parent fell, never past the
    // goal; a child at progress 1 would finish inside the death handler.
    let child_progress = critter.path_progress.min(0.999);
    for (child_iid, count) in &critter.spawn_on_death {
        let Some(item) = catalog.get(child_iid) else {
            tracing::warn!(%child_iid, "spawn_on_death references unknown item");
            continue;
        };
        for _ in 0..*count {
            let child_cid = battle.alloc_cid();
            battle
                .critters
                .insert(child_cid, critter_from_item(child_cid, item, child_progress));
            battle.journal.spawned_cids.push(child_cid);
        }
    }

    let entry = RemovedCritter {
        cid,
        reason: RemovalReason::Died,
    };
    battle.journal.removed.push(entry.clone());
    battle.removed_critters.push(entry);
}

/// A critter reached the castle: the defender loses life, the attacker
/// collects the non-life capture keys.
fn critter_finished(battle: &mut BattleState, defender: &mut Empire, cid: Cid) {
    let Some(critter) = battle.critters.remove(&cid) else {
        return;
    };

    let life_damage = critter
        .capture
        .get(effect::RES_LIFE)
        .copied()
        .unwrap_or(1.0);
    let life = defender
        .resources
        .entry(effect::RES_LIFE.to_string())
        .or_insert(0.0);
    *life = (*life - life_damage).max(0.0);
    *battle
        .defender_losses
        .entry(effect::RES_LIFE.to_string())
        .or_insert(0.0) += life_damage;

    let attacker_uid = battle.army.owner_uid;
    for (resource, amount) in &critter.capture {
        if resource.as_str() != effect::RES_LIFE {
            *battle
                .attacker_gains
                .entry(attacker_uid)
                .or_default()
                .entry(resource.clone())
                .or_insert(0.0) += amount;
        }
    }

    let entry = RemovedCritter {
        cid,
        reason: RemovalReason::Finished,
    };
    battle.journal.removed.push(entry.clone());
    battle.removed_critters.push(entry);
}

// -- Towers phase --------------------------------------------------------

fn step_towers(battle: &mut BattleState, dt_ms: f64) {
    let path_len = battle.path.len();
    let sids: Vec<_> = battle.structures.keys().copied().collect();

    for sid in sids {
        let Some(structure) = battle.structures.get_mut(&sid) else {
            continue;
        };
        if structure.reload_remaining_ms > 0.0 {
            structure.reload_remaining_ms -= dt_ms;
        }
        if structure.reload_remaining_ms > 0.0 {
            continue;
        }

        // Most-advanced critter in range; cid order breaks ties low.
        let position = structure.position;
        let range = structure.range;
        let mut target: Option<(&Critter, HexCoord)> = None;
        for critter in battle.critters.values() {
            let Some(hex) = battle.path.get(critter.path_index(path_len)) else {
                continue;
            };
            if position.distance(*hex) > range {
                continue;
            }
            if target
                .map(|(best, _)| critter.path_progress > best.path_progress)
                .unwrap_or(true)
            {
                target = Some((critter, *hex));
            }
        }

        let Some((critter, hex)) = target else {
            continue;
        };
        let (target_cid, target_hex) = (critter.cid, hex);

        let Some(structure) = battle.structures.get_mut(&sid) else {
            continue;
        };
        let flight_ms = if structure.shot_speed > 0.0 {
            position.distance(target_hex) as f64 / structure.shot_speed * 1000.0
        } else {
            0.0
        };
        battle.pending_shots.push(Shot {
            damage: structure.damage,
            target_cid,
            source_sid: sid as i64,
            kind: structure.shot_kind,
            effects: structure.effects.clone(),
            flight_remaining_ms: flight_ms,
            total_flight_ms: flight_ms,
            origin: position,
            progress: 0.0,
        });
        structure.focus_cid = Some(target_cid);
        structure.reload_remaining_ms = structure.reload_time_ms;
        battle.journal.shots_fired.push((sid, target_cid));
    }
}

// -- Armies phase --------------------------------------------------------

/// Walk the waves in order; only the first un-dispatched wave counts down
/// and spawns. Waves after the first wait `inter_wave_delay_ms` once they
/// become active (their timers are seeded at battle creation).
fn step_armies(catalog: &ItemCatalog, battle: &mut BattleState, dt_ms: f64) {
    if battle.path.len() < 2 {
        return;
    }
    let Some(wave_index) = battle.army.waves.iter().position(|w| !w.is_dispatched()) else {
        return;
    };

    let wave = &mut battle.army.waves[wave_index];
    wave.next_spawn_ms -= dt_ms;
    if wave.next_spawn_ms > 0.0 {
        return;
    }

    let Some(item) = catalog.get(&wave.critter_iid) else {
        tracing::warn!(iid = %wave.critter_iid, "wave references unknown critter, skipping wave");
        wave.spawned = wave.slots;
        return;
    };
    wave.spawned += 1;
    wave.next_spawn_ms = item.spawn_interval_ms;

    let cid = battle.alloc_cid();
    battle
        .critters
        .insert(cid, critter_from_item(cid, item, 0.0));
    battle.journal.spawned_cids.push(cid);
}

// -- Finish conditions ---------------------------------------------------

/// A battle finishes when the defender runs out of life, or when every
/// wave has fully spawned and no critters remain. Neither may fire before
/// `min_keep_alive_ms` so short battles still render a visible sequence.
fn check_finished(battle: &mut BattleState, defender: &Empire) {
    if battle.is_finished || battle.elapsed_ms < battle.min_keep_alive_ms {
        return;
    }

    if defender.life() <= 0.0 {
        battle.is_finished = true;
        battle.keep_alive = false;
        battle.defender_won = Some(false);
        tracing::info!(bid = battle.bid, "battle finished, defender fell");
        return;
    }

    let all_dispatched = battle.army.is_dispatched();
    if all_dispatched && battle.critters.is_empty() {
        battle.is_finished = true;
        battle.keep_alive = false;
        battle.defender_won = Some(true);
        tracing::info!(bid = battle.bid, "battle finished, defender held");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexfort_types::army::CritterWave;
    use hexfort_types::empire::TileKind;

    fn lane_map(len: i32) -> std::collections::BTreeMap<String, TileKind> {
        let mut tiles = std::collections::BTreeMap::new();
        for q in 0..len {
            let kind = if q == 0 {
                TileKind::Spawnpoint
            } else if q == len - 1 {
                TileKind::Castle
            } else {
                TileKind::Path
            };
            tiles.insert(HexCoord::new(q, 0).key(), kind);
        }
        tiles
    }

    fn defender_with_map() -> Empire {
        let mut defender = Empire::new(1, "Defender");
        defender.hex_map = lane_map(4);
        defender
    }

    fn battle_with(army: Army, defender: &Empire) -> BattleState {
        let config = GameConfig {
            min_keep_alive_ms: 0.0,
            initial_wave_delay_ms: 1000.0,
            ..GameConfig::default()
        };
        let attack = Attack::new(1, 2, defender.uid, army.aid, 0.0);
        create_battle(&config, 1, &attack, army, defender)
    }

    fn test_critter(cid: Cid, health: f64, speed: f64, progress: f64) -> Critter {
        Critter {
            cid,
            iid: "TEST".into(),
            health,
            max_health: health,
            speed,
            armour: 0.0,
            value: 0.0,
            scale: 1.0,
            path_progress: progress,
            capture: Default::default(),
            bonus: Default::default(),
            spawn_on_death: Default::default(),
            slow_remaining_ms: 0.0,
            slow_speed: 0.0,
            burn_remaining_ms: 0.0,
            burn_dps: 0.0,
        }
    }

    #[test]
    fn critter_moves_along_path() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        // 4-hex path → 3 steps; speed 1.5 covers half the path per second.
        battle.critters.insert(1, test_critter(1, 10.0, 1.5, 0.0));

        tick(&catalog, &mut battle, &mut defender, 1000.0);
        let critter = &battle.critters[&1];
        assert!((critter.path_progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn finished_critter_damages_defender() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        let mut critter = test_critter(1, 5.0, 1.5, 0.99);
        critter.capture.insert("life".into(), 1.0);
        critter.capture.insert("gold".into(), 5.0);
        battle.critters.insert(1, critter);

        tick(&catalog, &mut battle, &mut defender, 200.0);

        assert!(battle.critters.is_empty());
        assert_eq!(defender.life(), 9.0);
        assert_eq!(battle.defender_losses["life"], 1.0);
        assert_eq!(battle.attacker_gains[&2]["gold"], 5.0);
        assert_eq!(battle.removed_critters[0].reason, RemovalReason::Finished);
    }

    #[test]
    fn dead_critter_pays_the_defender() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        defender.resources.insert("gold".into(), 10.0);
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        let mut critter = test_critter(1, 0.0, 1.0, 0.5);
        critter.value = 5.0;
        battle.critters.insert(1, critter);

        tick(&catalog, &mut battle, &mut defender, 15.0);

        assert!(battle.critters.is_empty());
        assert_eq!(defender.resource("gold"), 15.0);
        assert_eq!(battle.removed_critters[0].reason, RemovalReason::Died);
        // No life lost on a kill.
        assert_eq!(defender.life(), 10.0);
    }

    #[test]
    fn normal_shot_respects_armour_floor_zero() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        let mut critter = test_critter(1, 10.0, 0.0, 0.0);
        critter.armour = 3.0;
        battle.critters.insert(1, critter);
        battle.pending_shots.push(Shot {
            damage: 2.0,
            target_cid: 1,
            source_sid: 1,
            kind: ShotKind::Normal,
            effects: Default::default(),
            flight_remaining_ms: 10.0,
            total_flight_ms: 10.0,
            origin: HexCoord::new(0, 0),
            progress: 0.0,
        });

        tick(&catalog, &mut battle, &mut defender, 15.0);
        // 2 damage against 3 armour → floored at 0.
        assert_eq!(battle.critters[&1].health, 10.0);
        assert!(battle.pending_shots.is_empty());
    }

    #[test]
    fn cold_shot_slows_then_expires() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        battle.critters.insert(1, test_critter(1, 10.0, 2.0, 0.0));
        let mut effects = hexfort_types::EffectMap::new();
        effects.insert(effect::SLOW_TARGET.into(), 0.5);
        effects.insert(effect::SLOW_TARGET_DURATION.into(), 2.0);
        let shot = Shot {
            damage: 1.0,
            target_cid: 1,
            source_sid: 1,
            kind: ShotKind::Cold,
            effects,
            flight_remaining_ms: 0.0,
            total_flight_ms: 5.0,
            origin: HexCoord::new(0, 0),
            progress: 1.0,
        };

        // Immediately after the hit.
        apply_shot(&mut battle, &shot);
        {
            let critter = &battle.critters[&1];
            assert_eq!(critter.slow_remaining_ms, 2000.0);
            assert_eq!(critter.slow_speed, 1.0);
            assert_eq!(critter.effective_speed(), 1.0);
        }

        // One second later: still slowed, timer half drained.
        tick(&catalog, &mut battle, &mut defender, 1000.0);
        {
            let critter = &battle.critters[&1];
            assert_eq!(critter.slow_remaining_ms, 1000.0);
            assert_eq!(critter.effective_speed(), 1.0);
        }

        // 2.5 s total: slow expired, base speed restored.
        tick(&catalog, &mut battle, &mut defender, 1500.0);
        let critter = &battle.critters[&1];
        assert_eq!(critter.slow_remaining_ms, 0.0);
        assert_eq!(critter.effective_speed(), 2.0);
    }

    #[test]
    fn burn_bypasses_armour_and_ticks() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        let mut critter = test_critter(1, 100.0, 0.0, 0.0);
        critter.armour = 50.0;
        battle.critters.insert(1, critter);
        let mut effects = hexfort_types::EffectMap::new();
        effects.insert(effect::BURN_TARGET_DPS.into(), 2.0);
        effects.insert(effect::BURN_TARGET_DURATION.into(), 1.0);
        let shot = Shot {
            damage: 10.0,
            target_cid: 1,
            source_sid: 1,
            kind: ShotKind::Burn,
            effects,
            flight_remaining_ms: 0.0,
            total_flight_ms: 5.0,
            origin: HexCoord::new(0, 0),
            progress: 1.0,
        };

        // Armour ignored: full 10 damage applied on arrival.
        apply_shot(&mut battle, &shot);
        assert_eq!(battle.critters[&1].health, 90.0);

        // Burn integral over the burn window equals dps × duration.
        let health_before = battle.critters[&1].health;
        for _ in 0..134 {
            tick(&catalog, &mut battle, &mut defender, 15.0);
        }
        let burned = health_before - battle.critters[&1].health;
        assert!((burned - 2.0).abs() < 1e-6, "burned {burned}");
    }

    #[test]
    fn tower_targets_most_advanced_and_reloads() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        defender.structures.insert(
            1,
            crate::empire::structure_from_item(
                1,
                catalog.get(&"ARROW_TOWER".into()).unwrap(),
                HexCoord::new(2, 0),
            ),
        );
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        battle.critters.insert(1, test_critter(1, 10.0, 0.0, 0.2));
        battle.critters.insert(2, test_critter(2, 10.0, 0.0, 0.6));

        tick(&catalog, &mut battle, &mut defender, 15.0);

        assert_eq!(battle.pending_shots.len(), 1);
        assert_eq!(battle.pending_shots[0].target_cid, 2);
        let tower = &battle.structures[&1];
        assert_eq!(tower.focus_cid, Some(2));
        assert!(tower.reload_remaining_ms > 0.0);
        assert_eq!(battle.journal.shots_fired, vec![(1, 2)]);
    }

    #[test]
    fn tower_tie_breaks_by_lowest_cid() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        defender.structures.insert(
            1,
            crate::empire::structure_from_item(
                1,
                catalog.get(&"ARROW_TOWER".into()).unwrap(),
                HexCoord::new(1, 0),
            ),
        );
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        battle.critters.insert(5, test_critter(5, 10.0, 0.0, 0.4));
        battle.critters.insert(9, test_critter(9, 10.0, 0.0, 0.4));

        tick(&catalog, &mut battle, &mut defender, 15.0);
        assert_eq!(battle.pending_shots[0].target_cid, 5);
    }

    #[test]
    fn waves_spawn_in_order_with_delay() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let mut army = Army::new(1, 2, "Two Waves");
        army.waves.push(CritterWave::new(1, "SCOUT", 2));
        army.waves.push(CritterWave::new(2, "SOLDIER", 1));
        let mut battle = battle_with(army, &defender);

        // First wave spawns immediately, then every 500 ms.
        tick(&catalog, &mut battle, &mut defender, 15.0);
        assert_eq!(battle.critters.len(), 1);
        for _ in 0..34 {
            tick(&catalog, &mut battle, &mut defender, 15.0);
        }
        assert_eq!(battle.army.waves[0].spawned, 2);

        // Second wave waits out the inter-wave delay (1000 ms in tests).
        let soldiers_before = battle
            .critters
            .values()
            .filter(|c| c.iid.as_str() == "SOLDIER")
            .count();
        assert_eq!(soldiers_before, 0);
        for _ in 0..70 {
            tick(&catalog, &mut battle, &mut defender, 15.0);
        }
        let soldiers = battle
            .critters
            .values()
            .filter(|c| c.iid.as_str() == "SOLDIER")
            .count();
        assert_eq!(soldiers, 1);
        assert!(battle.army.is_dispatched());
    }

    #[test]
    fn spawn_on_death_children_appear_at_parent_position() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        let mut parent = test_critter(1, 0.0, 1.0, 0.5);
        parent.spawn_on_death.insert("SCOUT".into(), 2);
        battle.critters.insert(1, parent);

        tick(&catalog, &mut battle, &mut defender, 15.0);

        assert_eq!(battle.critters.len(), 2);
        for child in battle.critters.values() {
            assert_eq!(child.iid, hexfort_types::ItemId::from("SCOUT"));
            assert!((child.path_progress - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn splash_hits_neighbours_with_sub_shots() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        // Both critters sit on the same hex (progress 0).
        battle.critters.insert(1, test_critter(1, 10.0, 0.0, 0.0));
        battle.critters.insert(2, test_critter(2, 10.0, 0.0, 0.0));
        let mut effects = hexfort_types::EffectMap::new();
        effects.insert(effect::SPLASH_DAMAGE.into(), 2.0);
        effects.insert(effect::SPLASH_RADIUS.into(), 1.0);
        battle.pending_shots.push(Shot {
            damage: 5.0,
            target_cid: 1,
            source_sid: 1,
            kind: ShotKind::Splash,
            effects,
            flight_remaining_ms: 5.0,
            total_flight_ms: 5.0,
            origin: HexCoord::new(2, 0),
            progress: 0.0,
        });

        tick(&catalog, &mut battle, &mut defender, 15.0);

        // Primary took full damage; a sub-shot is in flight at critter 2.
        assert_eq!(battle.critters[&1].health, 5.0);
        assert_eq!(battle.pending_shots.len(), 1);
        let sub = &battle.pending_shots[0];
        assert_eq!(sub.target_cid, 2);
        assert_eq!(sub.source_sid, SPLASH_SOURCE_SID);
        assert_eq!(sub.kind, ShotKind::Normal);
    }

    #[test]
    fn shot_on_dead_target_is_discarded() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        battle.pending_shots.push(Shot {
            damage: 5.0,
            target_cid: 77,
            source_sid: 1,
            kind: ShotKind::Normal,
            effects: Default::default(),
            flight_remaining_ms: 5.0,
            total_flight_ms: 5.0,
            origin: HexCoord::new(0, 0),
            progress: 0.0,
        });
        tick(&catalog, &mut battle, &mut defender, 15.0);
        assert!(battle.pending_shots.is_empty());
    }

    #[test]
    fn min_keep_alive_gates_finish() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        let config = GameConfig {
            min_keep_alive_ms: 10_000.0,
            ..GameConfig::default()
        };
        let attack = Attack::new(1, 2, defender.uid, 1, 0.0);
        // Empty army, no critters: held condition is true from the start.
        let mut battle = create_battle(&config, 1, &attack, Army::new(1, 2, "none"), &defender);

        tick(&catalog, &mut battle, &mut defender, 5000.0);
        assert!(!battle.is_finished);
        tick(&catalog, &mut battle, &mut defender, 5000.0);
        assert!(battle.is_finished);
        assert_eq!(battle.defender_won, Some(true));
    }

    #[test]
    fn defender_loss_on_zero_life() {
        let catalog = ItemCatalog::builtin();
        let mut defender = defender_with_map();
        defender.resources.insert("life".into(), 1.0);
        let mut battle = battle_with(Army::new(1, 2, "none"), &defender);
        let mut critter = test_critter(1, 5.0, 1.5, 0.99);
        critter.capture.insert("life".into(), 1.0);
        battle.critters.insert(1, critter);

        tick(&catalog, &mut battle, &mut defender, 200.0);
        assert!(battle.is_finished);
        assert_eq!(battle.defender_won, Some(false));
        assert!(!battle.keep_alive);
    }

    #[test]
    fn unreachable_castle_voids_battle() {
        let config = GameConfig::default();
        let mut defender = Empire::new(1, "No Map");
        defender.hex_map.clear();
        let attack = Attack::new(1, 2, 1, 1, 0.0);
        let battle = create_battle(&config, 1, &attack, Army::new(1, 2, "none"), &defender);
        assert!(battle.is_finished);
        assert_eq!(battle.defender_won, Some(true));
        assert!(!battle.keep_alive);
    }
}
