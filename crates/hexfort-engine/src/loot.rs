//! Post-battle loot — resource transfers and probabilistic losses.
//!
//! Runs outside the simulator once a battle has finished. All randomness
//! goes through the battle's own RNG so a replayed battle loots
//! identically.

use std::collections::BTreeMap;

use hexfort_types::battle::BattleState;
use hexfort_types::config::GameConfig;
use hexfort_types::effect;
use hexfort_types::empire::Empire;
use hexfort_types::{ItemId, Uid};

use hexfort_data::ItemCatalog;

use crate::empire::recalculate_effects;

/// Move the battle's accumulated gains and losses into the empires.
pub fn apply_battle_resources(battle: &BattleState, empires: &mut BTreeMap<Uid, Empire>) {
    if let Some(defender) = empires.get_mut(&battle.defender_uid) {
        for (resource, amount) in &battle.defender_losses {
            // Life was already deducted live during the battle.
            if resource.as_str() == effect::RES_LIFE {
                continue;
            }
            let entry = defender.resources.entry(resource.clone()).or_insert(0.0);
            *entry = (*entry - amount).max(0.0);
        }
    }
    for (attacker_uid, gains) in &battle.attacker_gains {
        let Some(attacker) = empires.get_mut(attacker_uid) else {
            continue;
        };
        for (resource, amount) in gains {
            *attacker.resources.entry(resource.clone()).or_insert(0.0) += amount;
        }
    }
}

/// Extra losses applied when the defender lost the battle: a bite out of a
/// random completed knowledge item, a culture cut, and a theft roll per
/// artefact.
pub fn loot_defender(
    catalog: &ItemCatalog,
    config: &GameConfig,
    battle: &mut BattleState,
    empires: &mut BTreeMap<Uid, Empire>,
) {
    if battle.defender_won != Some(false) {
        return;
    }

    steal_knowledge(catalog, config, battle, empires);
    steal_culture(config, battle, empires);
    steal_artefacts(catalog, config, battle, empires);
}

/// A random completed knowledge item loses a fraction of its effort; the
/// item re-opens and the defender's effects are rebuilt without it.
fn steal_knowledge(
    catalog: &ItemCatalog,
    config: &GameConfig,
    battle: &mut BattleState,
    empires: &mut BTreeMap<Uid, Empire>,
) {
    let Some(defender) = empires.get_mut(&battle.defender_uid) else {
        return;
    };
    let completed: Vec<ItemId> = defender
        .knowledge
        .iter()
        .filter(|(_, remaining)| **remaining == 0.0)
        .map(|(iid, _)| iid.clone())
        .collect();
    let Some(index) = battle.rng.random_index(completed.len()) else {
        return;
    };
    let iid = &completed[index];
    let Some(item) = catalog.get(iid) else {
        return;
    };
    let fraction = battle
        .rng
        .next_range(config.min_lose_knowledge, config.max_lose_knowledge);
    let lost = item.effort * fraction;
    if lost <= 0.0 {
        return;
    }
    let remaining = defender.knowledge.entry(iid.clone()).or_insert(0.0);
    *remaining = (*remaining + lost).min(item.effort);
    tracing::info!(defender_uid = defender.uid, %iid, lost, "knowledge looted");
    recalculate_effects(catalog, defender);
}

fn steal_culture(
    config: &GameConfig,
    battle: &mut BattleState,
    empires: &mut BTreeMap<Uid, Empire>,
) {
    let Some(defender) = empires.get_mut(&battle.defender_uid) else {
        return;
    };
    let fraction = battle
        .rng
        .next_range(config.min_lose_culture, config.max_lose_culture);
    let culture = defender
        .resources
        .entry(effect::RES_CULTURE.to_string())
        .or_insert(0.0);
    let lost = *culture * fraction;
    *culture -= lost;
    *battle
        .defender_losses
        .entry(effect::RES_CULTURE.to_string())
        .or_insert(0.0) += lost;
}

/// Each defender artefact transfers to a random attacker with the
/// configured chance.
fn steal_artefacts(
    catalog: &ItemCatalog,
    config: &GameConfig,
    battle: &mut BattleState,
    empires: &mut BTreeMap<Uid, Empire>,
) {
    let attackers: Vec<Uid> = battle.attacker_uids.clone();
    if attackers.is_empty() {
        return;
    }

    let Some(defender) = empires.get_mut(&battle.defender_uid) else {
        return;
    };
    let mut stolen: Vec<(ItemId, Uid)> = Vec::new();
    let mut kept = Vec::new();
    for artefact in std::mem::take(&mut defender.artefacts) {
        if battle.rng.chance(config.artefact_steal_chance) {
            let index = battle.rng.random_index(attackers.len()).unwrap_or(0);
            stolen.push((artefact, attackers[index]));
        } else {
            kept.push(artefact);
        }
    }
    defender.artefacts = kept;
    if !stolen.is_empty() {
        recalculate_effects(catalog, defender);
    }

    for (artefact, thief_uid) in stolen {
        tracing::info!(defender_uid = battle.defender_uid, thief_uid, %artefact, "artefact stolen");
        if let Some(thief) = empires.get_mut(&thief_uid) {
            thief.artefacts.push(artefact);
            recalculate_effects(catalog, thief);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexfort_types::army::Army;
    use hexfort_types::attack::Attack;

    fn setup(defender_won: bool) -> (ItemCatalog, GameConfig, BattleState, BTreeMap<Uid, Empire>) {
        let catalog = ItemCatalog::builtin();
        let config = GameConfig::default();

        let mut defender = Empire::new(1, "Defender");
        defender.hex_map = hexfort_data::maps::starter_hex_map();
        defender.resources.insert("culture".into(), 100.0);
        defender.knowledge.insert("HUNTING".into(), 0.0);
        defender.artefacts.push("GOLDEN_IDOL".into());

        let attacker = Empire::new(2, "Attacker");

        let attack = Attack::new(1, 2, 1, 1, 0.0);
        let mut battle = create_test_battle(&config, &attack, &defender);
        battle.defender_won = Some(defender_won);

        let empires = [(1, defender), (2, attacker)].into_iter().collect();
        (catalog, config, battle, empires)
    }

    fn create_test_battle(config: &GameConfig, attack: &Attack, defender: &Empire) -> BattleState {
        crate::battle::create_battle(config, 7, attack, Army::new(1, 2, "Raid"), defender)
    }

    #[test]
    fn gains_and_losses_transfer() {
        let (_, _, mut battle, mut empires) = setup(false);
        battle
            .attacker_gains
            .entry(2)
            .or_default()
            .insert("gold".into(), 25.0);
        battle.defender_losses.insert("gold".into(), 25.0);
        empires.get_mut(&1).unwrap().resources.insert("gold".into(), 40.0);

        apply_battle_resources(&battle, &mut empires);

        assert_eq!(empires[&2].resource("gold"), 25.0);
        assert_eq!(empires[&1].resource("gold"), 15.0);
    }

    #[test]
    fn losses_never_go_negative() {
        let (_, _, mut battle, mut empires) = setup(false);
        battle.defender_losses.insert("gold".into(), 1000.0);
        empires.get_mut(&1).unwrap().resources.insert("gold".into(), 5.0);
        apply_battle_resources(&battle, &mut empires);
        assert_eq!(empires[&1].resource("gold"), 0.0);
    }

    #[test]
    fn no_loot_when_defender_won() {
        let (catalog, config, mut battle, mut empires) = setup(true);
        let culture_before = empires[&1].resource("culture");
        loot_defender(&catalog, &config, &mut battle, &mut empires);
        assert_eq!(empires[&1].resource("culture"), culture_before);
        assert_eq!(empires[&1].artefacts.len(), 1);
        assert_eq!(empires[&1].knowledge[&ItemId::from("HUNTING")], 0.0);
    }

    #[test]
    fn defender_loss_bites_knowledge_and_culture() {
        let (catalog, config, mut battle, mut empires) = setup(false);
        loot_defender(&catalog, &config, &mut battle, &mut empires);

        let remaining = empires[&1].knowledge[&ItemId::from("HUNTING")];
        // HUNTING effort is 20; between 3% and 15% re-opened.
        assert!(remaining >= 20.0 * config.min_lose_knowledge - 1e-9);
        assert!(remaining <= 20.0 * config.max_lose_knowledge + 1e-9);

        let culture = empires[&1].resource("culture");
        assert!(culture <= 100.0 * (1.0 - config.min_lose_culture) + 1e-9);
        assert!(culture >= 100.0 * (1.0 - config.max_lose_culture) - 1e-9);
    }

    #[test]
    fn loot_is_reproducible_per_battle_seed() {
        let (catalog, config, mut battle_a, mut empires_a) = setup(false);
        let (_, _, mut battle_b, mut empires_b) = setup(false);
        loot_defender(&catalog, &config, &mut battle_a, &mut empires_a);
        loot_defender(&catalog, &config, &mut battle_b, &mut empires_b);

        assert_eq!(
            empires_a[&1].resource("culture").to_bits(),
            empires_b[&1].resource("culture").to_bits()
        );
        assert_eq!(empires_a[&1].artefacts, empires_b[&1].artefacts);
        assert_eq!(empires_a[&2].artefacts, empires_b[&2].artefacts);
    }

    #[test]
    fn stolen_artefacts_change_owners_and_effects() {
        let (catalog, config, mut battle, mut empires) = setup(false);
        // Force the steal with a certain chance.
        let config = GameConfig {
            artefact_steal_chance: 1.0,
            ..config
        };
        loot_defender(&catalog, &config, &mut battle, &mut empires);

        assert!(empires[&1].artefacts.is_empty());
        assert_eq!(empires[&2].artefacts, vec![ItemId::from("GOLDEN_IDOL")]);
        assert_eq!(empires[&2].effect(effect::GOLD_MODIFIER), 0.2);
        assert_eq!(empires[&1].effect(effect::GOLD_MODIFIER), 0.0);
    }
}
