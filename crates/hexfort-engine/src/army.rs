//! Army management — creating armies, adding waves, editing waves.
//!
//! Armies are edited between battles; a battle works on its own snapshot,
//! so edits never touch a running fight.

use hexfort_types::army::{Army, CritterWave, MAX_ARMY_WAVES};
use hexfort_types::config::GameConfig;
use hexfort_types::effect;
use hexfort_types::empire::Empire;
use hexfort_types::{Aid, ItemId, ItemKind};

use hexfort_data::ItemCatalog;

/// Precondition failures for army operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ArmyError {
    UnknownArmy(Aid),
    UnknownWave(u32),
    TooManyWaves,
    UnknownCritter(ItemId),
    CritterLocked(ItemId),
    TooManySlots { requested: u32, capacity: u32 },
}

impl std::fmt::Display for ArmyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownArmy(aid) => write!(f, "Unknown army {aid}"),
            Self::UnknownWave(n) => write!(f, "Unknown wave {n}"),
            Self::TooManyWaves => write!(f, "Army already has {MAX_ARMY_WAVES} waves"),
            Self::UnknownCritter(iid) => write!(f, "Unknown critter {iid}"),
            Self::CritterLocked(iid) => write!(f, "Requirements not met for {iid}"),
            Self::TooManySlots { requested, capacity } => {
                write!(f, "Wave capacity is {capacity}, requested {requested}")
            }
        }
    }
}

/// Slot capacity of one wave: a config base plus the empire's slot_offset
/// effect.
pub fn wave_capacity(config: &GameConfig, empire: &Empire) -> u32 {
    let capacity = config.wave_slot_base as f64 + empire.effect(effect::SLOT_OFFSET);
    capacity.max(1.0) as u32
}

/// Create a new empty army for the empire. Returns its aid.
pub fn create_army(empire: &mut Empire, name: &str) -> Aid {
    let aid = empire.next_aid;
    empire.next_aid += 1;
    empire.armies.push(Army::new(aid, empire.uid, name));
    aid
}

/// Rename an army.
pub fn rename_army(empire: &mut Empire, aid: Aid, name: &str) -> Result<(), ArmyError> {
    let army = empire.army_mut(aid).ok_or(ArmyError::UnknownArmy(aid))?;
    army.name = name.to_string();
    Ok(())
}

/// Append a wave to an army. The critter, when given, must be unlocked.
/// New waves start with a single slot.
pub fn add_wave(
    catalog: &ItemCatalog,
    empire: &mut Empire,
    aid: Aid,
    critter_iid: Option<&ItemId>,
) -> Result<u32, ArmyError> {
    let iid = match critter_iid {
        Some(iid) => {
            check_critter(catalog, empire, iid)?;
            iid.clone()
        }
        None => default_critter(catalog, empire)?,
    };
    let army = empire.army_mut(aid).ok_or(ArmyError::UnknownArmy(aid))?;
    if army.waves.is_full() {
        return Err(ArmyError::TooManyWaves);
    }
    let wave_id = army.waves.len() as u32 + 1;
    army.waves.push(CritterWave::new(wave_id, iid, 1));
    Ok(wave_id)
}

/// Edit a wave's critter type and/or slot count.
pub fn change_wave(
    catalog: &ItemCatalog,
    config: &GameConfig,
    empire: &mut Empire,
    aid: Aid,
    wave_number: u32,
    critter_iid: Option<&ItemId>,
    slots: Option<u32>,
) -> Result<(), ArmyError> {
    if let Some(iid) = critter_iid {
        check_critter(catalog, empire, iid)?;
    }
    let capacity = wave_capacity(config, empire);
    if let Some(requested) = slots {
        if requested > capacity {
            return Err(ArmyError::TooManySlots {
                requested,
                capacity,
            });
        }
    }
    let army = empire.army_mut(aid).ok_or(ArmyError::UnknownArmy(aid))?;
    let wave = army
        .waves
        .iter_mut()
        .find(|w| w.wave_id == wave_number)
        .ok_or(ArmyError::UnknownWave(wave_number))?;
    if let Some(iid) = critter_iid {
        wave.critter_iid = iid.clone();
    }
    if let Some(slots) = slots {
        wave.slots = slots.max(1);
    }
    Ok(())
}

fn check_critter(
    catalog: &ItemCatalog,
    empire: &Empire,
    iid: &ItemId,
) -> Result<(), ArmyError> {
    let item = catalog
        .get(iid)
        .ok_or_else(|| ArmyError::UnknownCritter(iid.clone()))?;
    if item.kind != ItemKind::Critter {
        return Err(ArmyError::UnknownCritter(iid.clone()));
    }
    if !catalog.requirements_met(iid, &empire.completed_items()) {
        return Err(ArmyError::CritterLocked(iid.clone()));
    }
    Ok(())
}

/// The first unlocked critter, used when `new_wave` names none.
fn default_critter(catalog: &ItemCatalog, empire: &Empire) -> Result<ItemId, ArmyError> {
    catalog
        .available_critters(&empire.completed_items())
        .first()
        .map(|i| i.iid.clone())
        .ok_or_else(|| ArmyError::UnknownCritter(ItemId::from("")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ItemCatalog, GameConfig, Empire) {
        let catalog = ItemCatalog::builtin();
        let config = GameConfig::default();
        let mut empire = Empire::new(1, "Test");
        empire.buildings.insert("INIT".into(), 0.0);
        empire.buildings.insert("FIRE_PLACE".into(), 0.0);
        empire.knowledge.insert("HUNTING".into(), 0.0);
        (catalog, config, empire)
    }

    #[test]
    fn create_and_fill_army() {
        let (catalog, config, mut empire) = setup();
        let aid = create_army(&mut empire, "First Strike");
        let wave = add_wave(&catalog, &mut empire, aid, Some(&"SCOUT".into())).unwrap();
        change_wave(&catalog, &config, &mut empire, aid, wave, None, Some(5)).unwrap();

        let army = empire.army(aid).unwrap();
        assert_eq!(army.waves.len(), 1);
        assert_eq!(army.waves[0].slots, 5);
        assert_eq!(army.waves[0].critter_iid, ItemId::from("SCOUT"));
    }

    #[test]
    fn locked_critter_rejected() {
        let (catalog, _config, mut empire) = setup();
        let aid = create_army(&mut empire, "Doomed");
        let err =
            add_wave(&catalog, &mut empire, aid, Some(&"WAR_TURTLE".into())).unwrap_err();
        assert!(matches!(err, ArmyError::CritterLocked(_)));
    }

    #[test]
    fn slots_capped_by_capacity() {
        let (catalog, config, mut empire) = setup();
        let aid = create_army(&mut empire, "Overfull");
        let wave = add_wave(&catalog, &mut empire, aid, Some(&"SCOUT".into())).unwrap();
        let err = change_wave(&catalog, &config, &mut empire, aid, wave, None, Some(99))
            .unwrap_err();
        assert!(matches!(err, ArmyError::TooManySlots { .. }));
    }

    #[test]
    fn slot_offset_effect_raises_capacity() {
        let (_, config, mut empire) = setup();
        let base = wave_capacity(&config, &empire);
        empire.effects.insert(effect::SLOT_OFFSET.into(), 5.0);
        assert_eq!(wave_capacity(&config, &empire), base + 5);
    }
}
