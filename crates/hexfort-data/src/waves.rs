//! Scripted AI wave definitions.
//!
//! Each script names a trigger — a set of item completions and/or a total
//! citizen threshold — and the army to send when it fires. Scripts take
//! priority over adaptive army synthesis; later entries are considered
//! more specific.

use serde::{Deserialize, Serialize};

use hexfort_types::ItemId;

/// When a scripted wave fires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveTrigger {
    /// Item completions that arm this script.
    #[serde(default)]
    pub items: Vec<ItemId>,
    /// Total-citizen threshold that arms this script.
    #[serde(default)]
    pub citizen: Option<u32>,
}

/// One wave inside a scripted army.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedWaveDef {
    pub critter_iid: ItemId,
    pub slots: u32,
}

/// A complete scripted attack definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveScript {
    pub name: String,
    pub trigger: WaveTrigger,
    pub army: Vec<ScriptedWaveDef>,
}

fn script(name: &str, trigger: WaveTrigger, army: &[(&str, u32)]) -> WaveScript {
    WaveScript {
        name: name.to_string(),
        trigger,
        army: army
            .iter()
            .map(|(iid, slots)| ScriptedWaveDef {
                critter_iid: (*iid).into(),
                slots: *slots,
            })
            .collect(),
    }
}

fn on_items(iids: &[&str]) -> WaveTrigger {
    WaveTrigger {
        items: iids.iter().map(|s| (*s).into()).collect(),
        citizen: None,
    }
}

/// The built-in script list, ordered from generic to specific.
pub fn builtin_wave_scripts() -> Vec<WaveScript> {
    vec![
        script("First Raid", on_items(&["FIRE_PLACE"]), &[("SCOUT", 3)]),
        script("Hunting Party", on_items(&["HUNTING"]), &[("SCOUT", 5)]),
        script(
            "Crowded Streets",
            WaveTrigger {
                items: Vec::new(),
                citizen: Some(5),
            },
            &[("SOLDIER", 6), ("SCOUT", 4)],
        ),
        script(
            "Iron Horde",
            on_items(&["IRON_WORKING"]),
            &[("ARMORED_ORC", 4), ("BERSERKER", 4)],
        ),
        script(
            "Siege of the Ancients",
            on_items(&["SIEGECRAFT"]),
            &[("WAR_TURTLE", 2), ("BERSERKER", 6)],
        ),
    ]
}
