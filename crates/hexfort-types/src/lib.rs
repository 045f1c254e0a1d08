//! Core types for the hexfort game server — zero logic beyond small helpers.
//!
//! This crate defines every type shared across the engine and the server:
//! IDs, hex coordinates, item definitions, empire/army/attack/battle state,
//! the seeded RNG, gameplay configuration, and the wire message shapes.
//! It has no game logic — just data definitions.

pub mod army;
pub mod attack;
pub mod battle;
pub mod config;
pub mod effect;
pub mod empire;
pub mod hex;
pub mod ids;
pub mod item;
pub mod messages;
pub mod rng;

// Re-export commonly used types at crate root
pub use effect::EffectMap;
pub use hex::HexCoord;
pub use ids::*;
pub use item::{ItemDef, ItemKind, ShotKind};
pub use rng::RngState;
