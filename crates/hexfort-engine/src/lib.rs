//! Simulation runtime for hexfort — the authoritative game state and the
//! deterministic tick functions that advance it.
//!
//! All mutable game logic lives here. Every loop in the system (world
//! tick, battle tick, attack state machine) is factored as a pure
//! `step`/`tick` function of (state, dt) so the whole core is testable
//! without a runtime; the async task wrappers live in the server binary.

pub mod ai;
pub mod army;
pub mod attack;
pub mod battle;
pub mod empire;
pub mod events;
pub mod loot;
pub mod pathfinding;
pub mod session;
pub mod setup;
pub mod snapshot;
pub mod world;

pub use events::{EventBus, GameEvent};
pub use session::Outbound;
pub use world::WorldState;
