//! Immutable game data for hexfort.
//!
//! This crate contains the built-in item catalogue (tech tree, towers,
//! critters, artefacts), the scripted AI wave definitions, and the starter
//! map layout. Everything here is read-only after construction.

pub mod catalog;
pub mod items;
pub mod maps;
pub mod waves;

pub use catalog::ItemCatalog;
