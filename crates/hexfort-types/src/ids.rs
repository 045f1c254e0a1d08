//! ID types — a branded newtype for catalogue items, plain aliases for
//! numeric instance ids.
//!
//! `ItemId` wraps a `Box<str>` for cheap cloning and small struct size.
//! Instance ids (players, armies, structures, critters, battles, attacks)
//! are monotonic integers handed out by their owning component.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Box<str>);

        impl $name {
            pub fn new(s: impl Into<Box<str>>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.into())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s.into_boxed_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Catalogue item identifier (e.g. "FIRE_PLACE", "ARCHER_TOWER").
    ItemId
);

/// Player / empire identifier. Uid 0 is reserved for the AI opponent.
pub type Uid = u32;

/// Army identifier, unique per server run.
pub type Aid = u64;

/// Structure instance identifier, unique within an empire.
pub type Sid = u64;

/// Critter instance identifier, unique within a battle.
pub type Cid = u64;

/// Battle identifier, unique per server run.
pub type Bid = u64;

/// Attack identifier, unique per server run.
pub type AttackId = u64;

/// Uid reserved for the adaptive AI opponent.
pub const AI_UID: Uid = 0;
