//! Starter map layout — the hex tiles a new empire begins with.
//!
//! The default map is a straight lane: one spawnpoint in the west, a path
//! running east to the castle, and buildable rows on both sides of the
//! lane. Tiles are keyed "q,r" like everywhere else.

use std::collections::BTreeMap;

use hexfort_types::empire::TileKind;
use hexfort_types::HexCoord;

/// Half-length of the starter lane (path spans q in [-LANE, LANE]).
const LANE: i32 = 4;

/// The default tile layout for a new empire.
pub fn starter_hex_map() -> BTreeMap<String, TileKind> {
    let mut tiles = BTreeMap::new();

    for q in -LANE..=LANE {
        let kind = if q == -LANE {
            TileKind::Spawnpoint
        } else if q == LANE {
            TileKind::Castle
        } else {
            TileKind::Path
        };
        tiles.insert(HexCoord::new(q, 0).key(), kind);
    }

    // Buildable rows hugging the lane. With axial coordinates the r = -1
    // and r = 1 rows are each adjacent to the path row.
    for q in -LANE..=LANE {
        tiles.insert(HexCoord::new(q, -1).key(), TileKind::Buildable);
        tiles.insert(HexCoord::new(q, 1).key(), TileKind::Buildable);
    }

    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_map_has_one_castle_and_one_spawn() {
        let tiles = starter_hex_map();
        let castles = tiles.values().filter(|t| **t == TileKind::Castle).count();
        let spawns = tiles
            .values()
            .filter(|t| **t == TileKind::Spawnpoint)
            .count();
        assert_eq!(castles, 1);
        assert_eq!(spawns, 1);
    }

    #[test]
    fn lane_is_connected() {
        let tiles = starter_hex_map();
        // Every path tile has a walkable neighbour on each side of the lane.
        for (key, kind) in &tiles {
            if *kind != TileKind::Path {
                continue;
            }
            let hex = HexCoord::from_key(key).unwrap();
            let walkable_neighbors = hex
                .neighbors()
                .iter()
                .filter(|n| {
                    tiles
                        .get(&n.key())
                        .map(|t| t.is_walkable())
                        .unwrap_or(false)
                })
                .count();
            assert!(walkable_neighbors >= 2, "path tile {key} is a dead end");
        }
    }

    #[test]
    fn buildable_tiles_are_off_the_lane() {
        let tiles = starter_hex_map();
        for (key, kind) in &tiles {
            if *kind == TileKind::Buildable {
                let hex = HexCoord::from_key(key).unwrap();
                assert_ne!(hex.r, 0, "buildable tile {key} sits on the lane");
            }
        }
    }
}
