//! Hex pathfinding on a player's tile map.
//!
//! Critter paths are computed once per battle: a BFS from any spawnpoint
//! to the single castle, traversing only walkable tiles (spawnpoint, path,
//! castle) via 6-connectivity. The neighbour order is fixed so the result
//! is reproducible.

use std::collections::{BTreeMap, HashMap, VecDeque};

use hexfort_types::empire::TileKind;
use hexfort_types::HexCoord;

/// BFS shortest path from any spawnpoint to the castle.
///
/// Returns the full hex sequence including both endpoints, or `None` when
/// the map has no castle, no spawnpoint, or no walkable connection. The
/// search is seeded with every spawnpoint at once (in tile-key order), so
/// the result is the shortest path over all spawnpoints.
pub fn find_path_from_spawn_to_castle(
    tiles: &BTreeMap<String, TileKind>,
) -> Option<Vec<HexCoord>> {
    let mut castle = None;
    let mut spawns = Vec::new();
    for (key, kind) in tiles {
        match kind {
            TileKind::Castle => castle = HexCoord::from_key(key),
            TileKind::Spawnpoint => {
                if let Some(hex) = HexCoord::from_key(key) {
                    spawns.push(hex);
                }
            }
            _ => {}
        }
    }
    let castle = castle?;
    if spawns.is_empty() {
        return None;
    }

    let walkable = |hex: HexCoord| {
        tiles
            .get(&hex.key())
            .map(|t| t.is_walkable())
            .unwrap_or(false)
    };

    let mut queue: VecDeque<HexCoord> = VecDeque::new();
    let mut parent: HashMap<HexCoord, Option<HexCoord>> = HashMap::new();
    for spawn in spawns {
        parent.insert(spawn, None);
        queue.push_back(spawn);
    }

    while let Some(current) = queue.pop_front() {
        if current == castle {
            let mut path = Vec::new();
            let mut cursor = Some(current);
            while let Some(hex) = cursor {
                path.push(hex);
                cursor = parent[&hex];
            }
            path.reverse();
            return Some(path);
        }
        for next in current.neighbors() {
            if !parent.contains_key(&next) && walkable(next) {
                parent.insert(next, Some(current));
                queue.push_back(next);
            }
        }
    }
    None
}

/// Whether each consecutive pair in `path` are hex neighbours.
pub fn validate_path(path: &[HexCoord]) -> bool {
    path.windows(2).all(|pair| pair[0].distance(pair[1]) == 1)
}

/// Number of steps in a path (len − 1, floored at 0).
pub fn path_distance(path: &[HexCoord]) -> usize {
    path.len().saturating_sub(1)
}

/// Sub-path starting at `start_index` (clamped). Used for spawn-on-death
/// placement partway along a parent's route.
pub fn sub_path_from(path: &[HexCoord], start_index: usize) -> &[HexCoord] {
    if path.is_empty() {
        return path;
    }
    let start = start_index.min(path.len() - 1);
    &path[start..]
}
