//! Property tests for geometry, pathfinding, and empire invariants.

use std::collections::BTreeMap;

use proptest::prelude::*;

use hexfort_data::ItemCatalog;
use hexfort_engine::battle;
use hexfort_engine::empire::build_item;
use hexfort_engine::pathfinding::{find_path_from_spawn_to_castle, validate_path};
use hexfort_types::army::Army;
use hexfort_types::attack::Attack;
use hexfort_types::config::GameConfig;
use hexfort_types::empire::{Empire, TileKind};
use hexfort_types::{HexCoord, ItemDef, ItemId, ItemKind};

fn coord() -> impl Strategy<Value = HexCoord> {
    (-50i32..50, -50i32..50).prop_map(|(q, r)| HexCoord::new(q, r))
}

proptest! {
    #[test]
    fn distance_is_symmetric_and_triangular(a in coord(), b in coord(), c in coord()) {
        prop_assert_eq!(a.distance(b), b.distance(a));
        prop_assert_eq!(a.distance(a), 0);
        prop_assert!(a.distance(c) <= a.distance(b) + b.distance(c));
    }

    #[test]
    fn line_is_connected_and_minimal(a in coord(), b in coord()) {
        let line = a.line_to(b);
        prop_assert_eq!(line.len() as u32, a.distance(b) + 1);
        for pair in line.windows(2) {
            prop_assert_eq!(pair[0].distance(pair[1]), 1);
        }
    }

    #[test]
    fn ring_and_disk_counts(radius in 0i32..6) {
        let center = HexCoord::new(2, -1);
        prop_assert_eq!(center.ring(radius).len(), if radius <= 0 { 0 } else { 6 * radius as usize });
        prop_assert_eq!(
            center.disk(radius).len(),
            (3 * radius * radius + 3 * radius + 1) as usize
        );
    }

    /// A straight lane with random detour rows: BFS returns a valid path
    /// of at least the hex distance between spawn and castle.
    #[test]
    fn bfs_paths_are_valid_and_no_shorter_than_distance(
        len in 3i32..12,
        detours in proptest::collection::vec((0i32..12, 1i32..3), 0..8),
    ) {
        let mut tiles: BTreeMap<String, TileKind> = BTreeMap::new();
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
        for (q, r) in detours {
            tiles.entry(HexCoord::new(q, r).key()).or_insert(TileKind::Path);
        }

        let path = find_path_from_spawn_to_castle(&tiles).expect("lane is connected");
        prop_assert!(validate_path(&path));
        let spawn = HexCoord::new(0, 0);
        let castle = HexCoord::new(len - 1, 0);
        prop_assert_eq!(*path.first().unwrap(), spawn);
        prop_assert_eq!(*path.last().unwrap(), castle);
        prop_assert!(path.len() as u32 >= spawn.distance(castle) + 1);
    }

    /// Any rejected build_item call leaves resources, item maps and both
    /// queues exactly as they were.
    #[test]
    fn rejected_build_is_a_no_op(gold in 0.0f64..60.0, iid in "(FIRE_PLACE|MAIN_HOUSE|HUNTING|NO_SUCH)") {
        let catalog = ItemCatalog::builtin();
        let mut empire = Empire::new(1, "Prop");
        empire.resources.insert("gold".into(), gold);
        empire.buildings.insert("INIT".into(), 0.0);

        let before = empire.clone();
        let result = build_item(&catalog, &mut empire, &ItemId::from(iid.as_str()));
        if result.is_err() {
            prop_assert_eq!(&empire.resources, &before.resources);
            prop_assert_eq!(&empire.buildings, &before.buildings);
            prop_assert_eq!(&empire.knowledge, &before.knowledge);
            prop_assert_eq!(&empire.build_queue, &before.build_queue);
            prop_assert_eq!(&empire.research_queue, &before.research_queue);
        }
    }

    /// path_progress stays in [0, 1] under arbitrary dt sequences, and a
    /// critter never outlives both its health and the battle bookkeeping.
    #[test]
    fn progress_stays_clamped(dts in proptest::collection::vec(1.0f64..400.0, 1..60)) {
        let mut critter_item = ItemDef::new("PROP_RUNNER", "Runner", ItemKind::Critter);
        critter_item.health = 1000.0;
        critter_item.speed = 1.2;
        critter_item.spawn_interval_ms = 100.0;
        let catalog = ItemCatalog::new(vec![critter_item.clone()]);

        let mut defender = Empire::new(1, "Prop");
        for q in 0..5 {
            let kind = if q == 0 {
                TileKind::Spawnpoint
            } else if q == 4 {
                TileKind::Castle
            } else {
                TileKind::Path
            };
            defender.hex_map.insert(HexCoord::new(q, 0).key(), kind);
        }

        let config = GameConfig::default();
        let attack = Attack::new(1, 2, 1, 1, 0.0);
        let mut army = Army::new(1, 2, "Prop");
        army.waves.push(hexfort_types::army::CritterWave::new(1, "PROP_RUNNER", 3));
        let mut state = battle::create_battle(&config, 9, &attack, army, &defender);

        for dt in dts {
            battle::tick(&catalog, &mut state, &mut defender, dt);
            for critter in state.critters.values() {
                prop_assert!((0.0..=1.0).contains(&critter.path_progress));
            }
        }
    }
}
