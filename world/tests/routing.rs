use warden_core::{CellCoord, Command, Event, PlacementError, TowerKind};
use warden_world::{apply, query, GridMap, SimConfig, World};

fn config_with_gold(gold: u32) -> SimConfig {
    SimConfig {
        starting_gold: gold,
        ..SimConfig::default()
    }
}

fn place(world: &mut World, kind: TowerKind, cell: CellCoord) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, Command::PlaceTower { kind, cell }, &mut events);
    events
}

#[test]
fn cached_route_connects_spawn_and_exit() {
    let map = GridMap::from_ascii("field", &["S..#....", "...#.BB.", "......#E"])
        .expect("valid layout");
    let spawn = map.grid_to_world(map.spawn());
    let exit = map.grid_to_world(map.exit());
    let world = World::new(map, SimConfig::default());

    let route = query::route(&world);
    assert!(!route.is_empty());
    assert_eq!(route.first(), Some(&spawn));
    assert_eq!(route.last(), Some(&exit));
}

#[test]
fn corridor_rejects_path_severing_and_exit_placements() {
    let map = GridMap::from_ascii("corridor", &["SBE"]).expect("valid layout");
    let mut world = World::new(map, config_with_gold(500));

    assert!(!query::can_place_tower(&world, CellCoord::new(1, 0)));
    assert!(!query::can_place_tower(&world, CellCoord::new(2, 0)));

    let events = place(&mut world, TowerKind::Arrow, CellCoord::new(1, 0));
    assert_eq!(
        events,
        vec![Event::TowerPlacementRejected {
            kind: TowerKind::Arrow,
            cell: CellCoord::new(1, 0),
            reason: PlacementError::BlocksPath,
        }]
    );

    let events = place(&mut world, TowerKind::Arrow, CellCoord::new(2, 0));
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::NotBuildable,
            ..
        }]
    ));

    let events = place(&mut world, TowerKind::Arrow, CellCoord::new(3, 0));
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::OutOfBounds,
            ..
        }]
    ));
    assert_eq!(query::gold(&world), 500);
}

#[test]
fn placement_reroutes_enemies_around_tower() {
    let map = GridMap::from_ascii("detour", &["SBE", "..."]).expect("valid layout");
    let mut world = World::new(map, config_with_gold(100));
    assert_eq!(query::route(&world).len(), 3);

    let events = place(&mut world, TowerKind::Arrow, CellCoord::new(1, 0));
    let tower = match events.as_slice() {
        [Event::TowerPlaced { tower, cost: 50, .. }, Event::RouteRecomputed { points: 5 }] => {
            *tower
        }
        other => panic!("unexpected events {other:?}"),
    };
    assert_eq!(query::route(&world).len(), 5);
    assert_eq!(query::tower_at(&world, CellCoord::new(1, 0)), Some(tower));
    assert!(!query::can_place_tower(&world, CellCoord::new(1, 0)));

    let mut events = Vec::new();
    apply(&mut world, Command::SellTower { tower }, &mut events);
    assert_eq!(events.last(), Some(&Event::RouteRecomputed { points: 3 }));
    assert_eq!(query::tower_at(&world, CellCoord::new(1, 0)), None);
}

#[test]
fn occupied_cell_is_reported_before_gold() {
    let map = GridMap::from_ascii("yard", &["S.BB", "...E"]).expect("valid layout");
    let mut world = World::new(map, config_with_gold(50));
    let _ = place(&mut world, TowerKind::Arrow, CellCoord::new(2, 0));
    assert_eq!(query::gold(&world), 0);

    let events = place(&mut world, TowerKind::Arrow, CellCoord::new(2, 0));
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::Occupied,
            ..
        }]
    ));

    let events = place(&mut world, TowerKind::Arrow, CellCoord::new(3, 0));
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            reason: PlacementError::InsufficientGold,
            ..
        }]
    ));
}

#[test]
fn bundled_levels_load_with_connected_routes() {
    for json in [
        include_str!("../../levels/meadow.json"),
        include_str!("../../levels/canyon.json"),
    ] {
        let map = GridMap::from_json(json).expect("bundled level is valid");
        let name = map.name().to_owned();
        let world = World::new(map, SimConfig::default());
        assert!(!query::route(&world).is_empty(), "{name} has no route");
    }
}
