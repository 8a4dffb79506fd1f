use std::time::Duration;

use glam::Vec2;
use warden_core::{
    CellCoord, Command, EnemyKind, EntityId, Event, SessionStats, TowerCommandError, TowerKind,
};
use warden_world::{apply, query, step, GridMap, SimConfig, World};

const FRAME: Duration = Duration::from_millis(50);

fn yard() -> GridMap {
    GridMap::from_ascii(
        "yard",
        &[
            "S..........E",
            "...BBB......",
            "............",
        ],
    )
    .expect("valid layout")
}

fn world_with(gold: u32, tower_melee: bool) -> World {
    World::new(
        yard(),
        SimConfig {
            starting_gold: gold,
            tower_melee,
            first_wave_delay: 10_000.0,
            wave_delay: 10_000.0,
            ..SimConfig::default()
        },
    )
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    events
}

fn place_arrow(world: &mut World, cell: CellCoord) -> EntityId {
    let events = run(
        world,
        Command::PlaceTower {
            kind: TowerKind::Arrow,
            cell,
        },
    );
    match events.first() {
        Some(Event::TowerPlaced { tower, .. }) => *tower,
        other => panic!("placement failed: {other:?}"),
    }
}

#[test]
fn sale_refunds_half_of_everything_invested() {
    let mut world = world_with(200, false);
    let tower = place_arrow(&mut world, CellCoord::new(3, 1));
    let events = run(&mut world, Command::UpgradeTower { tower });
    assert_eq!(
        events,
        vec![Event::TowerUpgraded {
            tower,
            level: 2,
            cost: 75,
        }]
    );
    assert_eq!(query::gold(&world), 75);

    let events = run(&mut world, Command::SellTower { tower });
    assert_eq!(
        events.first(),
        Some(&Event::TowerSold {
            tower,
            cell: CellCoord::new(3, 1),
            refund: 62,
        })
    );
    assert_eq!(query::gold(&world), 137);
    assert_eq!(query::tower_at(&world, CellCoord::new(3, 1)), None);

    let events = run(&mut world, Command::SellTower { tower });
    assert_eq!(
        events,
        vec![Event::TowerCommandRejected {
            tower,
            reason: TowerCommandError::MissingTower,
        }]
    );
    assert_eq!(
        query::hud(&world).stats,
        SessionStats {
            gold_spent: 125,
            towers_built: 1,
            towers_sold: 1,
            ..SessionStats::default()
        }
    );
}

#[test]
fn upgrades_stop_at_the_level_cap() {
    let mut world = world_with(1_000, false);
    let tower = place_arrow(&mut world, CellCoord::new(4, 1));
    let _ = run(&mut world, Command::UpgradeTower { tower });
    let _ = run(&mut world, Command::UpgradeTower { tower });
    assert_eq!(query::gold(&world), 750);

    let events = run(&mut world, Command::UpgradeTower { tower });
    assert_eq!(
        events,
        vec![Event::TowerCommandRejected {
            tower,
            reason: TowerCommandError::MaxLevel,
        }]
    );
    assert_eq!(query::gold(&world), 750);
    let snapshot = query::tower_view(&world);
    assert_eq!(snapshot.get(tower).map(|tower| tower.level), Some(3));
    assert_eq!(snapshot.get(tower).map(|tower| tower.range), Some(200.0));
}

#[test]
fn unaffordable_upgrade_is_rejected() {
    let mut world = world_with(50, false);
    let tower = place_arrow(&mut world, CellCoord::new(3, 1));
    let events = run(&mut world, Command::UpgradeTower { tower });
    assert_eq!(
        events,
        vec![Event::TowerCommandRejected {
            tower,
            reason: TowerCommandError::InsufficientGold,
        }]
    );
}

#[test]
fn repairs_require_the_melee_extension() {
    let mut world = world_with(100, false);
    let tower = place_arrow(&mut world, CellCoord::new(3, 1));
    assert_eq!(query::tower_health(&world, tower), None);
    let events = run(&mut world, Command::RepairTower { tower });
    assert_eq!(
        events,
        vec![Event::TowerCommandRejected {
            tower,
            reason: TowerCommandError::MeleeDisabled,
        }]
    );

    let mut world = world_with(100, true);
    let tower = place_arrow(&mut world, CellCoord::new(3, 1));
    let events = run(&mut world, Command::RepairTower { tower });
    assert_eq!(
        events,
        vec![Event::TowerCommandRejected {
            tower,
            reason: TowerCommandError::Undamaged,
        }]
    );
}

#[test]
fn melee_upgrade_raises_tower_health() {
    let mut world = world_with(200, true);
    let tower = place_arrow(&mut world, CellCoord::new(3, 1));
    assert_eq!(query::tower_health(&world, tower).map(|health| health.max), Some(80));
    let _ = run(&mut world, Command::UpgradeTower { tower });
    let health = query::tower_health(&world, tower).expect("melee towers have health");
    assert_eq!(health.max, 110);
    assert_eq!(health.current, 110);
}

#[test]
fn tank_batters_nearby_tower_which_can_be_repaired() {
    let mut world = world_with(100, true);
    let _ = run(
        &mut world,
        Command::SetHeroHeading {
            heading: Vec2::new(1.0, 1.0),
        },
    );
    for _ in 0..80 {
        let _ = step(&mut world, FRAME);
    }

    let tower = place_arrow(&mut world, CellCoord::new(3, 1));
    let _ = run(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Tank,
            wave: 1,
            scaling: 1.0,
        },
    );

    let mut struck = None;
    for _ in 0..400 {
        let events = step(&mut world, FRAME);
        struck = events.iter().find_map(|event| match event {
            Event::TowerDamaged {
                tower: hit,
                amount,
                remaining,
            } if *hit == tower => Some((*amount, *remaining)),
            _ => None,
        });
        if struck.is_some() {
            break;
        }
    }
    assert_eq!(struck, Some((20, 60)));

    let gold_before = query::gold(&world);
    let events = run(&mut world, Command::RepairTower { tower });
    assert_eq!(events, vec![Event::TowerRepaired { tower, cost: 5 }]);
    assert_eq!(query::gold(&world), gold_before - 5);
    assert_eq!(
        query::tower_health(&world, tower).map(|health| health.current),
        Some(80)
    );
}
