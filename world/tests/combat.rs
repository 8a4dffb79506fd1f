use std::time::Duration;

use glam::Vec2;
use warden_core::{
    CellCoord, Command, Difficulty, EffectKind, EnemyKind, EntityId, Event, Outcome, Tint,
    TowerKind,
};
use warden_world::{apply, query, step, GridMap, SimConfig, World};

const FRAME: Duration = Duration::from_millis(50);

fn quiet_config(gold: u32) -> SimConfig {
    SimConfig {
        starting_gold: gold,
        first_wave_delay: 10_000.0,
        wave_delay: 10_000.0,
        ..SimConfig::default()
    }
}

fn spawn(world: &mut World, kind: EnemyKind, scaling: f32) -> EntityId {
    let mut events = Vec::new();
    apply(
        world,
        Command::SpawnEnemy {
            kind,
            wave: 1,
            scaling,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::EnemySpawned { enemy, kind: spawned }] if *spawned == kind => *enemy,
        other => panic!("unexpected spawn events {other:?}"),
    }
}

fn walk_hero(world: &mut World, heading: Vec2, seconds: u32) {
    let mut events = Vec::new();
    apply(world, Command::SetHeroHeading { heading }, &mut events);
    for _ in 0..seconds * 20 {
        let _ = step(world, FRAME);
    }
    apply(
        world,
        Command::SetHeroHeading {
            heading: Vec2::ZERO,
        },
        &mut events,
    );
}

fn zig_zag_level() -> GridMap {
    let map = GridMap::from_ascii(
        "zig-zag",
        &[
            "S..........E",
            "............",
            ".....B......",
            "............",
            "............",
            "............",
        ],
    )
    .expect("valid layout");
    let mut waypoints = vec![CellCoord::new(0, 0)];
    for _ in 0..10 {
        waypoints.push(CellCoord::new(3, 0));
        waypoints.push(CellCoord::new(7, 0));
    }
    waypoints.push(CellCoord::new(11, 0));
    map.with_waypoints(waypoints).expect("waypoints in bounds")
}

#[test]
fn arrow_kills_grunt_with_six_hits() {
    let mut world = World::new(zig_zag_level(), quiet_config(100));
    walk_hero(&mut world, Vec2::new(1.0, 1.0), 4);

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Arrow,
            cell: CellCoord::new(5, 2),
        },
        &mut events,
    );
    assert!(matches!(events.first(), Some(Event::TowerPlaced { .. })));

    let grunt = spawn(&mut world, EnemyKind::Grunt, 1.0);
    let mut remaining_after_hits = Vec::new();
    let mut died = false;
    for _ in 0..800 {
        for event in step(&mut world, FRAME) {
            match event {
                Event::EnemyDamaged {
                    enemy,
                    amount,
                    remaining,
                } if enemy == grunt => {
                    assert!(!died, "dead grunt must not take damage");
                    assert_eq!(amount, 15);
                    remaining_after_hits.push(remaining);
                }
                Event::EnemyDied { enemy, reward, .. } if enemy == grunt => {
                    assert_eq!(reward, 10);
                    died = true;
                }
                _ => {}
            }
        }
        if died {
            break;
        }
    }

    assert!(died, "grunt should die inside the tower's range");
    assert_eq!(remaining_after_hits, vec![65, 50, 35, 20, 5, -10]);
    assert_eq!(query::hud(&world).live_enemies, 0);
}

#[test]
fn hero_kill_drops_gold_the_hero_collects() {
    let map = GridMap::from_ascii("lane", &["S......E"]).expect("valid layout");
    let mut world = World::new(map, quiet_config(0));
    let grunt = spawn(&mut world, EnemyKind::Grunt, 0.05);

    let mut died = false;
    let mut collected = None;
    for _ in 0..40 {
        for event in step(&mut world, FRAME) {
            match event {
                Event::EnemyDied { enemy, reward, .. } if enemy == grunt => {
                    assert_eq!(reward, 1);
                    died = true;
                }
                Event::GoldCollected { amount, total } => collected = Some((amount, total)),
                _ => {}
            }
        }
        if collected.is_some() {
            break;
        }
    }

    assert!(died);
    assert_eq!(collected, Some((1, 1)));
    assert_eq!(query::gold(&world), 1);
    let stats = query::stats(&world);
    assert_eq!(stats.total_kills, 1);
    assert_eq!(stats.boss_kills, 0);
    assert_eq!(stats.gold_earned, 1);
}

#[test]
fn tombstoned_enemies_leave_presentation_after_cleanup() {
    let map = GridMap::from_ascii("lane", &["S......E"]).expect("valid layout");
    let mut world = World::new(map, quiet_config(0));
    let grunt = spawn(&mut world, EnemyKind::Grunt, 0.05);
    assert!(query::presentation(&world).iter().any(|item| {
        item.entity == grunt && item.tint == Some(Tint::from_rgb(200, 50, 50))
    }));

    for _ in 0..40 {
        let events = step(&mut world, FRAME);
        if events
            .iter()
            .any(|event| matches!(event, Event::EnemyDied { enemy, .. } if *enemy == grunt))
        {
            break;
        }
    }
    assert!(query::enemy_view(&world).is_empty());
    assert!(!query::presentation(&world)
        .iter()
        .any(|item| item.entity == grunt));
}

#[test]
fn escaping_enemies_end_the_session_once() {
    let map = GridMap::from_ascii("sprint", &["S..E"]).expect("valid layout");
    let config = SimConfig {
        difficulty: Difficulty::Hard,
        ..quiet_config(0)
    };
    let mut world = World::new(map, config);
    assert_eq!(query::lives(&world), 10);
    for _ in 0..10 {
        let _ = spawn(&mut world, EnemyKind::Runner, 10.0);
    }

    let mut escapes = 0;
    let mut defeats = 0;
    for _ in 0..200 {
        for event in step(&mut world, FRAME) {
            match event {
                Event::EnemyEscaped { .. } => escapes += 1,
                Event::Defeat => defeats += 1,
                _ => {}
            }
        }
        if query::outcome(&world).is_some() {
            break;
        }
    }

    assert_eq!(escapes, 10);
    assert_eq!(defeats, 1);
    assert_eq!(query::lives(&world), 0);
    assert_eq!(query::outcome(&world), Some(Outcome::Defeat));
    assert_eq!(query::hud(&world).upgrade_xp, 0);
    assert_eq!(query::stats(&world).total_kills, 0);

    let events = step(&mut world, FRAME);
    assert_eq!(events, vec![Event::TimeAdvanced { dt: FRAME }]);
}

#[test]
fn ice_tower_slows_its_target() {
    let map = GridMap::from_ascii(
        "frost",
        &["S..........E", ".....B......", "............", "............"],
    )
    .expect("valid layout");
    let mut world = World::new(map, quiet_config(100));
    walk_hero(&mut world, Vec2::new(1.0, 1.0), 4);

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Ice,
            cell: CellCoord::new(5, 1),
        },
        &mut events,
    );
    let tank = spawn(&mut world, EnemyKind::Tank, 1.0);

    let mut slowed = false;
    for _ in 0..200 {
        let events = step(&mut world, FRAME);
        let hit = events.iter().any(|event| {
            matches!(
                event,
                Event::EffectApplied {
                    enemy,
                    effect: EffectKind::Slow,
                } if *enemy == tank
            )
        });
        if hit {
            slowed = true;
            break;
        }
    }
    assert!(slowed);

    let before = position_of(&world, tank);
    let _ = step(&mut world, FRAME);
    let after = position_of(&world, tank);
    let travelled = before.distance(after);
    assert!(travelled < 32.0 * 0.05 * 0.5 + 0.01, "travelled {travelled}");
    assert!(query::presentation(&world)
        .iter()
        .any(|item| item.entity == tank && item.status == Some(EffectKind::Slow)));
}

fn position_of(world: &World, enemy: EntityId) -> Vec2 {
    query::enemy_view(world)
        .iter()
        .find(|snapshot| snapshot.id == enemy)
        .map(|snapshot| snapshot.position)
        .expect("enemy alive")
}
