use warden_core::{Command, Event, HeroUpgrades, UpgradeError, UpgradeTrack};
use warden_world::{apply, query, GridMap, SimConfig, World};

fn field() -> GridMap {
    GridMap::from_ascii("field", &["S...E", "....."]).expect("valid layout")
}

fn buy(world: &mut World, track: UpgradeTrack) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, Command::PurchaseHeroUpgrade { track }, &mut events);
    events
}

#[test]
fn banked_experience_buys_hero_upgrades() {
    let config = SimConfig {
        upgrade_xp: 350,
        ..SimConfig::default()
    };
    let mut world = World::new(field(), config);

    assert_eq!(
        buy(&mut world, UpgradeTrack::MaxHp),
        vec![Event::HeroUpgradePurchased {
            track: UpgradeTrack::MaxHp,
            level: 1,
            cost: 100,
        }]
    );
    let hero = query::hero(&world).expect("hero exists");
    assert_eq!(hero.health.max, 240);
    assert_eq!(hero.health.current, 240);

    assert_eq!(
        buy(&mut world, UpgradeTrack::MaxHp),
        vec![Event::HeroUpgradePurchased {
            track: UpgradeTrack::MaxHp,
            level: 2,
            cost: 200,
        }]
    );
    assert_eq!(query::hud(&world).upgrade_xp, 50);

    assert_eq!(
        buy(&mut world, UpgradeTrack::AttackRange),
        vec![Event::HeroUpgradeRejected {
            track: UpgradeTrack::AttackRange,
            reason: UpgradeError::InsufficientXp,
        }]
    );
    assert_eq!(query::hero_upgrades(&world).max_hp, 2);
    assert_eq!(query::hero_upgrades(&world).attack_range, 0);
}

#[test]
fn capped_tracks_cannot_be_bought() {
    let config = SimConfig {
        upgrade_xp: 5_000,
        hero_upgrades: HeroUpgrades {
            magnet: 9,
            ..HeroUpgrades::default()
        },
        ..SimConfig::default()
    };
    let mut world = World::new(field(), config);

    assert_eq!(
        buy(&mut world, UpgradeTrack::Magnet),
        vec![Event::HeroUpgradeRejected {
            track: UpgradeTrack::Magnet,
            reason: UpgradeError::MaxLevel,
        }]
    );
    assert_eq!(query::hud(&world).upgrade_xp, 5_000);
}

#[test]
fn upgrades_stay_on_sale_after_the_session_ends() {
    let mut world = World::new(field(), SimConfig::default());
    let mut events = Vec::new();
    apply(&mut world, Command::DeclareVictory, &mut events);
    assert_eq!(events, vec![Event::Victory]);
    assert_eq!(query::hud(&world).upgrade_xp, 500);

    let events = buy(&mut world, UpgradeTrack::AttackDamage);
    assert!(matches!(
        events.as_slice(),
        [Event::HeroUpgradePurchased { level: 1, cost: 100, .. }]
    ));
    assert_eq!(query::hud(&world).upgrade_xp, 400);
}
