#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Warden tower-defense engine.
//!
//! The world owns every entity, the placement set and the session counters.
//! Adapters mutate it exclusively through [`apply`] and observe it through the
//! read-only [`query`] module. Pure systems are invoked at fixed points of the
//! tick pipeline and their commands are executed in the order they were
//! emitted.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use glam::Vec2;
use tracing::{debug, warn};
use warden_core::{
    hero_max_hp, AbilityRequest, CellCoord, Command, EntityId, Event, Health, Outcome,
    SessionStats, TowerTarget, HERO_ARMOR,
};
use warden_system_hero::HeroSystem;
use warden_system_spawning::{Config as DirectorConfig, WaveDirector};
use warden_system_tower_combat::TowerCombat;
use warden_system_tower_targeting::TowerTargeting;
use warden_system_wave_generation::WaveGenerator;

mod config;
mod level;
mod navigation;
mod pipeline;
mod session;
mod store;
mod towers;

pub use config::SimConfig;
pub use level::{GridMap, LevelDefinition, LevelError};
pub use navigation::{find_path, would_block_path};
pub use session::SessionError;

use store::{EntityStore, HeroState};

/// Represents the authoritative Warden world state.
#[derive(Debug)]
pub struct World {
    map: GridMap,
    config: SimConfig,
    store: EntityStore,
    occupancy: BTreeMap<CellCoord, EntityId>,
    route: Arc<[Vec2]>,
    waypoint_route: Option<Arc<[Vec2]>>,
    flying_route: Arc<[Vec2]>,
    hero: EntityId,
    gold: u32,
    lives: u32,
    live_enemies: u32,
    time_scale: f32,
    outcome: Option<Outcome>,
    upgrade_xp: u32,
    stats: SessionStats,
    director: WaveDirector,
    targeting: TowerTargeting,
    combat: TowerCombat,
    hero_system: HeroSystem,
    tower_targets: Vec<TowerTarget>,
    system_commands: Vec<Command>,
}

impl World {
    /// Creates a fresh session on the provided level.
    #[must_use]
    pub fn new(map: GridMap, config: SimConfig) -> Self {
        let config = SimConfig {
            hero_upgrades: config.hero_upgrades.clamped(),
            ..config
        };

        let mut store = EntityStore::default();
        let hero = store.spawn(map.grid_to_world(map.spawn()));
        let _ = store.heroes.insert(
            hero,
            HeroState {
                level: 1,
                ..HeroState::default()
            },
        );
        let _ = store.healths.insert(
            hero,
            Health::full(hero_max_hp(1, &config.hero_upgrades), HERO_ARMOR),
        );
        let _ = store.velocities.insert(hero, Vec2::ZERO);

        let route = find_path(&map, map.spawn(), map.exit(), |_| false);
        if route.is_empty() {
            warn!(map = map.name(), "spawn and exit are disconnected");
        }
        let waypoint_route: Option<Arc<[Vec2]>> =
            (map.waypoints().len() >= 2).then(|| Arc::from(map.waypoint_route()));
        let flying_route: Arc<[Vec2]> = Arc::from(map.flying_route());
        let director = WaveDirector::new(
            DirectorConfig::new(
                config.first_wave_delay,
                config.wave_delay,
                config.wave_completion,
            ),
            WaveGenerator::new(config.difficulty),
        );

        Self {
            route: Arc::from(route),
            waypoint_route,
            flying_route,
            hero,
            gold: config.starting_gold,
            lives: config.difficulty.starting_lives(),
            live_enemies: 0,
            time_scale: 1.0,
            outcome: None,
            upgrade_xp: config.upgrade_xp,
            stats: SessionStats::default(),
            director,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            hero_system: HeroSystem::new(),
            tower_targets: Vec::new(),
            system_commands: Vec::new(),
            occupancy: BTreeMap::new(),
            store,
            config,
            map,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => pipeline::tick(world, dt, out_events),
        Command::SetTimeScale { scale } => {
            if !scale.is_finite() || scale <= 0.0 {
                debug!(scale, "time scale rejected");
                return;
            }
            world.time_scale = scale;
            out_events.push(Event::TimeScaleChanged { scale });
        }
        Command::PlaceTower { kind, cell } => towers::place(world, kind, cell, out_events),
        Command::SellTower { tower } => towers::sell(world, tower, out_events),
        Command::UpgradeTower { tower } => towers::upgrade(world, tower, out_events),
        Command::RepairTower { tower } => towers::repair(world, tower, out_events),
        Command::SetHeroHeading { heading } => {
            if let Some(state) = world.store.heroes.get_mut(world.hero) {
                state.heading = heading.normalize_or_zero();
            }
        }
        Command::TriggerAbility { ability, target } => {
            if world.outcome.is_some() {
                return;
            }
            if let Some(state) = world.store.heroes.get_mut(world.hero) {
                state.requests.push(AbilityRequest { ability, target });
            }
        }
        Command::StartNextWave => {
            if world.outcome.is_none() && world.director.start_early() {
                debug!(wave = world.director.wave() + 1, "next wave called early");
            }
        }
        Command::PurchaseHeroUpgrade { track } => {
            session::purchase_upgrade(world, track, out_events);
        }
        system_command => pipeline::execute(world, system_command, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use warden_core::{
        enemy_stats, xp_threshold, CellCoord, EnemySnapshot, EnemyView, EntityId, Health,
        HeroUpgrades, HudSnapshot, Outcome, PresentationItem, SessionSnapshot, SessionStats,
        TowerCatalog, TowerSnapshot, TowerView, VisualKind,
    };
    use warden_system_spawning::Phase;

    use super::{session, towers, GridMap, SimConfig, World};

    /// Provides read-only access to the loaded level.
    #[must_use]
    pub fn map(world: &World) -> &GridMap {
        &world.map
    }

    /// Rules the session was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimConfig {
        &world.config
    }

    /// Cached spawn-to-exit route around the current placements.
    #[must_use]
    pub fn route(world: &World) -> &[Vec2] {
        &world.route
    }

    /// Reports whether a tower may be placed on the cell, ignoring gold.
    #[must_use]
    pub fn can_place_tower(world: &World, cell: CellCoord) -> bool {
        towers::check_site(world, cell).is_ok()
    }

    /// Tower occupying the cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<EntityId> {
        world.occupancy.get(&cell).copied()
    }

    /// Health pool of a tower while tower melee is enabled.
    #[must_use]
    pub fn tower_health(world: &World, tower: EntityId) -> Option<Health> {
        if !world.store.towers.contains_key(tower) {
            return None;
        }
        world.store.healths.get(tower).copied()
    }

    /// Gold available for spending.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Lives left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Terminal result once the session ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Multiplier applied to tick deltas.
    #[must_use]
    pub fn time_scale(world: &World) -> f32 {
        world.time_scale
    }

    /// Permanent hero upgrades in effect, including purchases made this session.
    #[must_use]
    pub fn hero_upgrades(world: &World) -> HeroUpgrades {
        world.config.hero_upgrades
    }

    /// Running session totals.
    #[must_use]
    pub fn stats(world: &World) -> SessionStats {
        world.stats
    }

    /// Captures every tower in identifier order.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots = world
            .store
            .towers
            .iter()
            .filter_map(|(id, state)| {
                let stats = TowerCatalog::stats(state.kind, state.level)?;
                Some(TowerSnapshot {
                    id,
                    kind: state.kind,
                    level: state.level,
                    cell: state.cell,
                    position: world.store.positions.get(id).copied()?,
                    range: stats.range,
                    ready: state.cooldown <= 0.0,
                })
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures every enemy that has not been tombstoned.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .store
            .active_enemies()
            .into_iter()
            .filter_map(|id| {
                Some(EnemySnapshot {
                    id,
                    kind: world.store.enemies.get(id)?.kind,
                    position: world.store.positions.get(id).copied()?,
                    health: world.store.healths.get(id).copied()?,
                })
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Read-only description of the hero.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct HeroStatus {
        /// Current world-space position.
        pub position: Vec2,
        /// Current level.
        pub level: u32,
        /// Experience toward the next level.
        pub xp: u32,
        /// Current health pool.
        pub health: Health,
        /// Seconds left on each ability cooldown, indexed by slot.
        pub ability_cooldowns: [f32; 3],
    }

    /// Captures the hero's current state.
    #[must_use]
    pub fn hero(world: &World) -> Option<HeroStatus> {
        let state = world.store.heroes.get(world.hero)?;
        Some(HeroStatus {
            position: world.store.positions.get(world.hero).copied()?,
            level: state.level,
            xp: state.xp,
            health: world.store.healths.get(world.hero).copied()?,
            ability_cooldowns: state.ability_timers,
        })
    }

    /// Lists every live entity for renderers.
    #[must_use]
    pub fn presentation(world: &World) -> Vec<PresentationItem> {
        let store = &world.store;
        store
            .ids()
            .filter(|id| store.is_active(*id))
            .filter_map(|id| {
                let mut tint = None;
                let visual = if let Some(enemy) = store.enemies.get(id) {
                    tint = Some(enemy_stats(enemy.kind, enemy.scaling).tint);
                    VisualKind::Enemy(enemy.kind)
                } else if let Some(tower) = store.towers.get(id) {
                    tint = TowerCatalog::stats(tower.kind, tower.level).map(|stats| stats.tint);
                    VisualKind::Tower {
                        kind: tower.kind,
                        level: tower.level,
                    }
                } else if store.projectiles.contains_key(id) {
                    VisualKind::Projectile
                } else if store.heroes.contains_key(id) {
                    VisualKind::Hero
                } else if store.pickups.contains_key(id) {
                    VisualKind::Pickup
                } else {
                    VisualKind::Marker(*store.markers.get(id)?)
                };
                Some(PresentationItem {
                    entity: id,
                    position: store.positions.get(id).copied()?,
                    visual,
                    health_ratio: store.healths.get(id).map(Health::ratio),
                    status: store.effects.get(id).map(|effect| effect.kind),
                    tint,
                })
            })
            .collect()
    }

    /// Summarises the session counters.
    #[must_use]
    pub fn hud(world: &World) -> HudSnapshot {
        let (hero_level, hero_xp) = world
            .store
            .heroes
            .get(world.hero)
            .map_or((1, 0), |state| (state.level, state.xp));
        let next_wave_in = match world.director.phase() {
            Phase::Countdown { remaining } if world.outcome.is_none() => Some(remaining.max(0.0)),
            _ => None,
        };
        HudSnapshot {
            gold: world.gold,
            lives: world.lives,
            wave: world.director.wave(),
            total_waves: world.director.total_waves(),
            wave_active: world.director.is_wave_active(),
            live_enemies: world.live_enemies,
            hero_level,
            hero_xp,
            hero_xp_to_next: xp_threshold(hero_level),
            next_wave_in,
            time_scale: world.time_scale,
            outcome: world.outcome,
            upgrade_xp: world.upgrade_xp,
            stats: world.stats,
        }
    }

    /// Captures persistent progress; `None` while a wave runs or after the session ended.
    #[must_use]
    pub fn session_snapshot(world: &World) -> Option<SessionSnapshot> {
        session::capture(world)
    }
}

/// Convenience wrapper that advances the world by `dt` and returns the events.
#[must_use]
pub fn step(world: &mut World, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, Command::Tick { dt }, &mut events);
    events
}
