//! Between-wave session capture and restore, plus permanent hero progression.

use thiserror::Error;
use tracing::{debug, info, warn};
use warden_core::{
    hero_max_hp, CellCoord, Event, Health, HeroUpgrades, Outcome, PlacementError,
    SessionSnapshot, TowerCatalog, TowerRecord, UpgradeError, UpgradeTrack, HERO_ARMOR,
    MAX_TOWER_LEVEL,
};

use crate::{config::SimConfig, level::GridMap, towers, World};

/// Errors raised while restoring a saved session.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// The session was saved on a different level.
    #[error("session belongs to level {saved:?} but {loaded:?} is loaded")]
    MapMismatch {
        /// Level named in the snapshot.
        saved: String,
        /// Level the world was asked to load.
        loaded: String,
    },
    /// The hero level is zero.
    #[error("hero level must be at least one")]
    InvalidHero,
    /// A tower record names a level outside the catalog.
    #[error("tower at {cell:?} has unknown level {level}")]
    InvalidTowerLevel {
        /// Cell of the offending tower.
        cell: CellCoord,
        /// Level stored in the record.
        level: u8,
    },
    /// A tower record cannot legally stand on its cell.
    #[error("tower at {cell:?} cannot be restored: {reason:?}")]
    IllegalTower {
        /// Cell of the offending tower.
        cell: CellCoord,
        /// Placement rule the tower violates.
        reason: PlacementError,
    },
}

impl World {
    /// Rebuilds a world from a snapshot taken between waves.
    ///
    /// Towers are placed free of charge in record order and must satisfy the
    /// usual placement rules; the wave countdown resumes after the saved wave.
    pub fn from_session(
        map: GridMap,
        config: SimConfig,
        snapshot: &SessionSnapshot,
    ) -> Result<Self, SessionError> {
        if snapshot.map != map.name() {
            return Err(SessionError::MapMismatch {
                saved: snapshot.map.clone(),
                loaded: map.name().to_owned(),
            });
        }
        if snapshot.hero_level == 0 {
            return Err(SessionError::InvalidHero);
        }

        let mut world = World::new(map, config);
        world.gold = snapshot.gold;
        world.lives = snapshot.lives;

        let hero = world.hero;
        if let Some(state) = world.store.heroes.get_mut(hero) {
            state.level = snapshot.hero_level;
            state.xp = snapshot.hero_xp;
        }
        let max = hero_max_hp(snapshot.hero_level, &world.config.hero_upgrades);
        let _ = world.store.healths.insert(hero, Health::full(max, HERO_ARMOR));

        for record in &snapshot.towers {
            restore_tower(&mut world, record)?;
        }
        let mut discarded = Vec::new();
        towers::recompute_route(&mut world, &mut discarded);
        world.director.resume_after(snapshot.wave);

        info!(
            map = world.map.name(),
            wave = snapshot.wave,
            towers = snapshot.towers.len(),
            "session restored"
        );
        Ok(world)
    }
}

fn restore_tower(world: &mut World, record: &TowerRecord) -> Result<(), SessionError> {
    let TowerRecord { kind, level, cell } = *record;
    if level == 0 || level > MAX_TOWER_LEVEL {
        warn!(?kind, ?cell, level, "saved tower has an unknown level");
        return Err(SessionError::InvalidTowerLevel { cell, level });
    }
    if let Err(reason) = towers::check_site(world, cell) {
        warn!(?kind, ?cell, ?reason, "saved tower rejected");
        return Err(SessionError::IllegalTower { cell, reason });
    }

    let invested = (1..=level)
        .filter_map(|step| TowerCatalog::stats(kind, step))
        .map(|stats| stats.cost)
        .sum();
    let _ = towers::spawn_tower(world, kind, level, cell, invested);
    Ok(())
}

/// Captures the persistent progress of a world that is between waves.
pub(crate) fn capture(world: &World) -> Option<SessionSnapshot> {
    if world.outcome.is_some() || world.director.is_wave_active() {
        return None;
    }
    let hero = world.store.heroes.get(world.hero)?;
    let towers = world
        .occupancy
        .values()
        .filter_map(|tower| world.store.towers.get(*tower))
        .map(|state| TowerRecord {
            kind: state.kind,
            level: state.level,
            cell: state.cell,
        })
        .collect();

    Some(SessionSnapshot {
        map: world.map.name().to_owned(),
        gold: world.gold,
        lives: world.lives,
        wave: world.director.wave(),
        hero_level: hero.level,
        hero_xp: hero.xp,
        towers,
    })
}

/// Upgrade experience granted per wave reached when a session ends.
const UPGRADE_XP_PER_WAVE: u32 = 10;
/// Extra upgrade experience granted for clearing every wave.
const VICTORY_UPGRADE_XP: u32 = 500;

/// Ends the session and banks the upgrade experience it earned.
pub(crate) fn conclude(world: &mut World, outcome: Outcome, out: &mut Vec<Event>) {
    if world.outcome.is_some() {
        return;
    }
    world.outcome = Some(outcome);
    let wave = world.director.wave();
    let mut earned = wave * UPGRADE_XP_PER_WAVE;
    if outcome == Outcome::Victory {
        earned += VICTORY_UPGRADE_XP;
    }
    world.upgrade_xp = world.upgrade_xp.saturating_add(earned);
    info!(?outcome, wave, gold = world.gold, earned, "session over");
    out.push(match outcome {
        Outcome::Victory => Event::Victory,
        Outcome::Defeat => Event::Defeat,
    });
}

/// Spends banked upgrade experience on the next level of a hero track.
pub(crate) fn purchase_upgrade(world: &mut World, track: UpgradeTrack, out: &mut Vec<Event>) {
    let mut upgrades = world.config.hero_upgrades;
    let Some(cost) = HeroUpgrades::cost(upgrades.level(track)) else {
        reject_upgrade(track, UpgradeError::MaxLevel, out);
        return;
    };
    if world.upgrade_xp < cost {
        reject_upgrade(track, UpgradeError::InsufficientXp, out);
        return;
    }

    world.upgrade_xp -= cost;
    upgrades.raise(track);
    world.config.hero_upgrades = upgrades;
    if track == UpgradeTrack::MaxHp {
        let level = world
            .store
            .heroes
            .get(world.hero)
            .map_or(1, |state| state.level);
        if let Some(health) = world.store.healths.get_mut(world.hero) {
            let max = hero_max_hp(level, &upgrades);
            health.current += max - health.max;
            health.max = max;
        }
    }
    let level = upgrades.level(track);
    info!(?track, level, cost, "hero upgrade purchased");
    out.push(Event::HeroUpgradePurchased { track, level, cost });
}

fn reject_upgrade(track: UpgradeTrack, reason: UpgradeError, out: &mut Vec<Event>) {
    debug!(?track, ?reason, "hero upgrade rejected");
    out.push(Event::HeroUpgradeRejected { track, reason });
}
