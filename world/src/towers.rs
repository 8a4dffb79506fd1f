//! Tower placement, economy commands and route maintenance.

use std::sync::Arc;

use tracing::{debug, warn};
use warden_core::{
    CellCoord, EntityId, Event, Health, PlacementError, TowerCatalog, TowerCommandError,
    TowerKind, MAX_TOWER_LEVEL,
};

use crate::{navigation, store::TowerState, World};

/// Hit points a tower gains with every upgrade while tower melee is enabled.
const UPGRADE_HP_BONUS: i32 = 30;

/// Validates a placement without charging gold; returns the placement cost.
pub(crate) fn check_placement(
    world: &World,
    kind: TowerKind,
    cell: CellCoord,
) -> Result<u32, PlacementError> {
    if world.outcome.is_some() {
        return Err(PlacementError::SessionOver);
    }
    check_site(world, cell)?;
    let cost = TowerCatalog::placement_cost(kind);
    if world.gold < cost {
        return Err(PlacementError::InsufficientGold);
    }
    Ok(cost)
}

/// Validates that a cell can host a tower, ignoring gold and session state.
pub(crate) fn check_site(world: &World, cell: CellCoord) -> Result<(), PlacementError> {
    if !world.map.in_bounds(cell) {
        return Err(PlacementError::OutOfBounds);
    }
    if !world.map.is_buildable(cell) {
        return Err(PlacementError::NotBuildable);
    }
    if world.occupancy.contains_key(&cell) {
        return Err(PlacementError::Occupied);
    }
    if navigation::would_block_path(&world.map, cell, |other| {
        world.occupancy.contains_key(&other)
    }) {
        return Err(PlacementError::BlocksPath);
    }
    Ok(())
}

pub(crate) fn place(world: &mut World, kind: TowerKind, cell: CellCoord, out: &mut Vec<Event>) {
    let cost = match check_placement(world, kind, cell) {
        Ok(cost) => cost,
        Err(reason) => {
            debug!(?kind, ?cell, ?reason, "tower placement rejected");
            out.push(Event::TowerPlacementRejected { kind, cell, reason });
            return;
        }
    };

    world.gold -= cost;
    world.stats.gold_spent += cost;
    world.stats.towers_built += 1;
    let tower = spawn_tower(world, kind, 1, cell, cost);
    debug!(?kind, ?cell, cost, gold = world.gold, "tower placed");
    out.push(Event::TowerPlaced {
        tower,
        kind,
        cell,
        cost,
    });
    recompute_route(world, out);
}

/// Creates a tower entity on an already validated cell.
pub(crate) fn spawn_tower(
    world: &mut World,
    kind: TowerKind,
    level: u8,
    cell: CellCoord,
    invested: u32,
) -> EntityId {
    let tower = world.store.spawn(world.map.grid_to_world(cell));
    let _ = world.store.towers.insert(
        tower,
        TowerState {
            kind,
            level,
            cell,
            cooldown: 0.0,
            invested,
        },
    );
    if world.config.tower_melee {
        let _ = world
            .store
            .healths
            .insert(tower, Health::full(TowerCatalog::max_hp(kind, level), 0));
    }
    let _ = world.occupancy.insert(cell, tower);
    tower
}

pub(crate) fn sell(world: &mut World, tower: EntityId, out: &mut Vec<Event>) {
    if world.outcome.is_some() {
        reject(tower, TowerCommandError::SessionOver, out);
        return;
    }
    let Some(state) = world.store.towers.get(tower) else {
        reject(tower, TowerCommandError::MissingTower, out);
        return;
    };

    let refund = state.invested / 2;
    let cell = state.cell;
    world.gold = world.gold.saturating_add(refund);
    world.stats.towers_sold += 1;
    let _ = world.occupancy.remove(&cell);
    world.store.destroy(tower);
    debug!(?cell, refund, gold = world.gold, "tower sold");
    out.push(Event::TowerSold {
        tower,
        cell,
        refund,
    });
    recompute_route(world, out);
}

pub(crate) fn upgrade(world: &mut World, tower: EntityId, out: &mut Vec<Event>) {
    if world.outcome.is_some() {
        reject(tower, TowerCommandError::SessionOver, out);
        return;
    }
    let Some(state) = world.store.towers.get_mut(tower) else {
        reject(tower, TowerCommandError::MissingTower, out);
        return;
    };
    if state.level >= MAX_TOWER_LEVEL {
        reject(tower, TowerCommandError::MaxLevel, out);
        return;
    }
    let cost = TowerCatalog::upgrade_cost(state.kind, state.level);
    if world.gold < cost {
        reject(tower, TowerCommandError::InsufficientGold, out);
        return;
    }

    world.gold -= cost;
    world.stats.gold_spent += cost;
    state.invested += cost;
    state.level += 1;
    let level = state.level;
    if let Some(health) = world.store.healths.get_mut(tower) {
        health.max += UPGRADE_HP_BONUS;
        health.current += UPGRADE_HP_BONUS;
    }
    debug!(level, cost, gold = world.gold, "tower upgraded");
    out.push(Event::TowerUpgraded { tower, level, cost });
}

pub(crate) fn repair(world: &mut World, tower: EntityId, out: &mut Vec<Event>) {
    if world.outcome.is_some() {
        reject(tower, TowerCommandError::SessionOver, out);
        return;
    }
    if !world.store.towers.contains_key(tower) {
        reject(tower, TowerCommandError::MissingTower, out);
        return;
    }
    if !world.config.tower_melee {
        reject(tower, TowerCommandError::MeleeDisabled, out);
        return;
    }
    let Some(health) = world.store.healths.get_mut(tower) else {
        reject(tower, TowerCommandError::MeleeDisabled, out);
        return;
    };
    let missing = health.max - health.current;
    if missing <= 0 {
        reject(tower, TowerCommandError::Undamaged, out);
        return;
    }
    let cost = repair_cost(missing);
    if world.gold < cost {
        reject(tower, TowerCommandError::InsufficientGold, out);
        return;
    }

    world.gold -= cost;
    world.stats.gold_spent += cost;
    health.current = health.max;
    debug!(cost, gold = world.gold, "tower repaired");
    out.push(Event::TowerRepaired { tower, cost });
}

/// Gold charged to restore `missing` hit points.
pub(crate) fn repair_cost(missing: i32) -> u32 {
    (missing / 4).max(1) as u32
}

/// Removes a tower destroyed by enemies and frees its cell.
pub(crate) fn demolish(world: &mut World, tower: EntityId, out: &mut Vec<Event>) {
    let Some(cell) = world.store.towers.get(tower).map(|state| state.cell) else {
        return;
    };
    let _ = world.occupancy.remove(&cell);
    world.store.destroy(tower);
    debug!(?cell, "tower destroyed");
    out.push(Event::TowerDestroyed { tower, cell });
}

/// Recomputes the cached spawn-to-exit route around the current placements.
pub(crate) fn recompute_route(world: &mut World, out: &mut Vec<Event>) {
    let occupancy = &world.occupancy;
    let route = navigation::find_path(&world.map, world.map.spawn(), world.map.exit(), |cell| {
        occupancy.contains_key(&cell)
    });
    if route.is_empty() {
        warn!(map = world.map.name(), "spawn and exit are disconnected");
    }
    debug!(points = route.len(), "route recomputed");
    let points = route.len();
    world.route = Arc::from(route);
    out.push(Event::RouteRecomputed { points });
}

fn reject(tower: EntityId, reason: TowerCommandError, out: &mut Vec<Event>) {
    debug!(?reason, "tower command rejected");
    out.push(Event::TowerCommandRejected { tower, reason });
}
