//! Fixed-order tick pipeline and execution of system-issued commands.

use std::{mem, sync::Arc, time::Duration};

use glam::Vec2;
use tracing::{debug, info, warn};
use warden_core::{
    ability_spec, apply_damage, boss_ability_for_wave, enemy_stats, hero_max_hp, xp_threshold,
    BossAbility, Command, EffectSpec, EnemyKind, EntityId, Event, Health, HeroAbility,
    HeroSnapshot, MarkerKind, Outcome, TowerCatalog, HERO_ARMOR, HERO_BASE_DAMAGE,
    HERO_PROJECTILE_SPEED, HERO_SPEED,
};
use warden_system_wave_generation::is_boss_wave;

use crate::{
    query,
    store::{
        Aura, BossState, EnemyState, EntityStore, PathProgress, Payload, ProjectileState,
        StatusEffect, EFFECT_TICK_INTERVAL,
    },
    session, towers, World,
};

const WAYPOINT_TOLERANCE: f32 = 4.0;
const TOWER_PROJECTILE_SPEED: f32 = 500.0;
const PROJECTILE_LIFETIME: f32 = 5.0;
const HIT_RADIUS: f32 = 12.0;
const CHAIN_RANGE: f32 = 100.0;
const CHAIN_SPEED_FACTOR: f32 = 1.5;
const MARKER_LIFETIME: f32 = 0.4;

const HEALER_RADIUS: f32 = 80.0;
const HEALER_RATE: f32 = 5.0;

const BOSS_ABILITY_COOLDOWN: f32 = 5.0;
const SPEED_BURST_FACTOR: f32 = 2.5;
const SPEED_BURST_DURATION: f32 = 2.0;
const MINION_COUNT: usize = 3;
const MINION_SCALING_FACTOR: f32 = 0.5;
const DAMAGE_AURA_DURATION: f32 = 3.0;
const DAMAGE_AURA_RADIUS: f32 = 120.0;
const DAMAGE_AURA_RATE: f32 = 5.0;

const HERO_MELEE_REACH: f32 = 12.0;
const TOWER_MELEE_REACH: f32 = 20.0;

const HERO_RADIUS: f32 = 10.0;
const MIN_SEPARATION: f32 = 0.01;

const PICKUP_LIFETIME: f32 = 15.0;
const PICKUP_RADIUS: f32 = 60.0;
const PICKUP_PULL_SPEED: f32 = 200.0;

/// Advances the world by one scaled step.
pub(crate) fn tick(world: &mut World, dt: Duration, out: &mut Vec<Event>) {
    let scaled = scale_delta(dt, world.time_scale);
    out.push(Event::TimeAdvanced { dt: scaled });
    if world.outcome.is_some() {
        return;
    }
    let secs = scaled.as_secs_f32();

    follow_paths(world, secs);
    integrate_motion(world, secs);
    separate_bodies(world);
    run_towers(world, secs, out);
    fly_projectiles(world, secs, out);
    resolve_effects(world, secs, out);
    heal_auras(world, secs);
    run_bosses(world, secs, out);
    run_melee(world, secs, out);
    resolve_health(world, out);
    if world.outcome.is_some() {
        return;
    }
    run_director(world, scaled, out);
    if world.outcome.is_some() {
        return;
    }
    run_hero(world, secs, out);
    collect_pickups(world, secs, out);
    expire_lifetimes(world, secs);
}

fn scale_delta(dt: Duration, scale: f32) -> Duration {
    let nanos = dt.as_nanos() as f64 * f64::from(scale);
    Duration::from_nanos(nanos.round() as u64)
}

/// Executes a command produced by one of the pure systems.
pub(crate) fn execute(world: &mut World, command: Command, out: &mut Vec<Event>) {
    match command {
        Command::BeginWave { wave } => {
            let boss = is_boss_wave(wave);
            info!(wave, boss, "wave started");
            out.push(Event::WaveStarted { wave, boss });
        }
        Command::SpawnEnemy {
            kind,
            wave,
            scaling,
        } => {
            let route = route_for(world, kind);
            if route.is_empty() {
                warn!(?kind, wave, "no route available, enemy skipped");
                return;
            }
            spawn_enemy(world, kind, wave, scaling, route, out);
        }
        Command::CompleteWave { wave } => {
            info!(wave, "wave completed");
            out.push(Event::WaveCompleted { wave });
        }
        Command::DeclareVictory => session::conclude(world, Outcome::Victory, out),
        Command::FireProjectile { tower, target } => fire_projectile(world, tower, target, out),
        Command::FireBeam { tower, target } => fire_beam(world, tower, target, out),
        Command::HeroAttack { target } => hero_attack(world, target, out),
        Command::CastAbility { ability, target } => cast_ability(world, ability, target, out),
        other => debug!(?other, "not a system command"),
    }
}

fn execute_batch(world: &mut World, commands: &mut Vec<Command>, out: &mut Vec<Event>) {
    for command in commands.drain(..) {
        execute(world, command, out);
    }
}

fn route_for(world: &World, kind: EnemyKind) -> Arc<[Vec2]> {
    if kind.is_flying() {
        return Arc::clone(&world.flying_route);
    }
    match &world.waypoint_route {
        Some(route) => Arc::clone(route),
        None => Arc::clone(&world.route),
    }
}

fn spawn_enemy(
    world: &mut World,
    kind: EnemyKind,
    wave: u32,
    scaling: f32,
    route: Arc<[Vec2]>,
    out: &mut Vec<Event>,
) {
    let Some(start) = route.first().copied() else {
        return;
    };
    let stats = enemy_stats(kind, scaling);
    let enemy = world.store.spawn(start);
    let _ = world.store.velocities.insert(enemy, Vec2::ZERO);
    let _ = world
        .store
        .healths
        .insert(enemy, Health::full(stats.hp, stats.armor));
    let _ = world.store.enemies.insert(
        enemy,
        EnemyState {
            kind,
            reward: stats.reward,
            melee: stats.melee,
            attack_timer: 0.0,
            scaling,
            radius: stats.radius(),
        },
    );
    let _ = world.store.paths.insert(
        enemy,
        PathProgress {
            points: route,
            index: 0,
            speed: stats.speed,
            base_speed: stats.speed,
            finished: false,
        },
    );
    match kind {
        EnemyKind::Healer => {
            let _ = world.store.auras.insert(
                enemy,
                Aura {
                    radius: HEALER_RADIUS,
                    heal_per_second: HEALER_RATE * scaling,
                    carry: 0.0,
                },
            );
        }
        EnemyKind::Boss => {
            let _ = world.store.bosses.insert(
                enemy,
                BossState {
                    ability: boss_ability_for_wave(wave),
                    timer: 0.0,
                    active_remaining: 0.0,
                    aura_carry: 0.0,
                },
            );
        }
        _ => {}
    }
    world.live_enemies += 1;
    debug!(?kind, wave, scaling, "enemy spawned");
    out.push(Event::EnemySpawned { enemy, kind });
}

fn follow_paths(world: &mut World, secs: f32) {
    let store = &mut world.store;
    for (id, progress) in store.paths.iter_mut() {
        let halted = store.dead.contains_key(id) || progress.finished;
        let Some(position) = store.positions.get(id).copied() else {
            continue;
        };
        if halted {
            let _ = store.velocities.insert(id, Vec2::ZERO);
            continue;
        }

        while let Some(point) = progress.points.get(progress.index) {
            if position.distance(*point) > WAYPOINT_TOLERANCE {
                break;
            }
            progress.index += 1;
        }

        let velocity = match progress.points.get(progress.index) {
            None => {
                progress.finished = true;
                Vec2::ZERO
            }
            Some(point) => {
                let multiplier = store
                    .effects
                    .get(id)
                    .map_or(1.0, |effect| effect.speed_multiplier);
                let offset = *point - position;
                let distance = offset.length();
                let mut speed = progress.speed * multiplier;
                if secs > 0.0 {
                    speed = speed.min(distance / secs);
                }
                offset / distance * speed
            }
        };
        let _ = store.velocities.insert(id, velocity);
    }
}

fn integrate_motion(world: &mut World, secs: f32) {
    let store = &mut world.store;
    for (id, velocity) in store.velocities.iter() {
        if store.dead.contains_key(id) {
            continue;
        }
        if let Some(position) = store.positions.get_mut(id) {
            *position += *velocity * secs;
        }
    }
    clamp_hero(world);
}

fn clamp_hero(world: &mut World) {
    let bounds = world.map.world_size();
    if let Some(position) = world.store.positions.get_mut(world.hero) {
        *position = position.clamp(Vec2::ZERO, bounds);
    }
}

/// Pushes overlapping ground bodies apart; the hero counts as a body too.
fn separate_bodies(world: &mut World) {
    let bodies: Vec<(EntityId, f32)> = world
        .store
        .active_enemies()
        .into_iter()
        .filter_map(|id| {
            let state = world.store.enemies.get(id)?;
            (!state.kind.is_flying()).then_some((id, state.radius))
        })
        .collect();

    let hero = world.hero;
    for &(enemy, radius) in &bodies {
        push_apart(&mut world.store, hero, enemy, HERO_RADIUS + radius);
    }
    for (index, &(first, first_radius)) in bodies.iter().enumerate() {
        for &(second, second_radius) in &bodies[index + 1..] {
            push_apart(&mut world.store, first, second, first_radius + second_radius);
        }
    }
    clamp_hero(world);
}

/// Moves both bodies half of the overlap along the line between them.
///
/// Coincident bodies have no direction to separate along and stay put.
fn push_apart(store: &mut EntityStore, first: EntityId, second: EntityId, min_distance: f32) {
    let (Some(a), Some(b)) = (
        store.positions.get(first).copied(),
        store.positions.get(second).copied(),
    ) else {
        return;
    };
    let offset = a - b;
    let distance = offset.length();
    if distance >= min_distance || distance <= MIN_SEPARATION {
        return;
    }
    let push = offset / distance * ((min_distance - distance) * 0.5);
    if let Some(position) = store.positions.get_mut(first) {
        *position += push;
    }
    if let Some(position) = store.positions.get_mut(second) {
        *position -= push;
    }
}

/// Enemy body radius; zero for anything that is not an enemy.
fn body_radius(store: &EntityStore, enemy: EntityId) -> f32 {
    store.enemies.get(enemy).map_or(0.0, |state| state.radius)
}

fn run_towers(world: &mut World, secs: f32, out: &mut Vec<Event>) {
    for tower in world.store.towers.values_mut() {
        tower.cooldown = (tower.cooldown - secs).max(0.0);
    }

    let towers = query::tower_view(world);
    let enemies = query::enemy_view(world);
    world.tower_targets.clear();
    world
        .targeting
        .handle(&towers, &enemies, &mut world.tower_targets);

    let mut commands = mem::take(&mut world.system_commands);
    world
        .combat
        .handle(&towers, &world.tower_targets, &mut commands);
    execute_batch(world, &mut commands, out);
    world.system_commands = commands;
}

fn fire_projectile(world: &mut World, tower: EntityId, target: EntityId, out: &mut Vec<Event>) {
    let Some(state) = world.store.towers.get(tower) else {
        return;
    };
    let Some(stats) = TowerCatalog::stats(state.kind, state.level) else {
        return;
    };
    let Some(origin) = world.store.positions.get(tower).copied() else {
        return;
    };
    let Some(last_known) = live_enemy_position(world, target) else {
        return;
    };
    if let Some(state) = world.store.towers.get_mut(tower) {
        state.cooldown = stats.fire_interval();
    }
    launch(
        world,
        origin,
        ProjectileState {
            target,
            last_known,
            speed: TOWER_PROJECTILE_SPEED,
            payload: Payload {
                damage: stats.damage,
                area_radius: stats.area_radius,
                chain_count: stats.chain_count,
                effect: stats.effect,
            },
            already_hit: Vec::new(),
        },
        out,
    );
}

fn fire_beam(world: &mut World, tower: EntityId, target: EntityId, out: &mut Vec<Event>) {
    let Some(state) = world.store.towers.get_mut(tower) else {
        return;
    };
    let Some(stats) = TowerCatalog::stats(state.kind, state.level) else {
        return;
    };
    state.cooldown = stats.fire_interval();
    if damage_enemy(world, target, stats.damage, out) {
        if let Some(effect) = stats.effect {
            apply_effect(world, target, effect, out);
        }
    }
}

fn launch(world: &mut World, origin: Vec2, projectile: ProjectileState, out: &mut Vec<Event>) {
    let target = projectile.target;
    let id = world.store.spawn(origin);
    let _ = world.store.projectiles.insert(id, projectile);
    let _ = world.store.lifetimes.insert(id, PROJECTILE_LIFETIME);
    out.push(Event::ProjectileLaunched {
        projectile: id,
        target,
    });
}

fn fly_projectiles(world: &mut World, secs: f32, out: &mut Vec<Event>) {
    let ids: Vec<EntityId> = world.store.projectiles.keys().collect();
    let mut impacted = Vec::new();
    for id in ids {
        let Some(position) = world.store.positions.get(id).copied() else {
            continue;
        };
        let Some(target) = world.store.projectiles.get(id).map(|projectile| projectile.target)
        else {
            continue;
        };
        let tracked = live_position(&world.store, target);
        let reach = HIT_RADIUS.max(body_radius(&world.store, target));
        let Some(projectile) = world.store.projectiles.get_mut(id) else {
            continue;
        };
        if let Some(point) = tracked {
            projectile.last_known = point;
        }

        let offset = projectile.last_known - position;
        let distance = offset.length();
        let step = projectile.speed * secs;
        let next = if distance <= step {
            projectile.last_known
        } else {
            position + offset / distance * step
        };
        let arrived = next.distance(projectile.last_known) < reach;
        let _ = world.store.positions.insert(id, next);
        if arrived {
            impacted.push(id);
        }
    }

    for id in impacted {
        let Some(projectile) = world.store.projectiles.remove(id) else {
            continue;
        };
        let point = world.store.positions.get(id).copied().unwrap_or(projectile.last_known);
        world.store.destroy(id);
        impact(world, projectile, point, out);
    }
}

fn impact(world: &mut World, projectile: ProjectileState, point: Vec2, out: &mut Vec<Event>) {
    let payload = projectile.payload;
    let mut hit = Vec::new();
    if payload.area_radius > 0.0 {
        for enemy in world.store.active_enemies() {
            let within = live_position(&world.store, enemy)
                .is_some_and(|position| position.distance(point) <= payload.area_radius);
            if within {
                hit.push(enemy);
            }
        }
        spawn_marker(world, MarkerKind::Explosion, point);
    } else if live_position(&world.store, projectile.target).is_some() {
        hit.push(projectile.target);
    }

    for enemy in &hit {
        if damage_enemy(world, *enemy, payload.damage, out) {
            if let Some(effect) = payload.effect {
                apply_effect(world, *enemy, effect, out);
            }
        }
    }

    if payload.chain_count == 0 || hit.is_empty() {
        return;
    }
    let mut already_hit = projectile.already_hit;
    already_hit.extend(hit);
    let Some((next_target, last_known)) =
        nearest_live_enemy(world, point, CHAIN_RANGE, &already_hit)
    else {
        return;
    };
    launch(
        world,
        point,
        ProjectileState {
            target: next_target,
            last_known,
            speed: projectile.speed * CHAIN_SPEED_FACTOR,
            payload: Payload {
                damage: payload.damage * 3 / 4,
                chain_count: payload.chain_count - 1,
                ..payload
            },
            already_hit,
        },
        out,
    );
}

fn nearest_live_enemy(
    world: &World,
    point: Vec2,
    range: f32,
    excluded: &[EntityId],
) -> Option<(EntityId, Vec2)> {
    let mut best: Option<(f32, EntityId, Vec2)> = None;
    for enemy in world.store.active_enemies() {
        if excluded.contains(&enemy) {
            continue;
        }
        let Some(position) = live_position(&world.store, enemy) else {
            continue;
        };
        let distance = position.distance(point);
        if distance > range {
            continue;
        }
        if best.map_or(true, |(current, _, _)| distance < current) {
            best = Some((distance, enemy, position));
        }
    }
    best.map(|(_, enemy, position)| (enemy, position))
}

/// Position of an enemy that is active and still has hit points.
fn live_position(store: &EntityStore, enemy: EntityId) -> Option<Vec2> {
    let health = store.healths.get(enemy)?;
    if health.is_depleted() {
        return None;
    }
    store.enemy_position(enemy)
}

fn live_enemy_position(world: &World, enemy: EntityId) -> Option<Vec2> {
    live_position(&world.store, enemy)
}

/// Deals `raw` damage reduced by armor; returns whether the enemy was struck.
fn damage_enemy(world: &mut World, enemy: EntityId, raw: i32, out: &mut Vec<Event>) -> bool {
    let Some(armor) = world.store.healths.get(enemy).map(|health| health.armor) else {
        return false;
    };
    strike_enemy(world, enemy, apply_damage(raw, armor), out)
}

/// Deals exact damage, bypassing armor.
fn strike_enemy(world: &mut World, enemy: EntityId, amount: i32, out: &mut Vec<Event>) -> bool {
    if live_enemy_position(world, enemy).is_none() {
        return false;
    }
    let Some(health) = world.store.healths.get_mut(enemy) else {
        return false;
    };
    health.current -= amount;
    out.push(Event::EnemyDamaged {
        enemy,
        amount,
        remaining: health.current,
    });
    true
}

fn apply_effect(world: &mut World, enemy: EntityId, spec: EffectSpec, out: &mut Vec<Event>) {
    if !world.store.is_active(enemy) || !world.store.enemies.contains_key(enemy) {
        return;
    }
    let _ = world
        .store
        .effects
        .insert(enemy, StatusEffect::from_spec(spec));
    out.push(Event::EffectApplied {
        enemy,
        effect: spec.kind,
    });
}

fn resolve_effects(world: &mut World, secs: f32, out: &mut Vec<Event>) {
    let ids: Vec<EntityId> = world.store.effects.keys().collect();
    for id in ids {
        let Some(effect) = world.store.effects.get_mut(id) else {
            continue;
        };
        let mut damage = 0;
        if effect.tick_damage > 0 {
            effect.tick_timer -= secs;
            while effect.tick_timer <= 0.0 {
                damage += effect.tick_damage;
                effect.tick_timer += EFFECT_TICK_INTERVAL;
            }
        }
        effect.remaining -= secs;
        let expired = effect.remaining <= 0.0;

        if damage > 0 {
            let _ = strike_enemy(world, id, damage, out);
        }
        if expired {
            let _ = world.store.effects.remove(id);
        }
    }
}

fn heal_auras(world: &mut World, secs: f32) {
    let healers: Vec<EntityId> = world.store.auras.keys().collect();
    for healer in healers {
        let Some(center) = live_enemy_position(world, healer) else {
            continue;
        };
        let Some(aura) = world.store.auras.get_mut(healer) else {
            continue;
        };
        aura.carry += aura.heal_per_second * secs;
        let whole = aura.carry.floor();
        aura.carry -= whole;
        let radius = aura.radius;
        if whole < 1.0 {
            continue;
        }

        for enemy in world.store.active_enemies() {
            if enemy == healer {
                continue;
            }
            let within = live_position(&world.store, enemy)
                .is_some_and(|position| position.distance(center) <= radius);
            if !within {
                continue;
            }
            if let Some(health) = world.store.healths.get_mut(enemy) {
                health.current = (health.current + whole as i32).min(health.max);
            }
        }
    }
}

fn run_bosses(world: &mut World, secs: f32, out: &mut Vec<Event>) {
    let bosses: Vec<EntityId> = world.store.bosses.keys().collect();
    for boss in bosses {
        let Some(position) = live_enemy_position(world, boss) else {
            continue;
        };
        let Some(state) = world.store.bosses.get_mut(boss) else {
            continue;
        };
        state.timer -= secs;

        if state.active_remaining > 0.0 {
            state.active_remaining -= secs;
            let ended = state.active_remaining <= 0.0;
            let ability = state.ability;
            if ability == BossAbility::DamageAura {
                state.aura_carry += DAMAGE_AURA_RATE * secs;
                let whole = state.aura_carry.floor();
                state.aura_carry -= whole;
                if whole >= 1.0 && hero_within(world, position, DAMAGE_AURA_RADIUS) {
                    damage_hero(world, whole as i32, out);
                }
            }
            if ended && ability == BossAbility::SpeedBurst {
                if let Some(progress) = world.store.paths.get_mut(boss) {
                    progress.speed = progress.base_speed;
                }
            }
            continue;
        }
        if state.timer > 0.0 {
            continue;
        }

        state.timer = BOSS_ABILITY_COOLDOWN;
        let ability = state.ability;
        match ability {
            BossAbility::SpeedBurst => {
                state.active_remaining = SPEED_BURST_DURATION;
                if let Some(progress) = world.store.paths.get_mut(boss) {
                    progress.speed = progress.base_speed * SPEED_BURST_FACTOR;
                }
            }
            BossAbility::DamageAura => {
                state.active_remaining = DAMAGE_AURA_DURATION;
                state.aura_carry = 0.0;
            }
            BossAbility::SpawnMinions => spawn_minions(world, boss, position, out),
        }
        debug!(?ability, "boss ability triggered");
        out.push(Event::BossAbilityTriggered {
            enemy: boss,
            ability,
        });
    }
}

fn spawn_minions(world: &mut World, boss: EntityId, position: Vec2, out: &mut Vec<Event>) {
    let Some(progress) = world.store.paths.get(boss) else {
        return;
    };
    let Some(remaining) = progress.points.get(progress.index..) else {
        return;
    };
    let route: Vec<Vec2> = std::iter::once(position)
        .chain(remaining.iter().copied())
        .collect();
    if route.len() <= 1 {
        return;
    }
    let route: Arc<[Vec2]> = Arc::from(route);
    let Some(scaling) = world.store.enemies.get(boss).map(|state| state.scaling) else {
        return;
    };
    for _ in 0..MINION_COUNT {
        spawn_enemy(
            world,
            EnemyKind::Grunt,
            0,
            scaling * MINION_SCALING_FACTOR,
            Arc::clone(&route),
            out,
        );
    }
}

fn hero_within(world: &World, point: Vec2, radius: f32) -> bool {
    world
        .store
        .positions
        .get(world.hero)
        .is_some_and(|hero| hero.distance(point) <= radius)
}

fn damage_hero(world: &mut World, amount: i32, out: &mut Vec<Event>) {
    let Some(health) = world.store.healths.get_mut(world.hero) else {
        return;
    };
    if health.is_depleted() {
        return;
    }
    health.current -= amount;
    out.push(Event::HeroDamaged {
        amount,
        remaining: health.current,
    });
}

fn run_melee(world: &mut World, secs: f32, out: &mut Vec<Event>) {
    let Some(hero_position) = world.store.positions.get(world.hero).copied() else {
        return;
    };
    for enemy in world.store.active_enemies() {
        let Some(position) = live_enemy_position(world, enemy) else {
            continue;
        };
        let Some(state) = world.store.enemies.get_mut(enemy) else {
            continue;
        };
        state.attack_timer = (state.attack_timer - secs).max(0.0);
        if state.attack_timer > 0.0 {
            continue;
        }
        let melee = state.melee;
        let kind = state.kind;
        let radius = state.radius;

        if position.distance(hero_position) <= melee.range + HERO_MELEE_REACH.max(radius) {
            state.attack_timer = melee.cooldown;
            damage_hero(world, apply_damage(melee.damage, HERO_ARMOR), out);
            continue;
        }

        if !world.config.tower_melee || !matches!(kind, EnemyKind::Tank | EnemyKind::Boss) {
            continue;
        }
        let reach = melee.range + TOWER_MELEE_REACH.max(radius);
        let Some(tower) = nearest_tower(world, position, reach) else {
            continue;
        };
        if let Some(state) = world.store.enemies.get_mut(enemy) {
            state.attack_timer = melee.cooldown;
        }
        if let Some(health) = world.store.healths.get_mut(tower) {
            health.current -= melee.damage;
            out.push(Event::TowerDamaged {
                tower,
                amount: melee.damage,
                remaining: health.current,
            });
        }
    }
}

fn nearest_tower(world: &World, point: Vec2, range: f32) -> Option<EntityId> {
    let mut best: Option<(f32, EntityId)> = None;
    for tower in world.occupancy.values() {
        let Some(position) = world.store.positions.get(*tower) else {
            continue;
        };
        let distance = position.distance(point);
        if distance > range {
            continue;
        }
        if best.map_or(true, |(current, _)| distance < current) {
            best = Some((distance, *tower));
        }
    }
    best.map(|(_, tower)| tower)
}

fn resolve_health(world: &mut World, out: &mut Vec<Event>) {
    let tombstoned: Vec<EntityId> = world.store.dead.keys().collect();
    for id in tombstoned {
        world.store.destroy(id);
    }

    for enemy in world.store.active_enemies() {
        let depleted = world
            .store
            .healths
            .get(enemy)
            .is_some_and(Health::is_depleted);
        let escaped = world
            .store
            .paths
            .get(enemy)
            .is_some_and(|progress| progress.finished);
        if depleted {
            kill_enemy(world, enemy, out);
        } else if escaped {
            let _ = world.store.dead.insert(enemy, ());
            world.live_enemies = world.live_enemies.saturating_sub(1);
            world.lives = world.lives.saturating_sub(1);
            out.push(Event::EnemyEscaped {
                enemy,
                lives_remaining: world.lives,
            });
            if world.lives == 0 {
                session::conclude(world, Outcome::Defeat, out);
            }
        }
    }

    if world.config.tower_melee {
        let fallen: Vec<EntityId> = world
            .occupancy
            .values()
            .copied()
            .filter(|tower| {
                world
                    .store
                    .healths
                    .get(*tower)
                    .is_some_and(Health::is_depleted)
            })
            .collect();
        if !fallen.is_empty() {
            for tower in fallen {
                towers::demolish(world, tower, out);
            }
            towers::recompute_route(world, out);
        }
    }

    let hero = world.hero;
    let fallen = world
        .store
        .healths
        .get(hero)
        .is_some_and(Health::is_depleted);
    if fallen {
        let spawn = world.map.grid_to_world(world.map.spawn());
        let _ = world.store.positions.insert(hero, spawn);
        if let Some(health) = world.store.healths.get_mut(hero) {
            health.current = health.max;
        }
        world.stats.hero_deaths += 1;
        debug!("hero respawned");
        out.push(Event::HeroRespawned);
    }
}

fn kill_enemy(world: &mut World, enemy: EntityId, out: &mut Vec<Event>) {
    let Some(state) = world.store.enemies.get(enemy) else {
        return;
    };
    let kind = state.kind;
    let base_reward = state.reward;
    let position = world
        .store
        .positions
        .get(enemy)
        .copied()
        .unwrap_or_default();
    let reward =
        (base_reward as f32 * world.config.difficulty.reward_multiplier()).round() as u32;

    let _ = world.store.dead.insert(enemy, ());
    world.live_enemies = world.live_enemies.saturating_sub(1);
    world.stats.total_kills += 1;
    if kind == EnemyKind::Boss {
        world.stats.boss_kills += 1;
    }

    let pickup = world.store.spawn(position);
    let _ = world.store.pickups.insert(pickup, reward);
    let _ = world.store.lifetimes.insert(pickup, PICKUP_LIFETIME);

    out.push(Event::EnemyDied {
        enemy,
        kind,
        reward,
        position,
    });
    grant_xp(world, base_reward / 2, out);
}

fn grant_xp(world: &mut World, amount: u32, out: &mut Vec<Event>) {
    let hero = world.hero;
    let upgrades = world.config.hero_upgrades;
    let Some(state) = world.store.heroes.get_mut(hero) else {
        return;
    };
    state.xp += amount;
    while state.xp >= xp_threshold(state.level) {
        state.xp -= xp_threshold(state.level);
        state.level += 1;
        let max = hero_max_hp(state.level, &upgrades);
        let _ = world.store.healths.insert(hero, Health::full(max, HERO_ARMOR));
        info!(level = state.level, "hero leveled up");
        out.push(Event::HeroLeveledUp { level: state.level });
    }
}

fn run_director(world: &mut World, dt: Duration, out: &mut Vec<Event>) {
    let mut commands = mem::take(&mut world.system_commands);
    world.director.handle(dt, world.live_enemies, &mut commands);
    execute_batch(world, &mut commands, out);
    world.system_commands = commands;
}

fn run_hero(world: &mut World, secs: f32, out: &mut Vec<Event>) {
    let hero = world.hero;
    let attack_range = world.config.hero_upgrades.attack_range();
    let Some(position) = world.store.positions.get(hero).copied() else {
        return;
    };
    let Some(state) = world.store.heroes.get_mut(hero) else {
        return;
    };
    let _ = world.store.velocities.insert(hero, state.heading * HERO_SPEED);
    state.attack_timer = (state.attack_timer - secs).max(0.0);
    for timer in &mut state.ability_timers {
        *timer = (*timer - secs).max(0.0);
    }
    let snapshot = HeroSnapshot {
        position,
        level: state.level,
        attack_range,
        attack_ready: state.attack_timer <= 0.0,
        abilities_ready: state.ability_timers.map(|timer| timer <= 0.0),
        requests: mem::take(&mut state.requests),
    };

    let enemies = query::enemy_view(world);
    let mut commands = mem::take(&mut world.system_commands);
    world.hero_system.handle(&snapshot, &enemies, &mut commands);
    execute_batch(world, &mut commands, out);
    world.system_commands = commands;
}

fn hero_attack(world: &mut World, target: EntityId, out: &mut Vec<Event>) {
    let hero = world.hero;
    let upgrades = world.config.hero_upgrades;
    let Some(origin) = world.store.positions.get(hero).copied() else {
        return;
    };
    let Some(last_known) = live_enemy_position(world, target) else {
        return;
    };
    let Some(state) = world.store.heroes.get_mut(hero) else {
        return;
    };
    state.attack_timer = upgrades.attack_cooldown();
    let damage = HERO_BASE_DAMAGE + upgrades.bonus_damage() + 3 * state.level as i32;
    launch(
        world,
        origin,
        ProjectileState {
            target,
            last_known,
            speed: HERO_PROJECTILE_SPEED,
            payload: Payload {
                damage,
                area_radius: 0.0,
                chain_count: 0,
                effect: None,
            },
            already_hit: Vec::new(),
        },
        out,
    );
}

fn cast_ability(world: &mut World, ability: HeroAbility, target: Vec2, out: &mut Vec<Event>) {
    let hero = world.hero;
    let Some(position) = world.store.positions.get(hero).copied() else {
        return;
    };
    let Some(state) = world.store.heroes.get_mut(hero) else {
        return;
    };
    let spec = ability_spec(ability);
    let magnitude = spec.magnitude(state.level);
    state.ability_timers[ability.slot()] = spec.cooldown;

    match ability {
        HeroAbility::Fireball => {
            blast(world, position, spec.radius, magnitude, out);
            spawn_marker(world, MarkerKind::Fireball, position);
        }
        HeroAbility::Heal => {
            if let Some(health) = world.store.healths.get_mut(hero) {
                health.current = (health.current + magnitude).min(health.max);
            }
            spawn_marker(world, MarkerKind::Heal, position);
        }
        HeroAbility::Thunderstrike => {
            blast(world, target, spec.radius, magnitude, out);
            spawn_marker(world, MarkerKind::Thunderstrike, target);
        }
    }
    debug!(?ability, magnitude, "ability cast");
    out.push(Event::AbilityCast { ability });
}

fn blast(world: &mut World, center: Vec2, radius: f32, damage: i32, out: &mut Vec<Event>) {
    for enemy in world.store.active_enemies() {
        let within = live_position(&world.store, enemy)
            .is_some_and(|position| position.distance(center) <= radius);
        if within {
            let _ = damage_enemy(world, enemy, damage, out);
        }
    }
}

fn spawn_marker(world: &mut World, kind: MarkerKind, position: Vec2) {
    let marker = world.store.spawn(position);
    let _ = world.store.markers.insert(marker, kind);
    let _ = world.store.lifetimes.insert(marker, MARKER_LIFETIME);
}

fn collect_pickups(world: &mut World, secs: f32, out: &mut Vec<Event>) {
    let Some(hero_position) = world.store.positions.get(world.hero).copied() else {
        return;
    };
    let radius = PICKUP_RADIUS + world.config.hero_upgrades.bonus_pickup();
    let pickups: Vec<(EntityId, u32)> = world
        .store
        .pickups
        .iter()
        .map(|(id, value)| (id, *value))
        .collect();

    for (pickup, value) in pickups {
        let Some(position) = world.store.positions.get_mut(pickup) else {
            continue;
        };
        let offset = hero_position - *position;
        let distance = offset.length();
        if distance <= radius {
            world.store.destroy(pickup);
            world.gold = world.gold.saturating_add(value);
            world.stats.gold_earned = world.stats.gold_earned.saturating_add(value);
            out.push(Event::GoldCollected {
                amount: value,
                total: world.gold,
            });
        } else if distance <= radius * 2.0 {
            let step = (PICKUP_PULL_SPEED * secs).min(distance);
            *position += offset / distance * step;
        }
    }
}

fn expire_lifetimes(world: &mut World, secs: f32) {
    let mut expired = Vec::new();
    for (id, remaining) in world.store.lifetimes.iter_mut() {
        *remaining -= secs;
        if *remaining <= 0.0 {
            expired.push(id);
        }
    }
    for id in expired {
        world.store.destroy(id);
    }
}
