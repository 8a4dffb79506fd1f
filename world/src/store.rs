//! Sparse component storage keyed by generational entity handles.

use std::sync::Arc;

use glam::Vec2;
use slotmap::{SecondaryMap, SlotMap};
use warden_core::{
    AbilityRequest, BossAbility, CellCoord, EffectKind, EffectSpec, EnemyKind, EntityId, Health,
    MarkerKind, MeleeStats, TowerKind,
};

/// Seconds between two damage ticks of a periodic effect.
pub(crate) const EFFECT_TICK_INTERVAL: f32 = 0.5;

#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) kind: EnemyKind,
    pub(crate) reward: u32,
    pub(crate) melee: MeleeStats,
    pub(crate) attack_timer: f32,
    pub(crate) scaling: f32,
    pub(crate) radius: f32,
}

#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) kind: TowerKind,
    pub(crate) level: u8,
    pub(crate) cell: CellCoord,
    pub(crate) cooldown: f32,
    pub(crate) invested: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Payload {
    pub(crate) damage: i32,
    pub(crate) area_radius: f32,
    pub(crate) chain_count: u32,
    pub(crate) effect: Option<EffectSpec>,
}

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) target: EntityId,
    pub(crate) last_known: Vec2,
    pub(crate) speed: f32,
    pub(crate) payload: Payload,
    pub(crate) already_hit: Vec<EntityId>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct HeroState {
    pub(crate) level: u32,
    pub(crate) xp: u32,
    pub(crate) attack_timer: f32,
    pub(crate) ability_timers: [f32; 3],
    pub(crate) heading: Vec2,
    pub(crate) requests: Vec<AbilityRequest>,
}

#[derive(Clone, Debug)]
pub(crate) struct PathProgress {
    pub(crate) points: Arc<[Vec2]>,
    pub(crate) index: usize,
    pub(crate) speed: f32,
    pub(crate) base_speed: f32,
    pub(crate) finished: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StatusEffect {
    pub(crate) kind: EffectKind,
    pub(crate) remaining: f32,
    pub(crate) tick_damage: i32,
    pub(crate) tick_timer: f32,
    pub(crate) speed_multiplier: f32,
}

impl StatusEffect {
    pub(crate) fn from_spec(spec: EffectSpec) -> Self {
        let (tick_damage, speed_multiplier) = match spec.kind {
            EffectKind::Slow => (0, spec.slow_factor),
            EffectKind::Poison => (5, 1.0),
            EffectKind::Burn => (8, 1.0),
            EffectKind::Stun => (0, 0.0),
        };
        Self {
            kind: spec.kind,
            remaining: spec.duration,
            tick_damage,
            tick_timer: 0.0,
            speed_multiplier,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Aura {
    pub(crate) radius: f32,
    pub(crate) heal_per_second: f32,
    pub(crate) carry: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BossState {
    pub(crate) ability: BossAbility,
    pub(crate) timer: f32,
    pub(crate) active_remaining: f32,
    pub(crate) aura_carry: f32,
}

/// Owner of every entity and its attached components.
#[derive(Clone, Debug, Default)]
pub(crate) struct EntityStore {
    entities: SlotMap<EntityId, ()>,
    pub(crate) positions: SecondaryMap<EntityId, Vec2>,
    pub(crate) velocities: SecondaryMap<EntityId, Vec2>,
    pub(crate) healths: SecondaryMap<EntityId, Health>,
    pub(crate) enemies: SecondaryMap<EntityId, EnemyState>,
    pub(crate) towers: SecondaryMap<EntityId, TowerState>,
    pub(crate) projectiles: SecondaryMap<EntityId, ProjectileState>,
    pub(crate) heroes: SecondaryMap<EntityId, HeroState>,
    pub(crate) pickups: SecondaryMap<EntityId, u32>,
    pub(crate) paths: SecondaryMap<EntityId, PathProgress>,
    pub(crate) effects: SecondaryMap<EntityId, StatusEffect>,
    pub(crate) lifetimes: SecondaryMap<EntityId, f32>,
    pub(crate) auras: SecondaryMap<EntityId, Aura>,
    pub(crate) bosses: SecondaryMap<EntityId, BossState>,
    pub(crate) markers: SecondaryMap<EntityId, MarkerKind>,
    pub(crate) dead: SecondaryMap<EntityId, ()>,
}

impl EntityStore {
    /// Allocates a fresh entity positioned at `position`.
    pub(crate) fn spawn(&mut self, position: Vec2) -> EntityId {
        let id = self.entities.insert(());
        let _ = self.positions.insert(id, position);
        id
    }

    /// Removes the entity and every attached component.
    pub(crate) fn destroy(&mut self, id: EntityId) {
        if self.entities.remove(id).is_none() {
            return;
        }
        let _ = self.positions.remove(id);
        let _ = self.velocities.remove(id);
        let _ = self.healths.remove(id);
        let _ = self.enemies.remove(id);
        let _ = self.towers.remove(id);
        let _ = self.projectiles.remove(id);
        let _ = self.heroes.remove(id);
        let _ = self.pickups.remove(id);
        let _ = self.paths.remove(id);
        let _ = self.effects.remove(id);
        let _ = self.lifetimes.remove(id);
        let _ = self.auras.remove(id);
        let _ = self.bosses.remove(id);
        let _ = self.markers.remove(id);
        let _ = self.dead.remove(id);
    }

    /// Reports whether the handle refers to an entity that still exists.
    pub(crate) fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Reports whether the entity exists and has not been tombstoned.
    pub(crate) fn is_active(&self, id: EntityId) -> bool {
        self.is_alive(id) && !self.dead.contains_key(id)
    }

    /// Identifiers of every live enemy that has not been tombstoned.
    pub(crate) fn active_enemies(&self) -> Vec<EntityId> {
        self.enemies
            .keys()
            .filter(|id| !self.dead.contains_key(*id))
            .collect()
    }

    /// Position of an active enemy.
    pub(crate) fn enemy_position(&self, id: EntityId) -> Option<Vec2> {
        if !self.enemies.contains_key(id) || !self.is_active(id) {
            return None;
        }
        self.positions.get(id).copied()
    }

    /// Iterator over every live entity handle.
    pub(crate) fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys()
    }
}
