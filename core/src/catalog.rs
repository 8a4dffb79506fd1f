//! Per-kind, per-level tower balance table.

use crate::{EffectKind, Tint, TowerKind};

/// Highest level a tower can reach.
pub const MAX_TOWER_LEVEL: u8 = 3;

/// Status effect carried by a tower's hits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectSpec {
    /// Kind of effect applied on hit.
    pub kind: EffectKind,
    /// Seconds the effect stays active.
    pub duration: f32,
    /// Speed multiplier for slows; `1.0` for every other effect.
    pub slow_factor: f32,
}

/// Balance values for one tower kind at one level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Kind described by the entry.
    pub kind: TowerKind,
    /// Level described by the entry.
    pub level: u8,
    /// Gold required to reach this level.
    pub cost: u32,
    /// Raw damage per hit.
    pub damage: i32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Shots per second, or seconds per beam tick for beam towers.
    pub fire_rate: f32,
    /// Splash radius around the impact point; zero for single-target hits.
    pub area_radius: f32,
    /// Number of follow-up jumps to nearby enemies.
    pub chain_count: u32,
    /// Status effect applied to every damaged enemy.
    pub effect: Option<EffectSpec>,
    /// Display tint.
    pub tint: Tint,
}

impl TowerStats {
    /// Seconds between two attacks.
    #[must_use]
    pub fn fire_interval(&self) -> f32 {
        if self.kind.is_beam() {
            self.fire_rate
        } else {
            1.0 / self.fire_rate
        }
    }
}

#[allow(clippy::too_many_arguments)]
const fn entry(
    kind: TowerKind,
    level: u8,
    cost: u32,
    damage: i32,
    range: f32,
    fire_rate: f32,
    area_radius: f32,
    chain_count: u32,
    effect: Option<EffectSpec>,
    tint: Tint,
) -> TowerStats {
    TowerStats {
        kind,
        level,
        cost,
        damage,
        range,
        fire_rate,
        area_radius,
        chain_count,
        effect,
        tint,
    }
}

const fn effect(kind: EffectKind, duration: f32, slow_factor: f32) -> Option<EffectSpec> {
    Some(EffectSpec {
        kind,
        duration,
        slow_factor,
    })
}

use EffectKind::{Burn, Poison, Slow, Stun};
use TowerKind::{Arrow, Cannon, Ice, Laser, Lightning};

#[rustfmt::skip]
static TABLE: [[TowerStats; 3]; 6] = [
    [
        entry(Arrow, 1, 50, 15, 150.0, 1.0, 0.0, 0, None, Tint::from_rgb(200, 150, 50)),
        entry(Arrow, 2, 75, 25, 170.0, 1.25, 0.0, 0, None, Tint::from_rgb(220, 170, 60)),
        entry(Arrow, 3, 125, 40, 200.0, 1.33, 0.0, 0, None, Tint::from_rgb(240, 190, 70)),
    ],
    [
        entry(Cannon, 1, 100, 40, 120.0, 0.4, 48.0, 0, None, Tint::from_rgb(100, 100, 100)),
        entry(Cannon, 2, 150, 55, 130.0, 0.4, 56.0, 0, None, Tint::from_rgb(120, 120, 120)),
        entry(Cannon, 3, 250, 70, 150.0, 0.5, 64.0, 0, None, Tint::from_rgb(140, 140, 140)),
    ],
    [
        entry(Ice, 1, 75, 10, 130.0, 0.8, 0.0, 0, effect(Slow, 2.0, 0.5), Tint::from_rgb(100, 180, 255)),
        entry(Ice, 2, 100, 15, 150.0, 0.9, 0.0, 0, effect(Slow, 2.5, 0.4), Tint::from_rgb(120, 200, 255)),
        entry(Ice, 3, 175, 20, 170.0, 1.0, 0.0, 0, effect(Slow, 3.0, 0.3), Tint::from_rgb(140, 220, 255)),
    ],
    [
        entry(Lightning, 1, 125, 20, 140.0, 0.7, 0.0, 2, None, Tint::from_rgb(255, 255, 100)),
        entry(Lightning, 2, 175, 30, 160.0, 0.8, 0.0, 3, None, Tint::from_rgb(255, 255, 130)),
        entry(Lightning, 3, 275, 45, 180.0, 0.9, 0.0, 4, effect(Stun, 0.5, 1.0), Tint::from_rgb(255, 255, 160)),
    ],
    [
        entry(TowerKind::Poison, 1, 75, 8, 130.0, 0.6, 0.0, 0, effect(Poison, 3.0, 1.0), Tint::from_rgb(100, 200, 50)),
        entry(TowerKind::Poison, 2, 100, 12, 150.0, 0.7, 0.0, 0, effect(Poison, 4.0, 1.0), Tint::from_rgb(120, 220, 60)),
        entry(TowerKind::Poison, 3, 175, 18, 170.0, 0.8, 0.0, 0, effect(Poison, 5.0, 1.0), Tint::from_rgb(140, 240, 70)),
    ],
    [
        entry(Laser, 1, 150, 8, 160.0, 0.05, 0.0, 0, effect(Burn, 1.0, 1.0), Tint::from_rgb(255, 50, 50)),
        entry(Laser, 2, 225, 12, 180.0, 0.05, 0.0, 0, effect(Burn, 1.5, 1.0), Tint::from_rgb(255, 80, 80)),
        entry(Laser, 3, 375, 18, 200.0, 0.05, 0.0, 0, effect(Burn, 2.0, 1.0), Tint::from_rgb(255, 110, 110)),
    ],
];

/// Static lookup over the tower balance table.
#[derive(Clone, Copy, Debug, Default)]
pub struct TowerCatalog;

impl TowerCatalog {
    /// Stats for the provided kind and level; `None` outside `1..=3`.
    #[must_use]
    pub fn stats(kind: TowerKind, level: u8) -> Option<&'static TowerStats> {
        if level == 0 || level > MAX_TOWER_LEVEL {
            return None;
        }
        TABLE
            .get(kind_index(kind))
            .and_then(|levels| levels.get(usize::from(level - 1)))
    }

    /// Gold required to place a level-one tower.
    #[must_use]
    pub fn placement_cost(kind: TowerKind) -> u32 {
        Self::stats(kind, 1).map_or(0, |stats| stats.cost)
    }

    /// Gold required to advance from `level` to the next level; zero at the cap.
    #[must_use]
    pub fn upgrade_cost(kind: TowerKind, level: u8) -> u32 {
        if level >= MAX_TOWER_LEVEL {
            return 0;
        }
        Self::stats(kind, level + 1).map_or(0, |stats| stats.cost)
    }

    /// Maximum hit points of a tower when melee damage against towers is enabled.
    #[must_use]
    pub fn max_hp(kind: TowerKind, level: u8) -> i32 {
        let base = match kind {
            TowerKind::Arrow => 80,
            TowerKind::Cannon => 150,
            TowerKind::Ice => 90,
            TowerKind::Lightning => 100,
            TowerKind::Poison => 90,
            TowerKind::Laser => 120,
        };
        base + 30 * i32::from(level.saturating_sub(1))
    }
}

const fn kind_index(kind: TowerKind) -> usize {
    match kind {
        TowerKind::Arrow => 0,
        TowerKind::Cannon => 1,
        TowerKind::Ice => 2,
        TowerKind::Lightning => 3,
        TowerKind::Poison => 4,
        TowerKind::Laser => 5,
    }
}
