//! Enemy balance values and boss behaviour selection.

use serde::{Deserialize, Serialize};

use crate::{EnemyKind, Tint};

/// Close-range attack an enemy performs against the hero or towers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeleeStats {
    /// Raw damage per strike.
    pub damage: i32,
    /// Reach in world units.
    pub range: f32,
    /// Seconds between strikes.
    pub cooldown: f32,
}

/// Scaled balance values for a freshly spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Maximum hit points.
    pub hp: i32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Flat damage reduction.
    pub armor: i32,
    /// Gold dropped on death before the difficulty multiplier.
    pub reward: u32,
    /// Sprite edge length; the collision radius is half of it.
    pub size: f32,
    /// Close-range attack.
    pub melee: MeleeStats,
    /// Display tint.
    pub tint: Tint,
}

impl EnemyStats {
    /// Radius used for proximity checks.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }
}

/// Special abilities a boss can use on a cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossAbility {
    /// Temporarily multiplies movement speed.
    SpeedBurst,
    /// Spawns a pack of weakened grunts around the boss.
    SpawnMinions,
    /// Burns the hero while nearby.
    DamageAura,
}

/// Ability assigned to bosses spawned in the provided wave.
#[must_use]
pub const fn boss_ability_for_wave(wave: u32) -> BossAbility {
    if wave <= 5 {
        BossAbility::SpeedBurst
    } else if wave <= 10 {
        BossAbility::SpawnMinions
    } else {
        BossAbility::DamageAura
    }
}

/// Balance values for an enemy kind scaled by the provided multiplier.
///
/// Hit points, armor, reward and melee damage are rounded after scaling;
/// speed is intrinsic to the kind.
#[must_use]
pub fn enemy_stats(kind: EnemyKind, scaling: f32) -> EnemyStats {
    let scale = |value: i32| (value as f32 * scaling).round() as i32;
    let (hp, speed, armor, reward, size, damage, range, cooldown, tint) = match kind {
        EnemyKind::Grunt => (80, 60.0, 0, 10, 20.0, 8, 30.0, 1.0, Tint::from_rgb(200, 50, 50)),
        EnemyKind::Runner => (45, 120.0, 0, 12, 16.0, 5, 25.0, 0.6, Tint::from_rgb(255, 150, 50)),
        EnemyKind::Tank => (300, 32.0, 6, 25, 28.0, 20, 35.0, 1.5, Tint::from_rgb(100, 100, 180)),
        EnemyKind::Healer => (100, 48.0, 0, 20, 22.0, 4, 25.0, 1.2, Tint::from_rgb(50, 200, 50)),
        EnemyKind::Flying => (55, 85.0, 0, 15, 18.0, 6, 20.0, 0.8, Tint::from_rgb(180, 50, 255)),
        EnemyKind::Boss => (1500, 28.0, 10, 100, 36.0, 30, 50.0, 1.0, Tint::from_rgb(255, 50, 50)),
    };
    EnemyStats {
        hp: scale(hp),
        speed,
        armor: scale(armor),
        reward: scale(reward).max(0) as u32,
        size,
        melee: MeleeStats {
            damage: scale(damage),
            range,
            cooldown,
        },
        tint,
    }
}

#[cfg(test)]
mod tests {
    use super::{boss_ability_for_wave, enemy_stats, BossAbility};
    use crate::EnemyKind;
    use proptest::prelude::*;

    #[test]
    fn base_stats_at_unit_scaling() {
        let grunt = enemy_stats(EnemyKind::Grunt, 1.0);
        assert_eq!(grunt.hp, 80);
        assert_eq!(grunt.speed, 60.0);
        assert_eq!(grunt.armor, 0);
        assert_eq!(grunt.reward, 10);

        let tank = enemy_stats(EnemyKind::Tank, 1.0);
        assert_eq!(tank.hp, 300);
        assert_eq!(tank.armor, 6);

        let boss = enemy_stats(EnemyKind::Boss, 1.0);
        assert_eq!(boss.hp, 1500);
        assert_eq!(boss.armor, 10);
        assert_eq!(boss.radius(), 18.0);
    }

    #[test]
    fn doubling_scaling_doubles_hp() {
        let base = enemy_stats(EnemyKind::Grunt, 1.0);
        let scaled = enemy_stats(EnemyKind::Grunt, 2.0);
        assert_eq!(scaled.hp, base.hp * 2);
        assert_eq!(scaled.melee.damage, base.melee.damage * 2);
    }

    #[test]
    fn boss_ability_follows_wave_bands() {
        assert_eq!(boss_ability_for_wave(1), BossAbility::SpeedBurst);
        assert_eq!(boss_ability_for_wave(5), BossAbility::SpeedBurst);
        assert_eq!(boss_ability_for_wave(6), BossAbility::SpawnMinions);
        assert_eq!(boss_ability_for_wave(10), BossAbility::SpawnMinions);
        assert_eq!(boss_ability_for_wave(11), BossAbility::DamageAura);
        assert_eq!(boss_ability_for_wave(30), BossAbility::DamageAura);
    }

    fn any_kind() -> impl Strategy<Value = EnemyKind> {
        prop::sample::select(EnemyKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn hp_is_rounded_base_times_scaling(kind in any_kind(), scaling in 1.0f32..10.0) {
            let base = enemy_stats(kind, 1.0);
            let scaled = enemy_stats(kind, scaling);
            prop_assert_eq!(scaled.hp, (base.hp as f32 * scaling).round() as i32);
        }

        #[test]
        fn speed_ignores_scaling(kind in any_kind(), scaling in 1.0f32..10.0) {
            prop_assert_eq!(enemy_stats(kind, scaling).speed, enemy_stats(kind, 1.0).speed);
        }
    }
}
