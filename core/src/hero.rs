//! Hero balance constants and permanent upgrade tracks.

use serde::{Deserialize, Serialize};

use crate::HeroAbility;

/// Walking speed in world units per second.
pub const HERO_SPEED: f32 = 280.0;
/// Auto-attack radius before upgrades.
pub const HERO_ATTACK_RANGE: f32 = 140.0;
/// Seconds between auto-attacks before upgrades.
pub const HERO_ATTACK_COOLDOWN: f32 = 0.3;
/// Auto-attack damage before level and upgrade bonuses.
pub const HERO_BASE_DAMAGE: i32 = 15;
/// Maximum hit points at level one before upgrades.
pub const HERO_BASE_HP: i32 = 200;
/// Flat damage reduction.
pub const HERO_ARMOR: i32 = 5;
/// Speed of auto-attack projectiles.
pub const HERO_PROJECTILE_SPEED: f32 = 400.0;
/// Highest level of every upgrade track.
pub const MAX_HERO_UPGRADE_LEVEL: u8 = 5;

const UPGRADE_COSTS: [u32; 5] = [100, 200, 400, 700, 1000];

/// Cooldown and magnitude of a hero ability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilitySpec {
    /// Seconds before the ability can be used again.
    pub cooldown: f32,
    /// Damage or healing at level zero.
    pub base: i32,
    /// Additional damage or healing per hero level.
    pub per_level: i32,
    /// Area radius; zero for self-targeted abilities.
    pub radius: f32,
}

impl AbilitySpec {
    /// Damage or healing at the provided hero level.
    #[must_use]
    pub fn magnitude(&self, level: u32) -> i32 {
        self.base + self.per_level * level as i32
    }
}

/// Balance values for the provided ability.
#[must_use]
pub const fn ability_spec(ability: HeroAbility) -> AbilitySpec {
    match ability {
        HeroAbility::Fireball => AbilitySpec {
            cooldown: 8.0,
            base: 80,
            per_level: 5,
            radius: 64.0,
        },
        HeroAbility::Heal => AbilitySpec {
            cooldown: 12.0,
            base: 50,
            per_level: 10,
            radius: 0.0,
        },
        HeroAbility::Thunderstrike => AbilitySpec {
            cooldown: 15.0,
            base: 120,
            per_level: 8,
            radius: 48.0,
        },
    }
}

/// Experience required to advance past the provided level.
#[must_use]
pub const fn xp_threshold(level: u32) -> u32 {
    100 * level
}

/// Maximum hit points of a hero at the provided level.
#[must_use]
pub fn hero_max_hp(level: u32, upgrades: &HeroUpgrades) -> i32 {
    HERO_BASE_HP + 20 * level.saturating_sub(1) as i32 + upgrades.bonus_hp()
}

/// Permanent hero upgrade track bought with upgrade experience.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeTrack {
    /// Auto-attack range.
    AttackRange,
    /// Pickup magnet radius.
    Magnet,
    /// Auto-attack damage.
    AttackDamage,
    /// Auto-attack speed.
    AttackSpeed,
    /// Maximum hit points.
    MaxHp,
}

impl UpgradeTrack {
    /// Every track in shop order.
    pub const ALL: [Self; 5] = [
        Self::AttackRange,
        Self::Magnet,
        Self::AttackDamage,
        Self::AttackSpeed,
        Self::MaxHp,
    ];
}

/// Permanent hero upgrade levels, each in `0..=5`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroUpgrades {
    /// Attack range track.
    pub attack_range: u8,
    /// Pickup magnet track.
    pub magnet: u8,
    /// Attack damage track.
    pub attack_damage: u8,
    /// Attack speed track.
    pub attack_speed: u8,
    /// Maximum hit point track.
    pub max_hp: u8,
}

impl HeroUpgrades {
    /// Copy with every track clamped to the maximum level.
    #[must_use]
    pub fn clamped(self) -> Self {
        let cap = |level: u8| level.min(MAX_HERO_UPGRADE_LEVEL);
        Self {
            attack_range: cap(self.attack_range),
            magnet: cap(self.magnet),
            attack_damage: cap(self.attack_damage),
            attack_speed: cap(self.attack_speed),
            max_hp: cap(self.max_hp),
        }
    }

    /// Extra auto-attack range.
    #[must_use]
    pub fn bonus_range(&self) -> f32 {
        f32::from(self.attack_range) * 30.0
    }

    /// Extra pickup radius.
    #[must_use]
    pub fn bonus_pickup(&self) -> f32 {
        f32::from(self.magnet) * 40.0
    }

    /// Extra auto-attack damage.
    #[must_use]
    pub fn bonus_damage(&self) -> i32 {
        i32::from(self.attack_damage) * 5
    }

    /// Reduction of the auto-attack cooldown.
    #[must_use]
    pub fn bonus_cooldown(&self) -> f32 {
        f32::from(self.attack_speed) * 0.04
    }

    /// Extra maximum hit points.
    #[must_use]
    pub fn bonus_hp(&self) -> i32 {
        i32::from(self.max_hp) * 40
    }

    /// Auto-attack radius including the range bonus.
    #[must_use]
    pub fn attack_range(&self) -> f32 {
        HERO_ATTACK_RANGE + self.bonus_range()
    }

    /// Auto-attack cooldown including the speed bonus, never below 0.1 s.
    #[must_use]
    pub fn attack_cooldown(&self) -> f32 {
        (HERO_ATTACK_COOLDOWN - self.bonus_cooldown()).max(0.1)
    }

    /// Current level of the provided track.
    #[must_use]
    pub const fn level(&self, track: UpgradeTrack) -> u8 {
        match track {
            UpgradeTrack::AttackRange => self.attack_range,
            UpgradeTrack::Magnet => self.magnet,
            UpgradeTrack::AttackDamage => self.attack_damage,
            UpgradeTrack::AttackSpeed => self.attack_speed,
            UpgradeTrack::MaxHp => self.max_hp,
        }
    }

    /// Raises the track by one level, saturating at the cap.
    pub fn raise(&mut self, track: UpgradeTrack) {
        let level = match track {
            UpgradeTrack::AttackRange => &mut self.attack_range,
            UpgradeTrack::Magnet => &mut self.magnet,
            UpgradeTrack::AttackDamage => &mut self.attack_damage,
            UpgradeTrack::AttackSpeed => &mut self.attack_speed,
            UpgradeTrack::MaxHp => &mut self.max_hp,
        };
        *level = level.saturating_add(1).min(MAX_HERO_UPGRADE_LEVEL);
    }

    /// Upgrade experience needed to buy the level after `level`; `None` at the cap.
    #[must_use]
    pub fn cost(level: u8) -> Option<u32> {
        UPGRADE_COSTS.get(usize::from(level)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::{ability_spec, hero_max_hp, xp_threshold, HeroUpgrades, UpgradeTrack};
    use crate::HeroAbility;

    #[test]
    fn upgrade_costs_follow_table() {
        assert_eq!(HeroUpgrades::cost(0), Some(100));
        assert_eq!(HeroUpgrades::cost(4), Some(1000));
        assert_eq!(HeroUpgrades::cost(5), None);
    }

    #[test]
    fn raising_a_track_stops_at_the_cap() {
        let mut upgrades = HeroUpgrades {
            magnet: 4,
            ..HeroUpgrades::default()
        };
        upgrades.raise(UpgradeTrack::Magnet);
        upgrades.raise(UpgradeTrack::Magnet);
        upgrades.raise(UpgradeTrack::MaxHp);
        assert_eq!(upgrades.level(UpgradeTrack::Magnet), 5);
        assert_eq!(upgrades.level(UpgradeTrack::MaxHp), 1);
        assert_eq!(upgrades.level(UpgradeTrack::AttackRange), 0);
    }

    #[test]
    fn attack_speed_bonus_is_floored() {
        let upgrades = HeroUpgrades {
            attack_speed: 5,
            ..HeroUpgrades::default()
        };
        assert!((upgrades.attack_cooldown() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn clamped_caps_every_track() {
        let upgrades = HeroUpgrades {
            attack_range: 9,
            magnet: 2,
            ..HeroUpgrades::default()
        }
        .clamped();
        assert_eq!(upgrades.attack_range, 5);
        assert_eq!(upgrades.magnet, 2);
        assert_eq!(upgrades.attack_range(), 290.0);
    }

    #[test]
    fn max_hp_grows_with_level_and_upgrades() {
        let upgrades = HeroUpgrades {
            max_hp: 1,
            ..HeroUpgrades::default()
        };
        assert_eq!(hero_max_hp(1, &HeroUpgrades::default()), 200);
        assert_eq!(hero_max_hp(3, &upgrades), 280);
        assert_eq!(xp_threshold(2), 200);
    }

    #[test]
    fn ability_magnitude_scales_with_level() {
        assert_eq!(ability_spec(HeroAbility::Fireball).magnitude(1), 85);
        assert_eq!(ability_spec(HeroAbility::Heal).magnitude(2), 70);
        assert_eq!(ability_spec(HeroAbility::Thunderstrike).magnitude(1), 128);
    }
}
