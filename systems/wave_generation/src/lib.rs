#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave schedule and enemy scaling curve.
//!
//! Every session plays the same fixed list of waves. Each wave is a sequence
//! of spawn groups emitted in order; every fifth wave ends with a boss escorted
//! by regular enemies, and other waves introduce new enemy kinds at fixed wave
//! thresholds.

use warden_core::{Difficulty, EnemyKind};

/// Number of waves in a full session.
pub const MAX_WAVES: u32 = 30;

/// Interval between boss waves.
pub const BOSS_WAVE_INTERVAL: u32 = 5;

const BASE_SPAWN_INTERVAL: f32 = 0.35;
const MIN_SPAWN_INTERVAL: f32 = 0.2;
const BOSS_SPAWN_INTERVAL: f32 = 1.5;

/// Consecutive spawns of a single enemy kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnGroup {
    /// Kind of enemy spawned by the group.
    pub kind: EnemyKind,
    /// Number of enemies in the group.
    pub count: u32,
    /// Seconds between two spawns of the group.
    pub interval: f32,
}

/// Fully resolved description of a single wave.
#[derive(Clone, Debug, PartialEq)]
pub struct WavePlan {
    /// One-based wave number.
    pub wave: u32,
    /// Indicates whether the wave ends with a boss.
    pub boss: bool,
    /// Multiplier applied to every enemy of the wave, difficulty included.
    pub scaling: f32,
    /// Spawn groups in emission order.
    pub groups: Vec<SpawnGroup>,
}

impl WavePlan {
    /// Total number of enemies spawned by the wave.
    #[must_use]
    pub fn enemy_count(&self) -> u32 {
        self.groups.iter().map(|group| group.count).sum()
    }
}

/// Precomputed wave schedule for one difficulty.
#[derive(Clone, Debug)]
pub struct WaveGenerator {
    difficulty: Difficulty,
    waves: Vec<WavePlan>,
}

impl Default for WaveGenerator {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

impl WaveGenerator {
    /// Builds the full schedule for the provided difficulty.
    #[must_use]
    pub fn new(difficulty: Difficulty) -> Self {
        let multiplier = difficulty.scaling_multiplier();
        let waves = (1..=MAX_WAVES)
            .map(|wave| WavePlan {
                wave,
                boss: is_boss_wave(wave),
                scaling: scaling(wave) * multiplier,
                groups: spawn_groups(wave),
            })
            .collect();
        Self { difficulty, waves }
    }

    /// Difficulty the schedule was built for.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Number of waves in the schedule.
    #[must_use]
    pub fn total_waves(&self) -> u32 {
        self.waves.len() as u32
    }

    /// Plan for the provided wave, clamped to the valid range.
    #[must_use]
    pub fn wave(&self, wave: u32) -> &WavePlan {
        let index = wave.clamp(1, MAX_WAVES) - 1;
        &self.waves[index as usize]
    }

    /// Iterator over every wave plan in order.
    pub fn iter(&self) -> impl Iterator<Item = &WavePlan> {
        self.waves.iter()
    }
}

/// Reports whether the provided wave ends with a boss.
#[must_use]
pub const fn is_boss_wave(wave: u32) -> bool {
    wave != 0 && wave % BOSS_WAVE_INTERVAL == 0
}

/// Enemy stat multiplier for the provided wave before difficulty.
#[must_use]
pub fn scaling(wave: u32) -> f32 {
    let wave = wave.max(1) as f32;
    let late = if wave > 15.0 { (wave - 15.0) * 0.15 } else { 0.0 };
    1.0 + (wave - 1.0) * 0.3 + late
}

fn spawn_groups(wave: u32) -> Vec<SpawnGroup> {
    let base_count = 10 + wave * 5 / 2;
    let interval = (BASE_SPAWN_INTERVAL - wave as f32 * 0.01).max(MIN_SPAWN_INTERVAL);
    let group = |kind, count, interval| SpawnGroup {
        kind,
        count,
        interval,
    };

    let mut groups = Vec::new();
    if is_boss_wave(wave) {
        groups.push(group(EnemyKind::Grunt, base_count / 2 + 5, interval));
        groups.push(group(EnemyKind::Runner, 3 + wave / 3, interval * 0.6));
        if wave >= 10 {
            groups.push(group(EnemyKind::Tank, 3 + wave / 5, interval * 1.2));
        }
        if wave >= 15 {
            groups.push(group(EnemyKind::Flying, 4 + wave / 5, interval * 0.8));
        }
        groups.push(group(EnemyKind::Boss, 1 + wave / 15, BOSS_SPAWN_INTERVAL));
    } else {
        groups.push(group(EnemyKind::Grunt, base_count, interval));
        if wave >= 2 {
            groups.push(group(EnemyKind::Runner, 2 + wave * 4 / 5, interval * 0.6));
        }
        if wave >= 4 {
            groups.push(group(EnemyKind::Tank, 1 + wave / 3, interval * 1.2));
        }
        if wave >= 6 {
            groups.push(group(EnemyKind::Healer, 1 + wave / 4, interval));
        }
        if wave >= 8 {
            groups.push(group(EnemyKind::Flying, 2 + wave / 3, interval * 0.7));
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::{is_boss_wave, scaling, WaveGenerator, MAX_WAVES};
    use proptest::prelude::*;
    use warden_core::{Difficulty, EnemyKind};

    #[test]
    fn first_wave_is_grunts_only() {
        let generator = WaveGenerator::default();
        let plan = generator.wave(1);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups[0].kind, EnemyKind::Grunt);
        assert_eq!(plan.groups[0].count, 12);
        assert!((plan.groups[0].interval - 0.34).abs() < 1e-6);
        assert!((plan.scaling - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn boss_waves_are_multiples_of_five() {
        for wave in 1..=MAX_WAVES {
            assert_eq!(is_boss_wave(wave), wave % 5 == 0, "wave {wave}");
        }
        assert!(!is_boss_wave(0));
    }

    #[test]
    fn boss_wave_ends_with_boss_group() {
        let generator = WaveGenerator::default();
        let plan = generator.wave(15);
        assert!(plan.boss);
        let kinds: Vec<_> = plan.groups.iter().map(|group| group.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EnemyKind::Grunt,
                EnemyKind::Runner,
                EnemyKind::Tank,
                EnemyKind::Flying,
                EnemyKind::Boss,
            ]
        );
        let boss = plan.groups.last().expect("boss group");
        assert_eq!(boss.count, 2);
        assert!((boss.interval - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn kinds_unlock_at_thresholds() {
        let generator = WaveGenerator::default();
        let kinds = |wave| -> Vec<EnemyKind> {
            generator.wave(wave).groups.iter().map(|group| group.kind).collect()
        };
        assert_eq!(kinds(2), vec![EnemyKind::Grunt, EnemyKind::Runner]);
        assert!(kinds(4).contains(&EnemyKind::Tank));
        assert!(kinds(6).contains(&EnemyKind::Healer));
        assert!(!kinds(7).contains(&EnemyKind::Flying));
        assert!(kinds(8).contains(&EnemyKind::Flying));
    }

    #[test]
    fn runner_count_uses_floor_of_eighty_percent() {
        let generator = WaveGenerator::default();
        let runners = generator.wave(7).groups[1];
        assert_eq!(runners.kind, EnemyKind::Runner);
        assert_eq!(runners.count, 7);
    }

    #[test]
    fn requests_beyond_schedule_clamp_to_last_wave() {
        let generator = WaveGenerator::default();
        assert_eq!(generator.wave(31), generator.wave(MAX_WAVES));
        assert_eq!(generator.wave(500).wave, MAX_WAVES);
        assert_eq!(generator.wave(0).wave, 1);
        assert_eq!(generator.total_waves(), MAX_WAVES);
    }

    #[test]
    fn interval_never_drops_below_floor() {
        let generator = WaveGenerator::default();
        assert!(generator.iter().all(|plan| plan.groups[0].interval >= 0.2));
    }

    #[test]
    fn difficulty_multiplies_scaling() {
        let hard = WaveGenerator::new(Difficulty::Hard);
        let easy = WaveGenerator::new(Difficulty::Easy);
        assert!((hard.wave(1).scaling - 1.3).abs() < 1e-6);
        assert!((easy.wave(1).scaling - 0.8).abs() < 1e-6);
        assert_eq!(hard.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn scaling_starts_at_one() {
        assert_eq!(scaling(1), 1.0);
    }

    proptest! {
        #[test]
        fn scaling_is_strictly_increasing(wave in 1u32..MAX_WAVES) {
            prop_assert!(scaling(wave + 1) > scaling(wave));
        }
    }
}
