use serde::{Deserialize, Serialize};
use warden_core::{Difficulty, HeroUpgrades, WaveCompletion};

/// Session rules chosen before the world is created.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Difficulty preset.
    pub difficulty: Difficulty,
    /// Rule deciding when a wave is complete.
    pub wave_completion: WaveCompletion,
    /// Enables tower hit points, enemy strikes against towers and repairs.
    pub tower_melee: bool,
    /// Gold held when a fresh session starts.
    pub starting_gold: u32,
    /// Seconds before the first wave starts.
    pub first_wave_delay: f32,
    /// Seconds between the end of a wave and the start of the next one.
    pub wave_delay: f32,
    /// Permanent hero upgrades bought in earlier sessions.
    pub hero_upgrades: HeroUpgrades,
    /// Upgrade experience banked from earlier sessions.
    pub upgrade_xp: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            wave_completion: WaveCompletion::AllDefeated,
            tower_melee: false,
            starting_gold: 0,
            first_wave_delay: 2.0,
            wave_delay: 2.0,
            hero_upgrades: HeroUpgrades::default(),
            upgrade_xp: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SimConfig;
    use warden_core::{Difficulty, WaveCompletion};

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "difficulty": "hard", "tower_melee": true }"#)
                .expect("valid config");
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert!(config.tower_melee);
        assert_eq!(config.wave_completion, WaveCompletion::AllDefeated);
        assert_eq!(config.first_wave_delay, 2.0);
        assert_eq!(config.upgrade_xp, 0);
    }

    #[test]
    fn completion_policy_uses_snake_case() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "wave_completion": "all_spawned" }"#).expect("valid config");
        assert_eq!(config.wave_completion, WaveCompletion::AllSpawned);
    }
}
