#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave director responsible for emitting wave and spawn commands.
//!
//! The director counts down between waves, walks the spawn groups of the
//! active wave on their intervals and decides when a wave is complete. It
//! never mutates the world; every decision leaves as a [`Command`].

use std::time::Duration;

use warden_core::{Command, WaveCompletion};
use warden_system_wave_generation::WaveGenerator;

const ALL_SPAWNED_GAP: f32 = 1.5;

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    first_wave_delay: f32,
    wave_delay: f32,
    completion: WaveCompletion,
}

impl Config {
    /// Creates a new configuration from the countdown lengths and completion rule.
    #[must_use]
    pub const fn new(first_wave_delay: f32, wave_delay: f32, completion: WaveCompletion) -> Self {
        Self {
            first_wave_delay,
            wave_delay,
            completion,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(2.0, 2.0, WaveCompletion::AllDefeated)
    }
}

/// Stage of the wave cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// Waiting for the next wave to start.
    Countdown {
        /// Seconds left before the next wave starts.
        remaining: f32,
    },
    /// Emitting the spawn groups of the active wave.
    Spawning,
    /// Every group spawned; waiting for the field to clear.
    Draining,
    /// The schedule is exhausted and victory was declared.
    Finished,
}

/// Pure system that turns elapsed time into wave progression commands.
#[derive(Clone, Debug)]
pub struct WaveDirector {
    config: Config,
    generator: WaveGenerator,
    phase: Phase,
    wave: u32,
    group_index: usize,
    spawned_in_group: u32,
    spawn_timer: f32,
    wave_completed: bool,
    victory_declared: bool,
}

impl WaveDirector {
    /// Creates a director that starts counting down toward the first wave.
    #[must_use]
    pub fn new(config: Config, generator: WaveGenerator) -> Self {
        Self {
            config,
            generator,
            phase: Phase::Countdown {
                remaining: config.first_wave_delay,
            },
            wave: 0,
            group_index: 0,
            spawned_in_group: 0,
            spawn_timer: 0.0,
            wave_completed: false,
            victory_declared: false,
        }
    }

    /// Resets the director so the wave after `wave` is next.
    pub fn resume_after(&mut self, wave: u32) {
        self.wave = wave.min(self.generator.total_waves());
        self.group_index = 0;
        self.spawned_in_group = 0;
        self.spawn_timer = 0.0;
        self.wave_completed = true;
        self.victory_declared = false;
        self.phase = Phase::Countdown {
            remaining: self.config.wave_delay,
        };
    }

    /// Skips the remaining countdown; returns `false` when no countdown is running.
    pub fn start_early(&mut self) -> bool {
        match &mut self.phase {
            Phase::Countdown { remaining } if self.wave < self.generator.total_waves() => {
                *remaining = 0.0;
                true
            }
            _ => false,
        }
    }

    /// Current stage of the wave cycle.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Most recently started wave; zero before the first wave.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Number of waves in the schedule.
    #[must_use]
    pub fn total_waves(&self) -> u32 {
        self.generator.total_waves()
    }

    /// Indicates whether a wave is spawning or draining.
    #[must_use]
    pub const fn is_wave_active(&self) -> bool {
        matches!(self.phase, Phase::Spawning | Phase::Draining)
    }

    /// Advances the director by `dt` and emits the resulting commands.
    ///
    /// `live_enemies` must count every enemy currently on the map, including
    /// minions that were not spawned by the director.
    pub fn handle(&mut self, dt: Duration, live_enemies: u32, out: &mut Vec<Command>) {
        let dt = dt.as_secs_f32();
        match self.phase {
            Phase::Finished => {}
            Phase::Countdown { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = Phase::Countdown { remaining };
                    return;
                }
                if self.wave >= self.generator.total_waves() {
                    self.finish(out);
                    return;
                }
                self.begin_next_wave(out);
                self.spawn_due(0.0, out);
            }
            Phase::Spawning => self.spawn_due(dt, out),
            Phase::Draining => {
                if live_enemies == 0 {
                    self.complete_wave(out);
                    self.after_clear(out);
                }
            }
        }
    }

    fn begin_next_wave(&mut self, out: &mut Vec<Command>) {
        self.wave += 1;
        self.group_index = 0;
        self.spawned_in_group = 0;
        self.spawn_timer = 0.0;
        self.wave_completed = false;
        self.phase = Phase::Spawning;
        out.push(Command::BeginWave { wave: self.wave });
    }

    fn spawn_due(&mut self, dt: f32, out: &mut Vec<Command>) {
        let plan = self.generator.wave(self.wave);
        self.spawn_timer -= dt;
        while self.spawn_timer <= 0.0 {
            let Some(group) = plan.groups.get(self.group_index) else {
                break;
            };
            out.push(Command::SpawnEnemy {
                kind: group.kind,
                wave: self.wave,
                scaling: plan.scaling,
            });
            self.spawned_in_group += 1;
            self.spawn_timer += group.interval;
            if self.spawned_in_group >= group.count {
                self.group_index += 1;
                self.spawned_in_group = 0;
            }
        }

        if self.group_index < plan.groups.len() {
            return;
        }

        match self.config.completion {
            WaveCompletion::AllDefeated => self.phase = Phase::Draining,
            WaveCompletion::AllSpawned => {
                self.complete_wave(out);
                if self.wave >= self.generator.total_waves() {
                    self.phase = Phase::Draining;
                } else {
                    self.phase = Phase::Countdown {
                        remaining: ALL_SPAWNED_GAP,
                    };
                }
            }
        }
    }

    fn complete_wave(&mut self, out: &mut Vec<Command>) {
        if self.wave_completed {
            return;
        }
        self.wave_completed = true;
        out.push(Command::CompleteWave { wave: self.wave });
    }

    fn after_clear(&mut self, out: &mut Vec<Command>) {
        if self.wave >= self.generator.total_waves() {
            self.finish(out);
        } else {
            self.phase = Phase::Countdown {
                remaining: self.config.wave_delay,
            };
        }
    }

    fn finish(&mut self, out: &mut Vec<Command>) {
        self.phase = Phase::Finished;
        if !self.victory_declared {
            self.victory_declared = true;
            out.push(Command::DeclareVictory);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{Difficulty, EnemyKind};

    fn director(completion: WaveCompletion) -> WaveDirector {
        WaveDirector::new(
            Config::new(2.0, 3.0, completion),
            WaveGenerator::new(Difficulty::Normal),
        )
    }

    fn step(director: &mut WaveDirector, seconds: f32, live: u32) -> Vec<Command> {
        let mut out = Vec::new();
        director.handle(Duration::from_secs_f32(seconds), live, &mut out);
        out
    }

    #[test]
    fn first_wave_waits_for_initial_delay() {
        let mut director = director(WaveCompletion::AllDefeated);
        assert!(step(&mut director, 1.0, 0).is_empty());

        let commands = step(&mut director, 1.0, 0);
        assert_eq!(commands[0], Command::BeginWave { wave: 1 });
        assert_eq!(
            commands[1],
            Command::SpawnEnemy {
                kind: EnemyKind::Grunt,
                wave: 1,
                scaling: 1.0,
            }
        );
        assert_eq!(commands.len(), 2);
        assert!(director.is_wave_active());
    }

    #[test]
    fn large_step_emits_every_due_spawn() {
        let mut director = director(WaveCompletion::AllDefeated);
        let _ = step(&mut director, 2.0, 0);
        let commands = step(&mut director, 1.0, 1);
        let spawns = commands
            .iter()
            .filter(|command| matches!(command, Command::SpawnEnemy { .. }))
            .count();
        assert_eq!(spawns, 2);
    }

    #[test]
    fn wave_completes_after_field_clears() {
        let mut director = director(WaveCompletion::AllDefeated);
        let _ = step(&mut director, 2.0, 0);
        let _ = step(&mut director, 10.0, 12);
        assert_eq!(director.phase(), Phase::Draining);
        assert!(step(&mut director, 0.1, 3).is_empty());

        let commands = step(&mut director, 0.1, 0);
        assert_eq!(commands, vec![Command::CompleteWave { wave: 1 }]);
        assert_eq!(director.phase(), Phase::Countdown { remaining: 3.0 });
    }

    #[test]
    fn all_spawned_policy_completes_without_waiting() {
        let mut director = director(WaveCompletion::AllSpawned);
        let _ = step(&mut director, 2.0, 0);
        let commands = step(&mut director, 10.0, 12);
        assert_eq!(commands.last(), Some(&Command::CompleteWave { wave: 1 }));
        assert_eq!(director.phase(), Phase::Countdown { remaining: 1.5 });
    }

    #[test]
    fn start_early_skips_countdown() {
        let mut director = director(WaveCompletion::AllDefeated);
        assert!(director.start_early());
        let commands = step(&mut director, 0.0, 0);
        assert_eq!(commands[0], Command::BeginWave { wave: 1 });
        assert!(!director.start_early());
    }

    #[test]
    fn resume_after_schedules_following_wave() {
        let mut director = director(WaveCompletion::AllDefeated);
        director.resume_after(6);
        assert_eq!(director.wave(), 6);
        let commands = step(&mut director, 3.0, 0);
        assert_eq!(commands[0], Command::BeginWave { wave: 7 });
    }

    #[test]
    fn victory_is_declared_exactly_once() {
        let mut director = director(WaveCompletion::AllDefeated);
        director.resume_after(29);
        let mut victories = 0;
        let mut completed = Vec::new();
        for _ in 0..2_000 {
            for command in step(&mut director, 0.25, 0) {
                match command {
                    Command::DeclareVictory => victories += 1,
                    Command::CompleteWave { wave } => completed.push(wave),
                    _ => {}
                }
            }
        }
        assert_eq!(victories, 1);
        assert_eq!(completed, vec![30]);
        assert_eq!(director.phase(), Phase::Finished);
    }

    #[test]
    fn all_spawned_policy_waits_for_clear_field_before_victory() {
        let mut director = director(WaveCompletion::AllSpawned);
        director.resume_after(29);
        let mut commands = step(&mut director, 3.0, 0);
        commands.extend(step(&mut director, 200.0, 5));
        assert!(commands.contains(&Command::CompleteWave { wave: 30 }));
        assert!(!commands.contains(&Command::DeclareVictory));

        assert_eq!(step(&mut director, 0.1, 0), vec![Command::DeclareVictory]);
        assert!(step(&mut director, 0.1, 0).is_empty());
    }
}
