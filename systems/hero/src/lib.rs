#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides hero auto-attacks and resolves queued ability triggers.

use warden_core::{Command, EnemyView, EntityId, HeroSnapshot};

/// Hero system that gates abilities on their cooldowns and picks attack targets.
#[derive(Debug, Default)]
pub struct HeroSystem {
    cast_this_pass: [bool; 3],
}

impl HeroSystem {
    /// Creates a new hero system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::CastAbility` for queued triggers whose ability is ready
    /// and `Command::HeroAttack` toward the nearest enemy strictly inside the
    /// attack range when the auto-attack is ready.
    ///
    /// Each ability is cast at most once per pass; repeated triggers and
    /// triggers for abilities still cooling down are dropped.
    pub fn handle(&mut self, hero: &HeroSnapshot, enemies: &EnemyView, out: &mut Vec<Command>) {
        self.cast_this_pass = [false; 3];

        for request in &hero.requests {
            let slot = request.ability.slot();
            if !hero.abilities_ready[slot] || self.cast_this_pass[slot] {
                continue;
            }
            self.cast_this_pass[slot] = true;
            out.push(Command::CastAbility {
                ability: request.ability,
                target: request.target,
            });
        }

        if !hero.attack_ready {
            return;
        }

        if let Some(target) = nearest_enemy(hero, enemies) {
            out.push(Command::HeroAttack { target });
        }
    }
}

fn nearest_enemy(hero: &HeroSnapshot, enemies: &EnemyView) -> Option<EntityId> {
    let max_distance_sq = hero.attack_range * hero.attack_range;
    let mut best: Option<(f32, EntityId)> = None;

    for enemy in enemies.iter() {
        if enemy.health.is_depleted() {
            continue;
        }
        let distance_sq = hero.position.distance_squared(enemy.position);
        if distance_sq >= max_distance_sq {
            continue;
        }
        if best.map_or(true, |(current, _)| distance_sq < current) {
            best = Some((distance_sq, enemy.id));
        }
    }

    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::HeroSystem;
    use glam::Vec2;
    use slotmap::SlotMap;
    use warden_core::{
        AbilityRequest, Command, EnemyKind, EnemySnapshot, EnemyView, EntityId, Health,
        HeroAbility, HeroSnapshot,
    };

    fn ids(count: usize) -> Vec<EntityId> {
        let mut keys: SlotMap<EntityId, ()> = SlotMap::with_key();
        (0..count).map(|_| keys.insert(())).collect()
    }

    fn hero(attack_ready: bool, requests: Vec<AbilityRequest>) -> HeroSnapshot {
        HeroSnapshot {
            position: Vec2::ZERO,
            level: 1,
            attack_range: 140.0,
            attack_ready,
            abilities_ready: [true, false, true],
            requests,
        }
    }

    fn enemy(id: EntityId, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id,
            kind: EnemyKind::Runner,
            position,
            health: Health::full(45, 0),
        }
    }

    #[test]
    fn attacks_nearest_enemy_in_range() {
        let ids = ids(3);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(ids[0], Vec2::new(100.0, 0.0)),
            enemy(ids[1], Vec2::new(0.0, -40.0)),
            enemy(ids[2], Vec2::new(10.0, 300.0)),
        ]);
        let mut out = Vec::new();

        HeroSystem::new().handle(&hero(true, Vec::new()), &enemies, &mut out);

        assert_eq!(out, vec![Command::HeroAttack { target: ids[1] }]);
    }

    #[test]
    fn cooling_attack_is_silent() {
        let ids = ids(1);
        let enemies = EnemyView::from_snapshots(vec![enemy(ids[0], Vec2::new(20.0, 0.0))]);
        let mut out = Vec::new();

        HeroSystem::new().handle(&hero(false, Vec::new()), &enemies, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn only_ready_abilities_are_cast_once() {
        let target = Vec2::new(64.0, 64.0);
        let requests = vec![
            AbilityRequest {
                ability: HeroAbility::Heal,
                target,
            },
            AbilityRequest {
                ability: HeroAbility::Thunderstrike,
                target,
            },
            AbilityRequest {
                ability: HeroAbility::Thunderstrike,
                target: Vec2::ZERO,
            },
        ];
        let mut out = Vec::new();

        HeroSystem::new().handle(&hero(false, requests), &EnemyView::default(), &mut out);

        assert_eq!(
            out,
            vec![Command::CastAbility {
                ability: HeroAbility::Thunderstrike,
                target,
            }]
        );
    }
}
