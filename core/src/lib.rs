#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Warden tower-defense engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point and broadcasts [`Event`] values describing what
//! happened. Systems read immutable snapshot views and respond exclusively
//! with new command batches, which the world executes at fixed points of its
//! tick pipeline.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod catalog;
mod enemies;
mod hero;
mod session;

pub use catalog::{EffectSpec, TowerCatalog, TowerStats, MAX_TOWER_LEVEL};
pub use enemies::{boss_ability_for_wave, enemy_stats, BossAbility, EnemyStats, MeleeStats};
pub use hero::{
    ability_spec, hero_max_hp, xp_threshold, AbilitySpec, HeroUpgrades, HERO_ARMOR,
    HERO_ATTACK_COOLDOWN, HERO_ATTACK_RANGE, HERO_BASE_DAMAGE, HERO_BASE_HP,
    HERO_PROJECTILE_SPEED, HERO_SPEED, MAX_HERO_UPGRADE_LEVEL, UpgradeTrack,
};
pub use session::{SessionSnapshot, TowerRecord};

/// Edge length of a single square tile measured in world units.
pub const TILE_SIZE: f32 = 48.0;

slotmap::new_key_type! {
    /// Opaque generational handle identifying a simulated entity.
    ///
    /// Handles stay unique after destruction, so a stale handle can always be
    /// detected by asking the world whether it is still alive.
    pub struct EntityId;
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by the provided delta, scaled by the time scale.
    Tick {
        /// Unscaled duration that elapsed since the previous tick.
        dt: Duration,
    },
    /// Changes the multiplier applied to every subsequent tick delta.
    SetTimeScale {
        /// New multiplier; must be finite and strictly positive.
        scale: f32,
    },
    /// Requests placement of a level-one tower on the provided cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the tower should occupy.
        cell: CellCoord,
    },
    /// Requests that an existing tower be sold for a partial refund.
    SellTower {
        /// Tower targeted for sale.
        tower: EntityId,
    },
    /// Requests that an existing tower advance to its next level.
    UpgradeTower {
        /// Tower targeted for the upgrade.
        tower: EntityId,
    },
    /// Requests that a damaged tower be restored to full health.
    RepairTower {
        /// Tower targeted for repair.
        tower: EntityId,
    },
    /// Updates the direction the hero walks in; a zero vector stops the hero.
    SetHeroHeading {
        /// Desired heading; normalised by the world.
        heading: Vec2,
    },
    /// Queues a hero ability trigger, resolved during the next hero pass.
    TriggerAbility {
        /// Ability the player triggered.
        ability: HeroAbility,
        /// World-space point the ability is aimed at.
        target: Vec2,
    },
    /// Skips the remaining countdown before the next wave.
    StartNextWave,
    /// Spends upgrade experience on the next level of a permanent hero track.
    PurchaseHeroUpgrade {
        /// Track to raise.
        track: UpgradeTrack,
    },
    /// Marks the provided wave as active.
    BeginWave {
        /// One-based wave number that started.
        wave: u32,
    },
    /// Spawns a single enemy at the head of its route.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
        /// Wave the enemy belongs to.
        wave: u32,
        /// Multiplier applied to hit points, armor, reward and melee damage.
        scaling: f32,
    },
    /// Marks the provided wave as complete.
    CompleteWave {
        /// One-based wave number that completed.
        wave: u32,
    },
    /// Ends the session in victory.
    DeclareVictory,
    /// Launches a projectile from a tower toward an enemy.
    FireProjectile {
        /// Tower that fires.
        tower: EntityId,
        /// Enemy the projectile homes on.
        target: EntityId,
    },
    /// Applies one beam tick from a beam tower to an enemy.
    FireBeam {
        /// Tower that fires.
        tower: EntityId,
        /// Enemy struck by the beam.
        target: EntityId,
    },
    /// Launches the hero's auto-attack projectile toward an enemy.
    HeroAttack {
        /// Enemy the projectile homes on.
        target: EntityId,
    },
    /// Resolves a ready hero ability.
    CastAbility {
        /// Ability being cast.
        ability: HeroAbility,
        /// World-space point the ability is aimed at.
        target: Vec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Scaled duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the tick multiplier changed.
    TimeScaleChanged {
        /// Multiplier that is now active.
        scale: f32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: EntityId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Gold charged for the placement.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Tower that was removed.
        tower: EntityId,
        /// Cell released by the sale.
        cell: CellCoord,
        /// Gold returned to the player.
        refund: u32,
    },
    /// Confirms that a tower advanced a level.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: EntityId,
        /// Level the tower reached.
        level: u8,
        /// Gold charged for the upgrade.
        cost: u32,
    },
    /// Confirms that a tower was repaired to full health.
    TowerRepaired {
        /// Tower that was repaired.
        tower: EntityId,
        /// Gold charged for the repair.
        cost: u32,
    },
    /// Reports that an enemy struck a tower.
    TowerDamaged {
        /// Tower that was struck.
        tower: EntityId,
        /// Damage dealt.
        amount: i32,
        /// Hit points left after the strike.
        remaining: i32,
    },
    /// Reports that a tower was destroyed by enemies.
    TowerDestroyed {
        /// Tower that was destroyed.
        tower: EntityId,
        /// Cell released by the destruction.
        cell: CellCoord,
    },
    /// Reports that a sell, upgrade or repair request was rejected.
    TowerCommandRejected {
        /// Tower named in the request.
        tower: EntityId,
        /// Specific reason the request failed.
        reason: TowerCommandError,
    },
    /// Announces that the cached spawn-to-exit route was recomputed.
    RouteRecomputed {
        /// Number of points in the new route; zero when severed.
        points: usize,
    },
    /// Announces that a wave started.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Whether the wave is a boss wave.
        boss: bool,
    },
    /// Announces that a wave completed.
    WaveCompleted {
        /// One-based wave number.
        wave: u32,
    },
    /// Confirms that an enemy entered the map.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EntityId,
        /// Kind of enemy that spawned.
        kind: EnemyKind,
    },
    /// Confirms that a projectile was launched.
    ProjectileLaunched {
        /// Identifier assigned to the projectile.
        projectile: EntityId,
        /// Enemy the projectile homes on.
        target: EntityId,
    },
    /// Reports a single damage resolution against an enemy.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EntityId,
        /// Damage applied after armor.
        amount: i32,
        /// Hit points left after the hit.
        remaining: i32,
    },
    /// Reports that a status effect was applied to an enemy.
    EffectApplied {
        /// Enemy that received the effect.
        enemy: EntityId,
        /// Kind of effect applied.
        effect: EffectKind,
    },
    /// Reports that an enemy was killed.
    EnemyDied {
        /// Enemy that died.
        enemy: EntityId,
        /// Kind of enemy that died.
        kind: EnemyKind,
        /// Gold value of the dropped pickup.
        reward: u32,
        /// Location of the death.
        position: Vec2,
    },
    /// Reports that an enemy reached the exit.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EntityId,
        /// Lives left after the escape.
        lives_remaining: u32,
    },
    /// Reports that a boss used its special ability.
    BossAbilityTriggered {
        /// Boss that used the ability.
        enemy: EntityId,
        /// Ability that triggered.
        ability: BossAbility,
    },
    /// Reports that the hero took damage.
    HeroDamaged {
        /// Damage dealt.
        amount: i32,
        /// Hit points left after the hit.
        remaining: i32,
    },
    /// Reports that the hero reached a new level.
    HeroLeveledUp {
        /// Level reached.
        level: u32,
    },
    /// Reports that the hero fell and respawned at the spawn cell.
    HeroRespawned,
    /// Confirms that a hero ability resolved.
    AbilityCast {
        /// Ability that resolved.
        ability: HeroAbility,
    },
    /// Confirms that a permanent hero upgrade was bought.
    HeroUpgradePurchased {
        /// Track that was raised.
        track: UpgradeTrack,
        /// Level the track reached.
        level: u8,
        /// Upgrade experience spent.
        cost: u32,
    },
    /// Reports that a hero upgrade purchase was rejected.
    HeroUpgradeRejected {
        /// Track named in the request.
        track: UpgradeTrack,
        /// Specific reason the purchase failed.
        reason: UpgradeError,
    },
    /// Reports that the hero collected a pickup.
    GoldCollected {
        /// Gold gained from the pickup.
        amount: u32,
        /// Gold held after collection.
        total: u32,
    },
    /// The final wave was cleared.
    Victory,
    /// The player ran out of lives.
    Defeat,
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that points outside the map still resolve to a
/// cell, which then classifies as blocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Classification of a single map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Open ground that enemies may cross but towers may not occupy.
    Grass,
    /// Designed enemy route.
    Path,
    /// Impassable terrain.
    Blocked,
    /// Cell where enemies enter the map.
    Spawn,
    /// Cell enemies try to reach.
    Exit,
    /// Cell that accepts towers.
    Buildable,
}

impl Tile {
    /// Decodes the numeric tile code used by level files.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Grass),
            1 => Some(Self::Path),
            2 => Some(Self::Blocked),
            3 => Some(Self::Spawn),
            4 => Some(Self::Exit),
            5 => Some(Self::Buildable),
            _ => None,
        }
    }

    /// Numeric tile code used by level files.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Grass => 0,
            Self::Path => 1,
            Self::Blocked => 2,
            Self::Spawn => 3,
            Self::Exit => 4,
            Self::Buildable => 5,
        }
    }

    /// Reports whether ground enemies may traverse the tile.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Blocked)
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Reliable single-target damage.
    Arrow,
    /// Slow shells that damage everything around the impact point.
    Cannon,
    /// Light damage that slows the target.
    Ice,
    /// Bolts that chain to nearby enemies.
    Lightning,
    /// Light damage that poisons the target.
    Poison,
    /// Continuous beam that burns the target.
    Laser,
}

impl TowerKind {
    /// Every tower kind in catalog order.
    pub const ALL: [TowerKind; 6] = [
        Self::Arrow,
        Self::Cannon,
        Self::Ice,
        Self::Lightning,
        Self::Poison,
        Self::Laser,
    ];

    /// Reports whether the tower damages through a beam instead of projectiles.
    #[must_use]
    pub const fn is_beam(self) -> bool {
        matches!(self, Self::Laser)
    }
}

/// Types of enemies that waves are composed of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline walker.
    Grunt,
    /// Fast, fragile walker.
    Runner,
    /// Slow, armored walker that can batter towers.
    Tank,
    /// Support walker that heals nearby enemies.
    Healer,
    /// Airborne enemy that flies straight from spawn to exit.
    Flying,
    /// Wave boss with a special ability.
    Boss,
}

impl EnemyKind {
    /// Every enemy kind in table order.
    pub const ALL: [EnemyKind; 6] = [
        Self::Grunt,
        Self::Runner,
        Self::Tank,
        Self::Healer,
        Self::Flying,
        Self::Boss,
    ];

    /// Reports whether the enemy ignores the ground route.
    #[must_use]
    pub const fn is_flying(self) -> bool {
        matches!(self, Self::Flying)
    }
}

/// Timed modifiers applied to enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Multiplies movement speed.
    Slow,
    /// Periodic damage.
    Poison,
    /// Periodic damage applied by beams.
    Burn,
    /// Stops movement entirely.
    Stun,
}

/// Player-triggered hero abilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeroAbility {
    /// Area burst centred on the hero.
    Fireball,
    /// Instant self-heal.
    Heal,
    /// Area burst centred on a target point.
    Thunderstrike,
}

impl HeroAbility {
    /// Every ability in slot order.
    pub const ALL: [HeroAbility; 3] = [Self::Fireball, Self::Heal, Self::Thunderstrike];

    /// Slot index used for cooldown bookkeeping.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::Fireball => 0,
            Self::Heal => 1,
            Self::Thunderstrike => 2,
        }
    }
}

/// Difficulty presets chosen before a session starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Weaker enemies, richer rewards, more lives.
    Easy,
    /// Reference balance.
    #[default]
    Normal,
    /// Tougher enemies, poorer rewards, fewer lives.
    Hard,
}

impl Difficulty {
    /// Multiplier applied on top of the wave scaling factor.
    #[must_use]
    pub const fn scaling_multiplier(self) -> f32 {
        match self {
            Self::Easy => 0.8,
            Self::Normal => 1.0,
            Self::Hard => 1.3,
        }
    }

    /// Multiplier applied to gold dropped by defeated enemies.
    #[must_use]
    pub const fn reward_multiplier(self) -> f32 {
        match self {
            Self::Easy => 1.2,
            Self::Normal => 1.0,
            Self::Hard => 0.8,
        }
    }

    /// Lives granted at the start of a fresh session.
    #[must_use]
    pub const fn starting_lives(self) -> u32 {
        match self {
            Self::Easy => 30,
            Self::Normal => 20,
            Self::Hard => 10,
        }
    }
}

/// Rule that decides when an active wave counts as complete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveCompletion {
    /// The wave completes once every group spawned and every enemy is gone.
    #[default]
    AllDefeated,
    /// The wave completes as soon as every group spawned.
    AllSpawned,
}

/// Hit points and flat armor carried by damageable entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Health {
    /// Remaining hit points; may drop below zero before death resolution.
    pub current: i32,
    /// Maximum hit points.
    pub max: i32,
    /// Flat reduction applied to every incoming hit.
    pub armor: i32,
}

impl Health {
    /// Creates a full health pool with the provided armor.
    #[must_use]
    pub const fn full(max: i32, armor: i32) -> Self {
        Self {
            current: max,
            max,
            armor,
        }
    }

    /// Fraction of hit points remaining, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
    }

    /// Reports whether the pool is exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

/// Computes the damage that survives armor; never less than one.
#[must_use]
pub const fn apply_damage(raw: i32, armor: i32) -> i32 {
    let reduced = raw.saturating_sub(armor);
    if reduced > 1 {
        reduced
    } else {
        1
    }
}

/// Visual tint attached to catalog entries and enemy kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    red: u8,
    green: u8,
    blue: u8,
}

impl Tint {
    /// Creates a new tint from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the tint.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the tint.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the tint.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Immutable representation of a single enemy used by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EntityId,
    /// Kind of enemy.
    pub kind: EnemyKind,
    /// Current world-space position.
    pub position: Vec2,
    /// Current health pool.
    pub health: Health,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

}

/// Immutable representation of a single tower used by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier of the tower.
    pub id: EntityId,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Current level, starting at one.
    pub level: u8,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// World-space centre of the tower.
    pub position: Vec2,
    /// Targeting radius in world units.
    pub range: f32,
    /// Indicates whether the tower's cooldown has elapsed.
    pub ready: bool,
}

/// Read-only snapshot describing all towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn get(&self, tower: EntityId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

/// Target assignment computed for a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired a target.
    pub tower: EntityId,
    /// Enemy the tower aims at.
    pub enemy: EntityId,
    /// Distance between tower and enemy at selection time.
    pub distance: f32,
}

/// Ability trigger waiting for the next hero pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilityRequest {
    /// Ability the player triggered.
    pub ability: HeroAbility,
    /// World-space point the ability is aimed at.
    pub target: Vec2,
}

/// Immutable representation of the hero used by the hero system.
#[derive(Clone, Debug, PartialEq)]
pub struct HeroSnapshot {
    /// Current world-space position.
    pub position: Vec2,
    /// Current level, starting at one.
    pub level: u32,
    /// Auto-attack radius including upgrade bonuses.
    pub attack_range: f32,
    /// Indicates whether the auto-attack cooldown elapsed.
    pub attack_ready: bool,
    /// Readiness of each ability, indexed by [`HeroAbility::slot`].
    pub abilities_ready: [bool; 3],
    /// Ability triggers queued since the previous hero pass.
    pub requests: Vec<AbilityRequest>,
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The cell lies outside the map.
    OutOfBounds,
    /// The cell is not tagged as buildable.
    NotBuildable,
    /// Another tower already occupies the cell.
    Occupied,
    /// The tower would disconnect the spawn from the exit.
    BlocksPath,
    /// The player cannot afford the tower.
    InsufficientGold,
    /// The session already ended.
    SessionOver,
}

/// Reasons a sell, upgrade or repair request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerCommandError {
    /// No live tower carries the provided identifier.
    MissingTower,
    /// The tower already reached the maximum level.
    MaxLevel,
    /// The player cannot afford the request.
    InsufficientGold,
    /// The tower is not damaged.
    Undamaged,
    /// Towers have no health while the melee extension is disabled.
    MeleeDisabled,
    /// The session already ended.
    SessionOver,
}

/// Reasons a hero upgrade purchase may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// The track already reached the maximum level.
    MaxLevel,
    /// Not enough upgrade experience is banked.
    InsufficientXp,
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every wave was cleared.
    Victory,
    /// The player ran out of lives.
    Defeat,
}

/// Short-lived visual markers exposed to presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Area impact of a cannon shell.
    Explosion,
    /// Fireball burst around the hero.
    Fireball,
    /// Heal burst around the hero.
    Heal,
    /// Thunderstrike impact.
    Thunderstrike,
}

/// Visual classification of an entity for renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// Enemy of the given kind.
    Enemy(EnemyKind),
    /// Tower of the given kind and level.
    Tower {
        /// Kind of tower.
        kind: TowerKind,
        /// Current level.
        level: u8,
    },
    /// Projectile in flight.
    Projectile,
    /// The hero.
    Hero,
    /// Gold pickup.
    Pickup,
    /// Transient marker.
    Marker(MarkerKind),
}

/// Read-only item of the presentation feed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresentationItem {
    /// Entity the item describes.
    pub entity: EntityId,
    /// World-space position.
    pub position: Vec2,
    /// Visual classification.
    pub visual: VisualKind,
    /// Fraction of health remaining for damageable entities.
    pub health_ratio: Option<f32>,
    /// Status effect currently applied, if any.
    pub status: Option<EffectKind>,
    /// Catalog tint for enemies and towers.
    pub tint: Option<Tint>,
}

/// Running totals of a session, reported on the game-over screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Enemies killed, minions included.
    pub total_kills: u32,
    /// Bosses killed.
    pub boss_kills: u32,
    /// Times the hero fell and respawned.
    pub hero_deaths: u32,
    /// Gold collected from pickups.
    pub gold_earned: u32,
    /// Gold spent on placements, upgrades and repairs.
    pub gold_spent: u32,
    /// Towers placed.
    pub towers_built: u32,
    /// Towers sold.
    pub towers_sold: u32,
}

/// Summary of the session counters for heads-up displays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudSnapshot {
    /// Gold available for spending.
    pub gold: u32,
    /// Lives left.
    pub lives: u32,
    /// Most recently started wave; zero before the first wave.
    pub wave: u32,
    /// Number of waves in the schedule.
    pub total_waves: u32,
    /// Indicates whether a wave is currently running.
    pub wave_active: bool,
    /// Enemies currently alive on the map.
    pub live_enemies: u32,
    /// Hero level.
    pub hero_level: u32,
    /// Hero experience toward the next level.
    pub hero_xp: u32,
    /// Experience required for the next level.
    pub hero_xp_to_next: u32,
    /// Seconds left before the next wave while a countdown runs.
    pub next_wave_in: Option<f32>,
    /// Multiplier applied to tick deltas.
    pub time_scale: f32,
    /// Terminal result once the session ended.
    pub outcome: Option<Outcome>,
    /// Upgrade experience banked for permanent hero upgrades.
    pub upgrade_xp: u32,
    /// Running session totals.
    pub stats: SessionStats,
}
