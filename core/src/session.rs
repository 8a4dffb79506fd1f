use serde::{Deserialize, Serialize};

use crate::{CellCoord, TowerKind};

/// Persisted tower description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TowerRecord {
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Level of the tower.
    pub level: u8,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
}

/// Session progress captured between waves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Name of the level the session was played on.
    pub map: String,
    /// Gold held.
    pub gold: u32,
    /// Lives left.
    pub lives: u32,
    /// Last wave that was started.
    pub wave: u32,
    /// Hero level.
    pub hero_level: u32,
    /// Hero experience toward the next level.
    pub hero_xp: u32,
    /// Towers on the map ordered by cell.
    pub towers: Vec<TowerRecord>,
}
