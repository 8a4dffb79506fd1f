//! Static level layout: tile classifications, waypoints and coordinate conversion.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_core::{CellCoord, Tile, TILE_SIZE};

/// Serialized level description as stored in level files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Display name of the level; also identifies it inside saved sessions.
    pub name: String,
    /// Number of tile columns.
    pub cols: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Tile codes in row-major order, one inner vector per row.
    pub tiles: Vec<Vec<u8>>,
    /// Ordered `[column, row]` cells describing the ground route.
    #[serde(default)]
    pub waypoints: Vec<[i32; 2]>,
    /// `[column, row]` cell where enemies enter.
    pub spawn: [i32; 2],
    /// `[column, row]` cell enemies try to reach.
    pub exit: [i32; 2],
}

/// Errors raised while loading a level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level file is not valid JSON for a level definition.
    #[error("level is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The level declares zero columns or rows.
    #[error("level dimensions must be non-zero, got {columns}x{rows}")]
    EmptyDimensions {
        /// Declared columns.
        columns: u32,
        /// Declared rows.
        rows: u32,
    },
    /// The tile grid does not match the declared number of rows.
    #[error("expected {expected} tile rows, found {found}")]
    RowCount {
        /// Declared rows.
        expected: u32,
        /// Rows present in the tile grid.
        found: usize,
    },
    /// A tile row does not match the declared number of columns.
    #[error("tile row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        /// Offending row.
        row: usize,
        /// Declared columns.
        expected: u32,
        /// Columns present in the row.
        found: usize,
    },
    /// A tile code or character is not recognised.
    #[error("unknown tile {code:?} at column {column}, row {row}")]
    UnknownTile {
        /// Offending code or character.
        code: String,
        /// Column of the tile.
        column: usize,
        /// Row of the tile.
        row: usize,
    },
    /// A referenced cell lies outside the grid.
    #[error("{what} cell ({column}, {row}) lies outside the level")]
    OutOfBounds {
        /// Which reference is invalid.
        what: &'static str,
        /// Column of the cell.
        column: i32,
        /// Row of the cell.
        row: i32,
    },
    /// The spawn or exit sits on a blocked tile.
    #[error("{what} cell ({column}, {row}) is blocked")]
    BlockedEndpoint {
        /// Which endpoint is blocked.
        what: &'static str,
        /// Column of the cell.
        column: i32,
        /// Row of the cell.
        row: i32,
    },
    /// An ASCII layout does not contain exactly one spawn or exit marker.
    #[error("layout must contain exactly one {what} marker, found {found}")]
    MarkerCount {
        /// Which marker is wrong.
        what: &'static str,
        /// Number of markers found.
        found: usize,
    },
}

/// Immutable tile grid of a loaded level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    name: String,
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
    waypoints: Vec<CellCoord>,
    spawn: CellCoord,
    exit: CellCoord,
}

impl GridMap {
    /// Parses and validates a JSON level definition.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let definition: LevelDefinition = serde_json::from_str(json)?;
        Self::from_definition(definition)
    }

    /// Validates a level definition and builds the grid.
    pub fn from_definition(definition: LevelDefinition) -> Result<Self, LevelError> {
        let LevelDefinition {
            name,
            cols,
            rows,
            tiles: tile_rows,
            waypoints,
            spawn,
            exit,
        } = definition;

        if cols == 0 || rows == 0 {
            return Err(LevelError::EmptyDimensions {
                columns: cols,
                rows,
            });
        }
        if tile_rows.len() != rows as usize {
            return Err(LevelError::RowCount {
                expected: rows,
                found: tile_rows.len(),
            });
        }

        let mut tiles = Vec::with_capacity(cols as usize * rows as usize);
        for (row, codes) in tile_rows.iter().enumerate() {
            if codes.len() != cols as usize {
                return Err(LevelError::ColumnCount {
                    row,
                    expected: cols,
                    found: codes.len(),
                });
            }
            for (column, code) in codes.iter().enumerate() {
                let tile = Tile::from_code(*code).ok_or_else(|| LevelError::UnknownTile {
                    code: code.to_string(),
                    column,
                    row,
                })?;
                tiles.push(tile);
            }
        }

        let map = Self {
            name,
            columns: cols,
            rows,
            tiles,
            waypoints: waypoints
                .iter()
                .map(|[column, row]| CellCoord::new(*column, *row))
                .collect(),
            spawn: CellCoord::new(spawn[0], spawn[1]),
            exit: CellCoord::new(exit[0], exit[1]),
        };
        map.validate_references()?;
        Ok(map)
    }

    /// Builds a grid from a compact text layout, one string per row.
    ///
    /// `.` is grass, `=` path, `#` blocked, `S` spawn, `E` exit and `B`
    /// buildable. The layout must contain exactly one spawn and one exit.
    pub fn from_ascii(name: &str, layout: &[&str]) -> Result<Self, LevelError> {
        let rows = layout.len();
        let columns = layout.first().map_or(0, |line| line.chars().count());
        if rows == 0 || columns == 0 {
            return Err(LevelError::EmptyDimensions {
                columns: columns as u32,
                rows: rows as u32,
            });
        }

        let mut tiles = Vec::with_capacity(rows * columns);
        let mut spawns = Vec::new();
        let mut exits = Vec::new();
        for (row, line) in layout.iter().enumerate() {
            let found = line.chars().count();
            if found != columns {
                return Err(LevelError::ColumnCount {
                    row,
                    expected: columns as u32,
                    found,
                });
            }
            for (column, glyph) in line.chars().enumerate() {
                let tile = match glyph {
                    '.' => Tile::Grass,
                    '=' => Tile::Path,
                    '#' => Tile::Blocked,
                    'S' => Tile::Spawn,
                    'E' => Tile::Exit,
                    'B' => Tile::Buildable,
                    other => {
                        return Err(LevelError::UnknownTile {
                            code: other.to_string(),
                            column,
                            row,
                        })
                    }
                };
                let cell = CellCoord::new(column as i32, row as i32);
                match tile {
                    Tile::Spawn => spawns.push(cell),
                    Tile::Exit => exits.push(cell),
                    _ => {}
                }
                tiles.push(tile);
            }
        }

        let spawn = single_marker("spawn", &spawns)?;
        let exit = single_marker("exit", &exits)?;
        let map = Self {
            name: name.to_owned(),
            columns: columns as u32,
            rows: rows as u32,
            tiles,
            waypoints: Vec::new(),
            spawn,
            exit,
        };
        map.validate_references()?;
        Ok(map)
    }

    /// Replaces the ground route with the provided waypoint cells.
    pub fn with_waypoints(mut self, waypoints: Vec<CellCoord>) -> Result<Self, LevelError> {
        self.waypoints = waypoints;
        self.validate_references()?;
        Ok(self)
    }

    fn validate_references(&self) -> Result<(), LevelError> {
        let endpoints = [("spawn", self.spawn), ("exit", self.exit)];
        let waypoints = self.waypoints.iter().map(|cell| ("waypoint", *cell));
        for (what, cell) in endpoints.into_iter().chain(waypoints) {
            if !self.in_bounds(cell) {
                return Err(LevelError::OutOfBounds {
                    what,
                    column: cell.column(),
                    row: cell.row(),
                });
            }
        }
        for (what, cell) in endpoints {
            if !self.tile_at(cell).is_passable() {
                return Err(LevelError::BlockedEndpoint {
                    what,
                    column: cell.column(),
                    row: cell.row(),
                });
            }
        }
        Ok(())
    }

    /// Display name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell where enemies enter.
    #[must_use]
    pub const fn spawn(&self) -> CellCoord {
        self.spawn
    }

    /// Cell enemies try to reach.
    #[must_use]
    pub const fn exit(&self) -> CellCoord {
        self.exit
    }

    /// Ordered waypoint cells of the designed ground route.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() >= 0
            && cell.row() >= 0
            && (cell.column() as u32) < self.columns
            && (cell.row() as u32) < self.rows
    }

    /// Classification of the cell; cells outside the grid are blocked.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Tile {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(Tile::Blocked)
    }

    /// Reports whether a tower may ever stand on the cell.
    #[must_use]
    pub fn is_buildable(&self, cell: CellCoord) -> bool {
        self.tile_at(cell) == Tile::Buildable
    }

    /// World-space centre of the cell.
    #[must_use]
    pub fn grid_to_world(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            cell.column() as f32 * TILE_SIZE + TILE_SIZE * 0.5,
            cell.row() as f32 * TILE_SIZE + TILE_SIZE * 0.5,
        )
    }

    /// Cell containing the world-space point.
    #[must_use]
    pub fn world_to_grid(&self, point: Vec2) -> CellCoord {
        CellCoord::new(
            (point.x / TILE_SIZE).floor() as i32,
            (point.y / TILE_SIZE).floor() as i32,
        )
    }

    /// World-space extent of the grid.
    #[must_use]
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.columns as f32 * TILE_SIZE,
            self.rows as f32 * TILE_SIZE,
        )
    }

    /// World-space polyline through the waypoint cells.
    #[must_use]
    pub fn waypoint_route(&self) -> Vec<Vec2> {
        self.waypoints
            .iter()
            .map(|cell| self.grid_to_world(*cell))
            .collect()
    }

    /// Straight two-point line from spawn to exit used by flying enemies.
    #[must_use]
    pub fn flying_route(&self) -> Vec<Vec2> {
        vec![self.grid_to_world(self.spawn), self.grid_to_world(self.exit)]
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some(cell.row() as usize * self.columns as usize + cell.column() as usize)
    }

    pub(crate) fn cell_at(&self, index: usize) -> CellCoord {
        let columns = self.columns as usize;
        CellCoord::new((index % columns) as i32, (index / columns) as i32)
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.tiles.len()
    }
}

fn single_marker(what: &'static str, cells: &[CellCoord]) -> Result<CellCoord, LevelError> {
    match cells {
        [cell] => Ok(*cell),
        _ => Err(LevelError::MarkerCount {
            what,
            found: cells.len(),
        }),
    }
}
