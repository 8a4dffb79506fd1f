#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system responsible for turning player build intents into tower commands.

use warden_core::{CellCoord, Command, EntityId, Event, TowerKind};

/// Declarative placement preview describing a potential tower construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Cell the tower would occupy.
    pub cell: CellCoord,
    /// Indicates whether the preview represents a legal placement.
    pub placeable: bool,
}

impl PlacementPreview {
    /// Creates a new placement preview descriptor.
    #[must_use]
    pub const fn new(kind: TowerKind, cell: CellCoord, placeable: bool) -> Self {
        Self {
            kind,
            cell,
            placeable,
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// The player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// The player asked to sell the hovered tower.
    pub sell_action: bool,
    /// The player asked to upgrade the hovered tower.
    pub upgrade_action: bool,
    /// The player asked to repair the hovered tower.
    pub repair_action: bool,
    /// Cell currently hovered by the cursor.
    pub cursor_cell: Option<CellCoord>,
}

/// Builder system that translates preview + input into tower commands.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    session_over: bool,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session_over: false,
        }
    }

    /// Consumes world events and adapter-derived input to emit tower commands.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `query::tower_at` helper so the system can identify the hovered tower.
    /// Nothing is emitted once the world reported victory or defeat.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        preview: Option<PlacementPreview>,
        input: BuilderInput,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> Option<EntityId>,
    {
        for event in events {
            if matches!(event, Event::Victory | Event::Defeat) {
                self.session_over = true;
            }
        }

        if self.session_over {
            return;
        }

        if input.confirm_action {
            if let Some(preview) = preview {
                if preview.placeable {
                    out.push(Command::PlaceTower {
                        kind: preview.kind,
                        cell: preview.cell,
                    });
                }
            }
        }

        if !(input.sell_action || input.upgrade_action || input.repair_action) {
            return;
        }

        let Some(tower) = input.cursor_cell.and_then(&mut tower_at) else {
            return;
        };

        if input.sell_action {
            out.push(Command::SellTower { tower });
        } else if input.upgrade_action {
            out.push(Command::UpgradeTower { tower });
        } else if input.repair_action {
            out.push(Command::RepairTower { tower });
        }
    }
}
