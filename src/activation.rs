//! Special-tile activation: colour bombs and row-clears triggered by a swap.

use crate::board::{Board, GRID_SIZE, Position};
use crate::scoring::{COLOR_BOMB_POINTS, Feedback, ROW_CLEAR_POINTS};
use crate::tile::{Special, Tile, TileColor};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detonation {
    /// Bomb at `bomb` clears every `target`-coloured tile and itself.
    ColorBomb { bomb: Position, target: TileColor },
    /// Row-clear tile at `origin` clears its whole row.
    RowClear { origin: Position },
}

impl Detonation {
    /// Cells emptied by this detonation (each counted once).
    pub fn blast(&self, board: &Board) -> BTreeSet<Position> {
        match *self {
            Self::ColorBomb { bomb, target } => {
                let mut cells: BTreeSet<Position> = board
                    .tiles()
                    .filter(|(_, t)| t.color == target)
                    .map(|(pos, _)| pos)
                    .collect();
                cells.insert(bomb);
                cells
            }
            Self::RowClear { origin } => (0..GRID_SIZE)
                .map(|col| Position::new(origin.row, col))
                .filter(|&pos| board.tile_at(pos).is_some())
                .collect(),
        }
    }

    pub fn points(&self, cleared: usize) -> u32 {
        let per_tile = match self {
            Self::ColorBomb { .. } => COLOR_BOMB_POINTS,
            Self::RowClear { .. } => ROW_CLEAR_POINTS,
        };
        cleared as u32 * per_tile
    }

    pub fn feedback(&self) -> Feedback {
        match self {
            Self::ColorBomb { .. } => Feedback::Perfect,
            Self::RowClear { .. } => Feedback::Awesome,
        }
    }
}

/// Inspect the two cells of an already-applied swap. Fixed priority, first match wins:
/// bomb at `a`, bomb at `b`, row-clear at `a`, row-clear at `b`.
pub fn detect(board: &Board, a: Position, b: Position) -> Option<Detonation> {
    let ta = board.tile_at(a);
    let tb = board.tile_at(b);
    let special = |t: Option<Tile>| t.map(|t| t.special);

    match (ta, tb) {
        (Some(bomb), Some(other)) if bomb.special == Special::ColorBomb => {
            return Some(Detonation::ColorBomb {
                bomb: a,
                target: other.color,
            });
        }
        (Some(other), Some(bomb)) if bomb.special == Special::ColorBomb => {
            return Some(Detonation::ColorBomb {
                bomb: b,
                target: other.color,
            });
        }
        _ => {}
    }
    if special(ta) == Some(Special::RowClear) {
        return Some(Detonation::RowClear { origin: a });
    }
    if special(tb) == Some(Special::RowClear) {
        return Some(Detonation::RowClear { origin: b });
    }
    None
}
