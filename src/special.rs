//! Special-tile policy: which matched cells turn into specials instead of clearing.

use crate::board::{Board, Cell, Position};
use crate::matcher::MatchGroup;
use crate::tile::Special;
use std::collections::{BTreeMap, BTreeSet};

/// Group length that earns a row-clear tile.
pub const ROW_CLEAR_RUN: usize = 4;
/// Group length from which a colour bomb is earned instead.
pub const COLOR_BOMB_RUN: usize = 5;

/// Special earned by a group of `len` cells.
pub fn special_for_run(len: usize) -> Option<Special> {
    match len {
        ROW_CLEAR_RUN => Some(Special::RowClear),
        n if n >= COLOR_BOMB_RUN => Some(Special::ColorBomb),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub at: Position,
    pub special: Special,
}

/// Outcome of applying the policy to one detection round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearPlan {
    /// Union of all group cells minus promoted cells.
    pub clear: BTreeSet<Position>,
    pub promotions: Vec<Promotion>,
    /// Longest group this round (drives feedback tier).
    pub max_group: usize,
}

/// Each group's scan-order-last cell is promoted when the group is long enough.
/// A cell promoted by two groups keeps the later group's special.
pub fn plan_clears(groups: &[MatchGroup]) -> ClearPlan {
    let mut clear = BTreeSet::new();
    let mut promoted: BTreeMap<Position, Special> = BTreeMap::new();
    let mut max_group = 0;

    for group in groups {
        max_group = max_group.max(group.len());
        clear.extend(group.cells.iter().copied());
        if let (Some(special), Some(last)) = (special_for_run(group.len()), group.last()) {
            promoted.insert(last, special);
        }
    }
    for pos in promoted.keys() {
        clear.remove(pos);
    }

    ClearPlan {
        clear,
        promotions: promoted
            .into_iter()
            .map(|(at, special)| Promotion { at, special })
            .collect(),
        max_group,
    }
}

/// Upgrade the promoted tiles in place (colour and id are kept).
pub fn apply_promotions(board: &mut Board, promotions: &[Promotion]) {
    for p in promotions {
        if let Some(tile) = board.tile_at(p.at) {
            board.set(p.at, Cell::Filled(tile.with_special(p.special)));
        }
    }
}
