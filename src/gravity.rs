//! Gravity and refill: compact tiles downward, then deal new tiles into the gaps.

use crate::board::{Board, Cell, GRID_SIZE, Position};
use crate::matcher::completes_run;
use crate::tile::Dealer;
use tracing::debug;

/// Redraws allowed per refilled cell before the last draw is kept anyway.
pub const REFILL_ATTEMPTS: u32 = 50;
/// Redraws allowed per cell when building a fresh board.
pub const INITIAL_ATTEMPTS: u32 = 100;

/// Per column, move every tile down past the empty cells below it, keeping order.
/// Emptied cells end up at the top.
pub fn drop_tiles(board: &Board) -> Board {
    let mut next = board.clone();
    for col in 0..GRID_SIZE {
        let mut write = GRID_SIZE;
        for row in (0..GRID_SIZE).rev() {
            let pos = Position::new(row, col);
            if let Some(Cell::Filled(tile)) = board.get(pos) {
                write -= 1;
                next.set(pos, Cell::Empty);
                next.set(Position::new(write, col), Cell::Filled(tile));
            }
        }
    }
    next
}

/// Fill every empty cell, column by column from the top, avoiding new runs
/// for up to [`REFILL_ATTEMPTS`] draws per cell.
pub fn fill_empty_tiles(board: &Board, dealer: &mut Dealer) -> Board {
    let mut next = board.clone();
    for col in 0..GRID_SIZE {
        for row in 0..GRID_SIZE {
            let pos = Position::new(row, col);
            if next.get(pos).is_some_and(|c| c.is_empty()) {
                place_with_retry(&mut next, pos, dealer, REFILL_ATTEMPTS);
            }
        }
    }
    next
}

/// Fresh board in row-major order with the [`INITIAL_ATTEMPTS`] retry bound.
pub fn initialize_board(dealer: &mut Dealer) -> Board {
    let mut board = Board::empty();
    for pos in Board::positions() {
        place_with_retry(&mut board, pos, dealer, INITIAL_ATTEMPTS);
    }
    board
}

/// Deal into `pos` until the tile completes no run or `attempts` draws are spent.
/// The last draw is accepted either way; returns false in that escape case.
fn place_with_retry(board: &mut Board, pos: Position, dealer: &mut Dealer, attempts: u32) -> bool {
    for _ in 0..attempts.max(1) {
        let tile = dealer.deal();
        board.set(pos, Cell::Filled(tile));
        if !completes_run(board, pos, tile.color) {
            return true;
        }
    }
    debug!(%pos, attempts, "retry bound reached; accepting a matching tile");
    false
}
