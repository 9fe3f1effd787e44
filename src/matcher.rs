//! Match detection: straight runs of 3+ same-coloured tiles in rows and columns.

use crate::board::{Board, GRID_SIZE, Position};
use crate::tile::TileColor;

/// Shortest run that counts as a match.
pub const MIN_RUN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Contiguous collinear run of one colour, cells in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub color: TileColor,
    pub orientation: Orientation,
    pub cells: Vec<Position>,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Scan-order-last cell; this is where a special tile is promoted.
    pub fn last(&self) -> Option<Position> {
        self.cells.last().copied()
    }
}

/// All runs on the board: every row left to right, then every column top to bottom.
/// A tile at an L/T junction shows up in both a horizontal and a vertical group.
pub fn find_all_matches(board: &Board) -> Vec<MatchGroup> {
    let mut groups = Vec::new();
    for row in 0..GRID_SIZE {
        scan_line(board, Orientation::Horizontal, |i| Position::new(row, i), &mut groups);
    }
    for col in 0..GRID_SIZE {
        scan_line(board, Orientation::Vertical, |i| Position::new(i, col), &mut groups);
    }
    groups
}

/// One row or column. After a run is emitted the scan resumes past it,
/// so a segment is never reported twice in the same direction.
fn scan_line(
    board: &Board,
    orientation: Orientation,
    at: impl Fn(usize) -> Position,
    groups: &mut Vec<MatchGroup>,
) {
    let mut start = 0;
    while start + MIN_RUN <= GRID_SIZE {
        let Some(color) = board.color_at(at(start)) else {
            start += 1;
            continue;
        };
        let mut end = start + 1;
        while end < GRID_SIZE && board.color_at(at(end)) == Some(color) {
            end += 1;
        }
        if end - start >= MIN_RUN {
            groups.push(MatchGroup {
                color,
                orientation,
                cells: (start..end).map(&at).collect(),
            });
            start = end;
        } else {
            start += 1;
        }
    }
}

/// True if `color` at `pos` would sit in a run of 3+ in its row or column,
/// counting the current neighbours (the cell itself is assumed to hold `color`).
pub fn completes_run(board: &Board, pos: Position, color: TileColor) -> bool {
    let same = |row: usize, col: usize| board.color_at(Position::new(row, col)) == Some(color);

    let left = (0..pos.col).rev().take_while(|&c| same(pos.row, c)).count();
    let right = (pos.col + 1..GRID_SIZE).take_while(|&c| same(pos.row, c)).count();
    if 1 + left + right >= MIN_RUN {
        return true;
    }
    let up = (0..pos.row).rev().take_while(|&r| same(r, pos.col)).count();
    let down = (pos.row + 1..GRID_SIZE).take_while(|&r| same(r, pos.col)).count();
    1 + up + down >= MIN_RUN
}

/// True if no row or column holds a run of 3+.
pub fn is_stable(board: &Board) -> bool {
    find_all_matches(board).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Dealer;

    fn board(rows: [&str; GRID_SIZE]) -> Board {
        Board::from_rows(&rows, &mut Dealer::seeded(0)).unwrap()
    }

    #[test]
    fn test_single_horizontal_run_of_three() {
        let b = board([
            "BGBGBGBG", "GBGBGBGB", "BGBRRRBG", "GBGBGBGB", "BGBGBGBG", "GBGBGBGB", "BGBGBGBG",
            "GBGBGBGB",
        ]);
        let groups = find_all_matches(&b);
        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.color, TileColor::Red);
        assert_eq!(g.orientation, Orientation::Horizontal);
        assert_eq!(
            g.cells,
            vec![Position::new(2, 3), Position::new(2, 4), Position::new(2, 5)]
        );
    }

    #[test]
    fn test_long_run_reported_once() {
        let b = board([
            "YYYYYYBG", "GBGBGBGB", "BGBGBGBG", "GBGBGBGB", "BGBGBGBG", "GBGBGBGB", "BGBGBGBG",
            "GBGBGBGB",
        ]);
        let groups = find_all_matches(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 6);
        assert_eq!(groups[0].last(), Some(Position::new(0, 5)));
    }

    #[test]
    fn test_l_shape_yields_two_groups_sharing_corner() {
        let b = board([
            "PPPBGBGB", "PGBGBGBG", "PBGBGBGB", "GBGBGBGB", "BGBGBGBG", "GBGBGBGB", "BGBGBGBG",
            "GBGBGBGB",
        ]);
        let groups = find_all_matches(&b);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].orientation, Orientation::Horizontal);
        assert_eq!(groups[1].orientation, Orientation::Vertical);
        assert!(groups[0].cells.contains(&Position::new(0, 0)));
        assert!(groups[1].cells.contains(&Position::new(0, 0)));
    }

    #[test]
    fn test_empty_cells_never_match() {
        let b = board([
            "........", "........", "........", "RR.RR...", "........", "........", "........",
            "........",
        ]);
        assert!(find_all_matches(&b).is_empty());
        assert!(is_stable(&Board::empty()));
    }

    #[test]
    fn test_specials_match_by_colour() {
        let b = board([
            "r1RBGBGB", "GBGBGBGB", "BGBGBGBG", "GBGBGBGB", "BGBGBGBG", "GBGBGBGB", "BGBGBGBG",
            "GBGBGBGB",
        ]);
        let groups = find_all_matches(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn test_completes_run_checks_both_axes() {
        let b = board([
            "RR.BGBGB", "GBGBGBGB", "BGRBGBGB", "GBRBGBGB", "BG.BGBGB", "GBGBGBGB", "BGBGBGBG",
            "GBGBGBGB",
        ]);
        assert!(completes_run(&b, Position::new(0, 2), TileColor::Red));
        assert!(!completes_run(&b, Position::new(0, 2), TileColor::Yellow));
        assert!(completes_run(&b, Position::new(4, 2), TileColor::Red));
        assert!(!completes_run(&b, Position::new(4, 2), TileColor::Blue));
    }
}
