//! Board model: fixed 8x8 grid of cells, positions, adjacency and pure swaps.

use crate::error::LayoutError;
use crate::tile::{Dealer, Special, Tile, TileColor};
use std::fmt;

/// Rows and columns; the grid never changes size.
pub const GRID_SIZE: usize = 8;

/// (row, col); row 0 is the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[inline]
    pub fn in_bounds(self) -> bool {
        self.row < GRID_SIZE && self.col < GRID_SIZE
    }

    /// Manhattan distance exactly 1.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// Neighbour in `dir`, or None when it would leave the grid.
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (row, col) = match dir {
            Direction::Up => (self.row.checked_sub(1)?, self.col),
            Direction::Down => (self.row + 1, self.col),
            Direction::Left => (self.row, self.col.checked_sub(1)?),
            Direction::Right => (self.row, self.col + 1),
        };
        let next = Self::new(row, col);
        next.in_bounds().then_some(next)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Single cell: either empty or holding a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Tile),
}

impl Cell {
    #[inline]
    pub fn tile(&self) -> Option<&Tile> {
        match self {
            Self::Filled(tile) => Some(tile),
            Self::Empty => None,
        }
    }

    #[inline]
    pub fn color(&self) -> Option<TileColor> {
        self.tile().map(|t| t.color)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// The grid. `rows[r][c]`, rows[0] is top.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    rows: [[Cell; GRID_SIZE]; GRID_SIZE],
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a board from text rows, one char per cell:
    /// `R B G Y P` plain tiles, lowercase for a row-clear tile of that colour,
    /// `1`..`5` for a colour bomb (palette order), `.` for an empty cell.
    pub fn from_rows(rows: &[&str], dealer: &mut Dealer) -> Result<Self, LayoutError> {
        if rows.len() != GRID_SIZE {
            return Err(LayoutError::RowCount {
                expected: GRID_SIZE,
                found: rows.len(),
            });
        }
        let mut board = Self::empty();
        for (row, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.len() != GRID_SIZE {
                return Err(LayoutError::RowLength {
                    row,
                    expected: GRID_SIZE,
                    found: symbols.len(),
                });
            }
            for (col, symbol) in symbols.into_iter().enumerate() {
                board.rows[row][col] = parse_symbol(symbol, dealer)
                    .ok_or(LayoutError::Symbol { symbol, row, col })?;
            }
        }
        Ok(board)
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<Cell> {
        if !pos.in_bounds() {
            return None;
        }
        Some(self.rows[pos.row][pos.col])
    }

    #[inline]
    pub fn tile_at(&self, pos: Position) -> Option<Tile> {
        self.get(pos).and_then(|c| c.tile().copied())
    }

    #[inline]
    pub fn color_at(&self, pos: Position) -> Option<TileColor> {
        self.get(pos).and_then(|c| c.color())
    }

    /// Returns false (and does nothing) when `pos` is outside the grid.
    #[inline]
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        if !pos.in_bounds() {
            return false;
        }
        self.rows[pos.row][pos.col] = cell;
        true
    }

    /// Independent copy with the two cells exchanged; `self` is untouched.
    pub fn swapped(&self, a: Position, b: Position) -> Self {
        let mut next = self.clone();
        if a.in_bounds() && b.in_bounds() {
            next.rows[a.row][a.col] = self.rows[b.row][b.col];
            next.rows[b.row][b.col] = self.rows[a.row][a.col];
        }
        next
    }

    /// Empty every listed cell.
    pub fn clear<'a>(&mut self, positions: impl IntoIterator<Item = &'a Position>) {
        for &pos in positions {
            self.set(pos, Cell::Empty);
        }
    }

    /// Every position in row-major order.
    pub fn positions() -> impl Iterator<Item = Position> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Position::new(row, col)))
    }

    /// Positions holding a tile, with the tile.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        Self::positions().filter_map(|pos| self.tile_at(pos).map(|t| (pos, t)))
    }

    pub fn count_empty(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_empty()).count()
    }

    pub fn count_color(&self, color: TileColor) -> usize {
        self.tiles().filter(|(_, t)| t.color == color).count()
    }

    pub fn rows(&self) -> &[[Cell; GRID_SIZE]; GRID_SIZE] {
        &self.rows
    }
}

fn parse_symbol(symbol: char, dealer: &mut Dealer) -> Option<Cell> {
    if symbol == '.' {
        return Some(Cell::Empty);
    }
    if let Some(digit) = symbol.to_digit(10) {
        let color = *TileColor::ALL.get((digit as usize).checked_sub(1)?)?;
        return Some(Cell::Filled(dealer.tile(color).with_special(Special::ColorBomb)));
    }
    let color = TileColor::from_symbol(symbol)?;
    let tile = dealer.tile(color);
    if symbol.is_ascii_lowercase() {
        Some(Cell::Filled(tile.with_special(Special::RowClear)))
    } else {
        Some(Cell::Filled(tile))
    }
}

fn cell_symbol(cell: Cell) -> char {
    match cell {
        Cell::Empty => '.',
        Cell::Filled(tile) => match tile.special {
            Special::None => tile.color.symbol(),
            Special::RowClear => tile.color.symbol().to_ascii_lowercase(),
            Special::ColorBomb => char::from(b'1' + tile.color.index()),
        },
    }
}

/// Same text format as `from_rows`, one row per line.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: String = row.iter().map(|&c| cell_symbol(c)).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

pub fn is_adjacent(a: Position, b: Position) -> bool {
    a.is_adjacent(b)
}

/// Pure swap; see [`Board::swapped`].
pub fn swap(board: &Board, a: Position, b: Position) -> Board {
    board.swapped(a, b)
}
