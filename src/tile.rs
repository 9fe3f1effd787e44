//! Tiles: colours, special kinds, identity tokens, and the dice used to deal them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::fmt;

/// Score jitter is drawn uniformly from `0..JITTER_RANGE`.
pub const JITTER_RANGE: u32 = 6;

/// The five tile colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

impl TileColor {
    pub const ALL: [Self; 5] = [Self::Red, Self::Blue, Self::Green, Self::Yellow, Self::Purple];

    /// Palette index 0..5 (used by the theme).
    pub fn index(self) -> u8 {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
            Self::Green => 2,
            Self::Yellow => 3,
            Self::Purple => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
        }
    }

    /// Single-letter symbol used by board layouts and `Display`.
    pub fn symbol(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Blue => 'B',
            Self::Green => 'G',
            Self::Yellow => 'Y',
            Self::Purple => 'P',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|color| color.symbol() == c.to_ascii_uppercase())
    }
}

/// Board-altering power carried by a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Special {
    #[default]
    None,
    /// Clears its whole row when swapped.
    RowClear,
    /// Clears every tile of the swap partner's colour when swapped.
    ColorBomb,
}

/// Opaque identity token; lets a renderer follow a tile across moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u64);

impl TileId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub color: TileColor,
    pub special: Special,
    pub id: TileId,
}

impl Tile {
    pub fn is_special(&self) -> bool {
        self.special != Special::None
    }

    pub fn with_special(mut self, special: Special) -> Self {
        self.special = special;
        self
    }
}

/// Source of every random draw the engine makes.
pub trait Dice {
    /// Uniform over [`TileColor::ALL`].
    fn color(&mut self) -> TileColor;
    /// Uniform in `0..JITTER_RANGE`.
    fn jitter(&mut self) -> u32;
    /// Fair coin, used to pick between the two mid-tier feedback messages.
    fn coin(&mut self) -> bool;
}

/// Adapts any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngDice<R>(pub R);

impl<R: Rng> Dice for RngDice<R> {
    fn color(&mut self) -> TileColor {
        TileColor::ALL[self.0.random_range(0..TileColor::ALL.len())]
    }

    fn jitter(&mut self) -> u32 {
        self.0.random_range(0..JITTER_RANGE)
    }

    fn coin(&mut self) -> bool {
        self.0.random_bool(0.5)
    }
}

/// Replays a fixed colour sequence, then cycles through the palette in order.
/// Jitter and coin are constant. Deterministic boards for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    colors: VecDeque<TileColor>,
    cycle: usize,
    jitter: u32,
    coin: bool,
}

impl ScriptedDice {
    pub fn new(colors: impl IntoIterator<Item = TileColor>) -> Self {
        Self {
            colors: colors.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_jitter(mut self, jitter: u32) -> Self {
        self.jitter = jitter.min(JITTER_RANGE - 1);
        self
    }

    pub fn with_coin(mut self, coin: bool) -> Self {
        self.coin = coin;
        self
    }
}

impl Dice for ScriptedDice {
    fn color(&mut self) -> TileColor {
        self.colors.pop_front().unwrap_or_else(|| {
            let color = TileColor::ALL[self.cycle % TileColor::ALL.len()];
            self.cycle += 1;
            color
        })
    }

    fn jitter(&mut self) -> u32 {
        self.jitter
    }

    fn coin(&mut self) -> bool {
        self.coin
    }
}

/// Owns the dice and the tile-id counter; every tile the engine creates comes from here.
pub struct Dealer {
    dice: Box<dyn Dice>,
    next_id: u64,
}

impl Dealer {
    pub fn new(dice: impl Dice + 'static) -> Self {
        Self {
            dice: Box::new(dice),
            next_id: 1,
        }
    }

    /// Reproducible games from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(RngDice(StdRng::seed_from_u64(seed)))
    }

    pub fn from_entropy() -> Self {
        Self::new(RngDice(StdRng::from_os_rng()))
    }

    pub fn scripted(colors: impl IntoIterator<Item = TileColor>) -> Self {
        Self::new(ScriptedDice::new(colors))
    }

    /// New tile with a random colour.
    pub fn deal(&mut self) -> Tile {
        let color = self.dice.color();
        self.tile(color)
    }

    /// New plain tile of the given colour with a fresh id.
    pub fn tile(&mut self, color: TileColor) -> Tile {
        let id = TileId(self.next_id);
        self.next_id += 1;
        Tile {
            color,
            special: Special::None,
            id,
        }
    }

    pub fn jitter(&mut self) -> u32 {
        self.dice.jitter().min(JITTER_RANGE - 1)
    }

    pub fn coin(&mut self) -> bool {
        self.dice.coin()
    }

    /// Number of tiles created so far.
    pub fn issued(&self) -> u64 {
        self.next_id - 1
    }
}

impl fmt::Debug for Dealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dealer")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut dealer = Dealer::seeded(7);
        let a = dealer.deal();
        let b = dealer.deal();
        let c = dealer.tile(TileColor::Red);
        assert!(a.id < b.id && b.id < c.id);
        assert_eq!(dealer.issued(), 3);
    }

    #[test]
    fn test_scripted_dice_replays_then_cycles() {
        let mut dice = ScriptedDice::new([TileColor::Purple, TileColor::Purple]);
        assert_eq!(dice.color(), TileColor::Purple);
        assert_eq!(dice.color(), TileColor::Purple);
        assert_eq!(dice.color(), TileColor::Red);
        assert_eq!(dice.color(), TileColor::Blue);
    }

    #[test]
    fn test_jitter_is_clamped() {
        let mut dealer = Dealer::new(ScriptedDice::default().with_jitter(99));
        assert_eq!(dealer.jitter(), JITTER_RANGE - 1);
    }

    #[test]
    fn test_seeded_dice_stay_in_range() {
        let mut dice = RngDice(StdRng::seed_from_u64(42));
        for _ in 0..500 {
            assert!(dice.jitter() < JITTER_RANGE);
        }
    }

    #[test]
    fn test_symbol_round_trip_is_case_insensitive() {
        assert_eq!(TileColor::from_symbol('g'), Some(TileColor::Green));
        assert_eq!(TileColor::from_symbol('x'), None);
    }
}
