//! Session state and the engine facade the front end drives.

use crate::audio::AudioCue;
use crate::board::{Board, Direction, Position};
use crate::cascade::{InteractionReport, resolve_interaction};
use crate::error::EngineError;
use crate::gravity::initialize_board;
use crate::level::{self, LevelPhase, Resolution, StarThresholds, clamp_level, move_budget, star_thresholds};
use crate::tile::Dealer;
use tracing::{debug, info};

/// Everything that describes one level in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub level: u32,
    pub board: Board,
    pub selected: Option<Position>,
    pub score: u32,
    pub moves_remaining: u32,
    /// Peak cascade round of the interaction being played back; 0 once playback finishes.
    pub combo_count: u32,
    pub phase: LevelPhase,
}

impl SessionState {
    fn fresh(level: u32, board: Board) -> Self {
        Self {
            level,
            board,
            selected: None,
            score: 0,
            moves_remaining: move_budget(level),
            combo_count: 0,
            phase: LevelPhase::Playing,
        }
    }
}

/// Result of a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Nothing was selected, or the cell was not adjacent: it is now the selection.
    Selected(Position),
    /// The cell was adjacent to the selection and the swap was resolved.
    Interacted(InteractionReport),
}

impl Selection {
    pub fn cues(&self) -> &[AudioCue] {
        match self {
            Self::Selected(_) => &[AudioCue::Select],
            Self::Interacted(report) => &report.cues,
        }
    }
}

/// One level being played: state, dice and the playback latch.
#[derive(Debug)]
pub struct Game {
    state: SessionState,
    dealer: Dealer,
    busy: bool,
}

impl Game {
    /// Fresh session with a stable board. Out-of-range levels are clamped.
    pub fn start_level(level: u32, mut dealer: Dealer) -> Self {
        let level = clamp_level(level);
        let board = initialize_board(&mut dealer);
        info!(level, moves = move_budget(level), "level started");
        Self {
            state: SessionState::fresh(level, board),
            dealer,
            busy: false,
        }
    }

    /// Session on a prepared board (puzzles and tests).
    pub fn with_board(level: u32, board: Board, dealer: Dealer) -> Self {
        Self {
            state: SessionState::fresh(clamp_level(level), board),
            dealer,
            busy: false,
        }
    }

    /// Replace the session with a fresh one for `level`, keeping the dice.
    pub fn start(&mut self, level: u32) {
        let level = clamp_level(level);
        let board = initialize_board(&mut self.dealer);
        info!(level, moves = move_budget(level), "level started");
        self.state = SessionState::fresh(level, board);
        self.busy = false;
    }

    pub fn restart(&mut self) {
        self.start(self.state.level);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn thresholds(&self) -> StarThresholds {
        star_thresholds(self.state.level)
    }

    pub fn resolution(&self) -> Resolution {
        Resolution {
            phase: self.state.phase,
            earned_stars: self.thresholds().stars_for(self.state.score),
        }
    }

    /// True from an interaction that produced frames until [`Game::finish_playback`].
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Front end is done replaying the last report.
    pub fn finish_playback(&mut self) {
        self.busy = false;
        self.state.combo_count = 0;
    }

    fn check_accepting(&self) -> Result<(), EngineError> {
        if self.state.phase != LevelPhase::Playing {
            return Err(EngineError::LevelOver);
        }
        if self.busy {
            return Err(EngineError::Busy);
        }
        Ok(())
    }

    /// Swap two adjacent cells and resolve the whole cascade.
    /// Rejections leave the session untouched.
    pub fn request_interaction(
        &mut self,
        a: Position,
        b: Position,
    ) -> Result<InteractionReport, EngineError> {
        self.check_accepting()?;
        for pos in [a, b] {
            if !pos.in_bounds() {
                return Err(EngineError::OutOfBounds(pos));
            }
        }
        if !a.is_adjacent(b) {
            return Err(EngineError::NotAdjacent(a, b));
        }

        self.state.selected = None;
        let (board, mut report) = resolve_interaction(&self.state.board, a, b, &mut self.dealer);
        self.busy = !report.frames.is_empty();
        if !report.move_consumed {
            return Ok(report);
        }

        self.state.board = board;
        self.state.score += report.score_delta;
        self.state.moves_remaining = self.state.moves_remaining.saturating_sub(1);
        self.state.combo_count = report.combo_peak;
        debug!(
            score = self.state.score,
            delta = report.score_delta,
            moves = self.state.moves_remaining,
            "interaction resolved"
        );

        let resolution = level::resolve(self.state.level, self.state.score, self.state.moves_remaining);
        if resolution.phase != LevelPhase::Playing {
            self.state.phase = resolution.phase;
            report.cues.push(if resolution.phase == LevelPhase::Won {
                AudioCue::Win
            } else {
                AudioCue::Lose
            });
            info!(
                level = self.state.level,
                score = self.state.score,
                stars = resolution.earned_stars,
                phase = ?resolution.phase,
                "level over"
            );
            report.resolution = Some(resolution);
        }
        Ok(report)
    }

    /// Click model: select, move the selection, or swap with an adjacent selection.
    pub fn select(&mut self, pos: Position) -> Result<Selection, EngineError> {
        self.check_accepting()?;
        if !pos.in_bounds() {
            return Err(EngineError::OutOfBounds(pos));
        }
        match self.state.selected {
            Some(current) if current.is_adjacent(pos) => {
                let mut report = self.request_interaction(current, pos)?;
                report.cues.insert(0, AudioCue::Select);
                Ok(Selection::Interacted(report))
            }
            _ => {
                self.state.selected = Some(pos);
                Ok(Selection::Selected(pos))
            }
        }
    }

    /// Swap `from` with its neighbour in `dir`.
    pub fn swipe(&mut self, from: Position, dir: Direction) -> Result<InteractionReport, EngineError> {
        self.check_accepting()?;
        if !from.in_bounds() {
            return Err(EngineError::OutOfBounds(from));
        }
        let to = from.step(dir).ok_or(EngineError::OutOfBounds(from))?;
        self.request_interaction(from, to)
    }
}
