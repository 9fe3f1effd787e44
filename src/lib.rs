//! Eclipse Tiles engine: an 8x8 match-3 board with specials, cascades and level rules.
//!
//! The engine is synchronous and I/O free. A front end starts a [`Game`], feeds it
//! swaps, clicks or swipes, and replays the [`Frame`]s of each [`InteractionReport`]
//! with its own timing before calling [`Game::finish_playback`].

pub mod activation;
pub mod audio;
pub mod board;
pub mod cascade;
pub mod error;
pub mod gravity;
pub mod level;
pub mod matcher;
pub mod progress;
pub mod scoring;
pub mod session;
pub mod special;
pub mod tile;

pub use audio::{AudioCue, BellSink, CueSink, SilentSink};
pub use board::{Board, Cell, Direction, GRID_SIZE, Position};
pub use cascade::{Frame, InteractionOutcome, InteractionReport, Phase};
pub use error::{EngineError, LayoutError, ProgressError};
pub use level::{LevelPhase, Resolution, TOTAL_LEVELS};
pub use progress::{Progress, ProgressStore};
pub use scoring::Feedback;
pub use session::{Game, Selection, SessionState};
pub use tile::{Dealer, Dice, RngDice, ScriptedDice, Special, Tile, TileColor, TileId};
