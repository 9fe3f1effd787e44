//! Audio cue vocabulary and sinks. Cues are fire-and-forget: the engine never waits on them.

use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Select,
    Swipe,
    Match,
    Explosion,
    Invalid,
    Win,
    Lose,
    /// Cascade round number (2 and up).
    Combo(u32),
}

impl AudioCue {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Swipe => "swipe",
            Self::Match => "match",
            Self::Explosion => "explosion",
            Self::Invalid => "invalid",
            Self::Win => "win",
            Self::Lose => "lose",
            Self::Combo(_) => "combo",
        }
    }
}

/// Anything that can play cues.
pub trait CueSink {
    fn play(&mut self, cue: AudioCue);
}

/// Plays nothing; cues only reach the debug log.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl CueSink for SilentSink {
    fn play(&mut self, cue: AudioCue) {
        debug!(cue = cue.tag(), "audio cue");
    }
}

/// Rings the terminal bell for the loud cues (explosion, win, lose).
#[derive(Debug)]
pub struct BellSink<W: Write> {
    out: W,
}

impl<W: Write> BellSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CueSink for BellSink<W> {
    fn play(&mut self, cue: AudioCue) {
        debug!(cue = cue.tag(), "audio cue");
        if matches!(cue, AudioCue::Explosion | AudioCue::Win | AudioCue::Lose) {
            // Output errors are ignored; a missed bell never affects the game.
            let _ = self.out.write_all(b"\x07").and_then(|()| self.out.flush());
        }
    }
}
