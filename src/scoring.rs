//! Scoring and feedback tiers for cascade rounds and detonations.

/// Points per cleared tile before jitter.
pub const BASE_POINTS: u32 = 5;
/// Cascade round from which the 3/2 multiplier applies.
pub const MULTIPLIER_FROM_COMBO: u32 = 3;
/// Points per tile cleared by a colour bomb.
pub const COLOR_BOMB_POINTS: u32 = 15;
/// Points per tile cleared by a row-clear.
pub const ROW_CLEAR_POINTS: u32 = 10;

/// `cleared * (BASE_POINTS + jitter)`, times 1.5 (floored) from the third cascade round on.
pub fn round_score(cleared: usize, jitter: u32, combo: u32) -> u32 {
    let base = cleared as u32 * (BASE_POINTS + jitter);
    if combo >= MULTIPLIER_FROM_COMBO {
        base * 3 / 2
    } else {
        base
    }
}

/// On-screen message shown for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    Great,
    Awesome,
    Perfect,
    Wow,
    GoodJob,
}

impl Feedback {
    pub fn label(self) -> &'static str {
        match self {
            Self::Great => "Great!",
            Self::Awesome => "Awesome!",
            Self::Perfect => "Perfect!",
            Self::Wow => "Wow!",
            Self::GoodJob => "Good Job!",
        }
    }
}

/// Exactly one message per round, first matching tier wins.
/// `coin` is only flipped for the mid tier (second cascade round with small groups).
pub fn feedback_for_round(max_group: usize, combo: u32, coin: impl FnOnce() -> bool) -> Feedback {
    if max_group >= 5 || combo >= 4 {
        Feedback::Perfect
    } else if max_group >= 4 || combo >= 3 {
        Feedback::Awesome
    } else if combo >= 2 {
        if coin() { Feedback::GoodJob } else { Feedback::Wow }
    } else {
        Feedback::Great
    }
}
