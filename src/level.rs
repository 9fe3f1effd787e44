//! Level rules: move budget, star thresholds, and win/lose resolution.

/// Highest playable level.
pub const TOTAL_LEVELS: u32 = 1500;

/// Clamp a requested level into `1..=TOTAL_LEVELS`.
pub fn clamp_level(level: u32) -> u32 {
    level.clamp(1, TOTAL_LEVELS)
}

/// `max(15, 30 - level / 25)`.
pub fn move_budget(level: u32) -> u32 {
    30u32.saturating_sub(level / 25).max(15)
}

/// Score cutoffs for one, two and three stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarThresholds {
    pub one: u32,
    pub two: u32,
    pub three: u32,
}

impl StarThresholds {
    /// Highest threshold met by `score` (0 if none).
    pub fn stars_for(&self, score: u32) -> u8 {
        if score >= self.three {
            3
        } else if score >= self.two {
            2
        } else if score >= self.one {
            1
        } else {
            0
        }
    }
}

pub fn star_thresholds(level: u32) -> StarThresholds {
    StarThresholds {
        one: 100 + 10 * level,
        two: 200 + 15 * level,
        three: 300 + 25 * level,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelPhase {
    #[default]
    Playing,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub phase: LevelPhase,
    pub earned_stars: u8,
}

/// The level ends when moves run out or three stars are reached;
/// it is won with at least one star.
pub fn resolve(level: u32, score: u32, moves_remaining: u32) -> Resolution {
    let earned_stars = star_thresholds(level).stars_for(score);
    let phase = if moves_remaining == 0 || earned_stars == 3 {
        if earned_stars >= 1 {
            LevelPhase::Won
        } else {
            LevelPhase::Lost
        }
    } else {
        LevelPhase::Playing
    };
    Resolution {
        phase,
        earned_stars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_budget() {
        assert_eq!(move_budget(1), 30);
        assert_eq!(move_budget(24), 30);
        assert_eq!(move_budget(25), 29);
        assert_eq!(move_budget(374), 16);
        assert_eq!(move_budget(375), 15);
        assert_eq!(move_budget(TOTAL_LEVELS), 15);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(
            star_thresholds(1),
            StarThresholds {
                one: 110,
                two: 215,
                three: 325
            }
        );
        let t = star_thresholds(10);
        assert_eq!(t.stars_for(199), 0);
        assert_eq!(t.stars_for(200), 1);
        assert_eq!(t.stars_for(350), 2);
        assert_eq!(t.stars_for(550), 3);
    }

    #[test]
    fn test_resolution() {
        assert_eq!(
            resolve(1, 110, 0),
            Resolution {
                phase: LevelPhase::Won,
                earned_stars: 1
            }
        );
        assert_eq!(resolve(1, 0, 0).phase, LevelPhase::Lost);
        assert_eq!(resolve(1, 215, 4).phase, LevelPhase::Playing);
        assert_eq!(resolve(1, 325, 4).phase, LevelPhase::Won);
    }

    #[test]
    fn test_clamp_level() {
        assert_eq!(clamp_level(0), 1);
        assert_eq!(clamp_level(9000), TOTAL_LEVELS);
        assert_eq!(clamp_level(42), 42);
    }
}
