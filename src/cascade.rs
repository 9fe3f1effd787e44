//! Cascade resolver: one interaction, from the swap to a stable board.
//!
//! The resolver is synchronous. Instead of pausing between phases it records a
//! [`Frame`] after every board transformation (swap, clear, drop, refill, ...);
//! the front end replays them with its own timing.

use crate::activation::{self, Detonation};
use crate::audio::AudioCue;
use crate::board::{Board, Position};
use crate::gravity::{drop_tiles, fill_empty_tiles};
use crate::level::Resolution;
use crate::matcher::{MatchGroup, find_all_matches};
use crate::scoring::{Feedback, feedback_for_round, round_score};
use crate::special::{Promotion, apply_promotions, plan_clears};
use crate::tile::Dealer;
use tracing::{debug, warn};

/// Hard stop for the cascade loop. Only reachable with dice that keep dealing runs.
pub const MAX_CASCADE_ROUNDS: u32 = 200;

/// Which transformation produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Swapped,
    Reverted,
    Detonated,
    Cleared,
    Dropped,
    Refilled,
}

/// Board snapshot after one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub phase: Phase,
    pub board: Board,
    /// Live cascade round (0 outside the matching loop).
    pub combo: u32,
    /// Cells emptied by this phase (`Cleared` / `Detonated` only).
    pub cleared: Vec<Position>,
}

/// Log entry for one detect/score/clear/drop/refill round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub combo: u32,
    pub groups: Vec<MatchGroup>,
    pub promotions: Vec<Promotion>,
    pub cleared: usize,
    pub points: u32,
    pub feedback: Feedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionOutcome {
    /// No match and no special: the swap was undone.
    #[default]
    Invalid,
    Matched,
    Detonated(Detonation),
}

/// Everything the caller needs to render, play and score one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionReport {
    pub outcome: InteractionOutcome,
    pub frames: Vec<Frame>,
    pub rounds: Vec<RoundReport>,
    pub score_delta: u32,
    /// Highest cascade round reached.
    pub combo_peak: u32,
    pub feedback: Vec<Feedback>,
    pub cues: Vec<AudioCue>,
    pub move_consumed: bool,
    /// Set when this interaction ended the level.
    pub resolution: Option<Resolution>,
}

impl InteractionReport {
    pub fn board_states(&self) -> impl Iterator<Item = &Board> {
        self.frames.iter().map(|f| &f.board)
    }

    pub fn is_invalid(&self) -> bool {
        self.outcome == InteractionOutcome::Invalid
    }

    fn push_frame(&mut self, phase: Phase, board: &Board, combo: u32, cleared: Vec<Position>) {
        self.frames.push(Frame {
            phase,
            board: board.clone(),
            combo,
            cleared,
        });
    }
}

/// Swap `a` and `b` and resolve everything that follows.
/// Callers check bounds and adjacency first. Returns the final board and the report;
/// for an invalid move the returned board equals `board`.
pub fn resolve_interaction(
    board: &Board,
    a: Position,
    b: Position,
    dealer: &mut Dealer,
) -> (Board, InteractionReport) {
    let mut report = InteractionReport::default();
    report.cues.push(AudioCue::Swipe);

    let swapped = board.swapped(a, b);
    report.push_frame(Phase::Swapped, &swapped, 0, Vec::new());

    if let Some(detonation) = activation::detect(&swapped, a, b) {
        let next = detonate(swapped, detonation, dealer, &mut report);
        let next = run_cascade(next, dealer, &mut report);
        report.outcome = InteractionOutcome::Detonated(detonation);
        report.move_consumed = true;
        return (next, report);
    }

    if find_all_matches(&swapped).is_empty() {
        debug!(%a, %b, "swap made no match; reverting");
        report.cues.push(AudioCue::Invalid);
        report.push_frame(Phase::Reverted, board, 0, Vec::new());
        return (board.clone(), report);
    }

    let next = run_cascade(swapped, dealer, &mut report);
    report.outcome = InteractionOutcome::Matched;
    report.move_consumed = true;
    (next, report)
}

/// Clear the blast, score it, then drop and refill. The follow-up cascade is the caller's.
fn detonate(
    mut board: Board,
    detonation: Detonation,
    dealer: &mut Dealer,
    report: &mut InteractionReport,
) -> Board {
    let blast = detonation.blast(&board);
    let points = detonation.points(blast.len());
    debug!(?detonation, cleared = blast.len(), points, "detonation");

    report.cues.push(AudioCue::Explosion);
    report.feedback.push(detonation.feedback());
    report.score_delta += points;

    board.clear(&blast);
    report.push_frame(Phase::Detonated, &board, 0, blast.into_iter().collect());
    let board = drop_tiles(&board);
    report.push_frame(Phase::Dropped, &board, 0, Vec::new());
    let board = fill_empty_tiles(&board, dealer);
    report.push_frame(Phase::Refilled, &board, 0, Vec::new());
    board
}

/// Detect, promote, score, clear, drop and refill until no run is left.
/// The combo counts rounds from 1 within this call.
pub fn run_cascade(mut board: Board, dealer: &mut Dealer, report: &mut InteractionReport) -> Board {
    let mut combo = 0;
    loop {
        let groups = find_all_matches(&board);
        if groups.is_empty() {
            break;
        }
        if combo >= MAX_CASCADE_ROUNDS {
            warn!(combo, "cascade did not settle; stopping");
            break;
        }
        combo += 1;
        if combo > 1 {
            report.cues.push(AudioCue::Combo(combo));
        }

        let plan = plan_clears(&groups);
        apply_promotions(&mut board, &plan.promotions);

        let feedback = feedback_for_round(plan.max_group, combo, || dealer.coin());
        report.cues.push(AudioCue::Match);
        let points = round_score(plan.clear.len(), dealer.jitter(), combo);
        debug!(
            combo,
            groups = groups.len(),
            cleared = plan.clear.len(),
            promoted = plan.promotions.len(),
            points,
            "cascade round"
        );

        board.clear(&plan.clear);
        report.push_frame(Phase::Cleared, &board, combo, plan.clear.iter().copied().collect());
        board = drop_tiles(&board);
        report.push_frame(Phase::Dropped, &board, combo, Vec::new());
        board = fill_empty_tiles(&board, dealer);
        report.push_frame(Phase::Refilled, &board, combo, Vec::new());

        report.score_delta += points;
        report.combo_peak = report.combo_peak.max(combo);
        report.feedback.push(feedback);
        report.rounds.push(RoundReport {
            combo,
            groups,
            promotions: plan.promotions,
            cleared: plan.clear.len(),
            points,
            feedback,
        });
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GRID_SIZE;
    use crate::matcher::is_stable;
    use crate::tile::{ScriptedDice, Special, TileColor};

    fn setup(rows: [&str; GRID_SIZE], dice: ScriptedDice) -> (Board, Dealer) {
        let mut dealer = Dealer::new(dice);
        let board = Board::from_rows(&rows, &mut dealer).unwrap();
        (board, dealer)
    }

    // Diagonal five-colour pattern: no runs anywhere.
    const CALM: [&str; GRID_SIZE] = [
        "RBGYPRBG", "BGYPRBGY", "GYPRBGYP", "YPRBGYPR", "PRBGYPRB", "RBGYPRBG", "BGYPRBGY",
        "GYPRBGYP",
    ];

    #[test]
    fn test_invalid_swap_restores_board() {
        let (board, mut dealer) = setup(CALM, ScriptedDice::default());
        let (after, report) =
            resolve_interaction(&board, Position::new(0, 0), Position::new(0, 1), &mut dealer);
        assert_eq!(after, board);
        assert!(report.is_invalid());
        assert!(!report.move_consumed);
        assert_eq!(report.score_delta, 0);
        let phases: Vec<Phase> = report.frames.iter().map(|f| f.phase).collect();
        assert_eq!(phases, vec![Phase::Swapped, Phase::Reverted]);
        assert_eq!(report.cues, vec![AudioCue::Swipe, AudioCue::Invalid]);
    }

    #[test]
    fn test_simple_match_scores_and_settles() {
        let mut rows = CALM;
        rows[0] = "RBYPYRBG";
        rows[1] = "BGPYRBGY";
        let (board, mut dealer) = setup(rows, ScriptedDice::default().with_jitter(2));
        assert!(is_stable(&board));
        // (0,3) P <-> (1,3) Y gives row 0 = R B Y Y Y R B G.
        let (after, report) =
            resolve_interaction(&board, Position::new(0, 3), Position::new(1, 3), &mut dealer);
        assert_eq!(report.outcome, InteractionOutcome::Matched);
        assert!(report.move_consumed);
        let first = &report.rounds[0];
        assert_eq!(first.combo, 1);
        assert_eq!(first.cleared, 3);
        assert_eq!(first.points, 3 * (5 + 2));
        assert_eq!(first.feedback, Feedback::Great);
        assert!(is_stable(&after));
        assert_eq!(after.count_empty(), 0);
        assert_eq!(report.combo_peak as usize, report.rounds.len());
    }

    #[test]
    fn test_four_run_leaves_row_clear_behind() {
        let mut rows = CALM;
        rows[0] = "GGPGPRBG";
        rows[1] = "BGGPRBGY";
        let (board, mut dealer) = setup(rows, ScriptedDice::default());
        assert!(is_stable(&board));
        // (0,2) P <-> (1,2) G gives row 0 = G G G G P ...
        let (after, report) =
            resolve_interaction(&board, Position::new(0, 2), Position::new(1, 2), &mut dealer);
        let first = &report.rounds[0];
        assert_eq!(first.cleared, 3);
        assert_eq!(
            first.promotions,
            vec![Promotion {
                at: Position::new(0, 3),
                special: Special::RowClear
            }]
        );
        assert_eq!(first.feedback, Feedback::Awesome);
        // The refill around it makes no new run, so the promoted tile survives.
        assert_eq!(
            after.tile_at(Position::new(0, 3)).map(|t| t.special),
            Some(Special::RowClear)
        );
    }

    #[test]
    fn test_color_bomb_clears_target_colour_and_itself() {
        let rows = [
            "3RBGYPBG", "BGYPRBGY", "GYPRBGYP", "YPRBGYPR", "PRBGYPRB", "RBGYPRBG", "BGYPRBGY",
            "GYPRBGYP",
        ];
        let (board, mut dealer) = setup(rows, ScriptedDice::default());
        let reds = board.count_color(TileColor::Red);
        // Bomb at (0,0) swaps with the red tile at (0,1); the bomb lands on (0,1).
        let (_, report) =
            resolve_interaction(&board, Position::new(0, 0), Position::new(0, 1), &mut dealer);
        match report.outcome {
            InteractionOutcome::Detonated(Detonation::ColorBomb { bomb, target }) => {
                assert_eq!(bomb, Position::new(0, 1));
                assert_eq!(target, TileColor::Red);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        let blast = &report.frames[1];
        assert_eq!(blast.phase, Phase::Detonated);
        assert_eq!(blast.cleared.len(), reds + 1);
        assert_eq!(report.feedback[0], Feedback::Perfect);
        assert!(report.cues.contains(&AudioCue::Explosion));
        assert!(report.move_consumed);
        let detonation_points = ((reds + 1) * 15) as u32;
        let round_points: u32 = report.rounds.iter().map(|r| r.points).sum();
        assert_eq!(report.score_delta, detonation_points + round_points);
    }

    #[test]
    fn test_frames_follow_phase_order() {
        let mut rows = CALM;
        rows[0] = "RBYPYRBG";
        rows[1] = "BGPYRBGY";
        let (board, mut dealer) = setup(rows, ScriptedDice::default());
        let (_, report) =
            resolve_interaction(&board, Position::new(0, 3), Position::new(1, 3), &mut dealer);
        let phases: Vec<Phase> = report.frames.iter().map(|f| f.phase).collect();
        assert_eq!(phases[0], Phase::Swapped);
        for chunk in phases[1..].chunks(3) {
            assert_eq!(chunk, [Phase::Cleared, Phase::Dropped, Phase::Refilled]);
        }
    }
}
