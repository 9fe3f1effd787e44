//! Engine tests - board rules, specials, cascades and level resolution through the public API

use eclipse_tiles::cascade::resolve_interaction;
use eclipse_tiles::gravity::{fill_empty_tiles, initialize_board};
use eclipse_tiles::level::{LevelPhase, resolve};
use eclipse_tiles::matcher::{find_all_matches, is_stable};
use eclipse_tiles::special::plan_clears;
use eclipse_tiles::{
    AudioCue, Board, Dealer, Direction, EngineError, Feedback, GRID_SIZE, Game, InteractionOutcome,
    Phase, Position, ScriptedDice, Special, TileColor,
};

const CALM: [&str; GRID_SIZE] = [
    "RBGYPRBG", "BGYPRBGY", "GYPRBGYP", "YPRBGYPR", "PRBGYPRB", "RBGYPRBG", "BGYPRBGY", "GYPRBGYP",
];

fn scripted() -> Dealer {
    Dealer::new(ScriptedDice::default())
}

fn board(rows: [&str; GRID_SIZE], dealer: &mut Dealer) -> Board {
    Board::from_rows(&rows, dealer).unwrap()
}

fn game(rows: [&str; GRID_SIZE]) -> Game {
    let mut dealer = scripted();
    let b = board(rows, &mut dealer);
    Game::with_board(1, b, dealer)
}

#[test]
fn test_fresh_and_refilled_boards_have_no_runs() {
    for seed in 0..40 {
        let mut dealer = Dealer::seeded(seed);
        let mut b = initialize_board(&mut dealer);
        assert!(is_stable(&b), "seed {seed}:\n{b}");
        b.clear(&[Position::new(0, 2), Position::new(0, 3), Position::new(0, 7)]);
        let refilled = fill_empty_tiles(&b, &mut dealer);
        assert_eq!(refilled.count_empty(), 0);
        assert!(is_stable(&refilled), "seed {seed}:\n{refilled}");
    }
}

#[test]
fn test_single_run_of_three() {
    let mut rows = CALM;
    rows[2] = "GYPRRRYP";
    let b = board(rows, &mut scripted());
    let groups = find_all_matches(&b);
    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].cells,
        vec![Position::new(2, 3), Position::new(2, 4), Position::new(2, 5)]
    );
    assert_eq!(groups[0].color, TileColor::Red);
    assert!(plan_clears(&groups).promotions.is_empty());
}

#[test]
fn test_swap_into_four_makes_row_clear() {
    let mut rows = CALM;
    rows[0] = "GGPGPRBG";
    rows[1] = "BGGPRBGY";
    let mut g = game(rows);
    let report = g
        .request_interaction(Position::new(0, 2), Position::new(1, 2))
        .unwrap();
    let first = &report.rounds[0];
    assert_eq!(first.cleared, 3);
    assert_eq!(first.promotions[0].at, Position::new(0, 3));
    assert_eq!(first.promotions[0].special, Special::RowClear);
}

#[test]
fn test_swap_into_five_makes_color_bomb() {
    let mut rows = CALM;
    rows[3] = "PPBPPYGR";
    rows[4] = "GRPGYBRB";
    let mut g = game(rows);
    let report = g
        .request_interaction(Position::new(3, 2), Position::new(4, 2))
        .unwrap();
    let first = &report.rounds[0];
    assert_eq!(first.cleared, 4);
    assert_eq!(first.points, 20);
    assert_eq!(first.feedback, Feedback::Perfect);
    assert_eq!(first.promotions[0].at, Position::new(3, 4));
    assert_eq!(first.promotions[0].special, Special::ColorBomb);
    let bomb = g.state().board.tile_at(Position::new(3, 4)).unwrap();
    assert_eq!((bomb.color, bomb.special), (TileColor::Purple, Special::ColorBomb));
}

#[test]
fn test_non_adjacent_swap_is_rejected_untouched() {
    let mut g = game(CALM);
    let before = g.state().clone();
    let err = g
        .request_interaction(Position::new(0, 0), Position::new(1, 1))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::NotAdjacent(Position::new(0, 0), Position::new(1, 1))
    );
    assert_eq!(g.state(), &before);
}

#[test]
fn test_no_match_swap_restores_board() {
    let mut dealer = scripted();
    let b = board(CALM, &mut dealer);
    let (after, report) =
        resolve_interaction(&b, Position::new(4, 4), Position::new(4, 5), &mut dealer);
    assert_eq!(after, b);
    assert_eq!(report.outcome, InteractionOutcome::Invalid);
    assert!(!report.move_consumed);
    assert_eq!(report.frames.last().map(|f| f.phase), Some(Phase::Reverted));
    assert_eq!(report.frames.last().map(|f| &f.board), Some(&b));
}

#[test]
fn test_color_bomb_clears_seven_reds_and_itself() {
    // Exactly seven red tiles; a blue bomb at (7,1) next to the red at (7,0).
    let rows = [
        "BRYPBGYP", "GYPBRYPB", "YPBGYPRG", "PBRYPBGY", "RGYPBGYP", "GYPBGRPB", "YPBGYPBG",
        "R2GYPBGY",
    ];
    let mut g = game(rows);
    assert_eq!(g.state().board.count_color(TileColor::Red), 7);
    let report = g.swipe(Position::new(7, 1), Direction::Left).unwrap();

    let blast = report
        .frames
        .iter()
        .find(|f| f.phase == Phase::Detonated)
        .unwrap();
    assert_eq!(blast.cleared.len(), 8);
    assert_eq!(blast.board.count_color(TileColor::Red), 0);
    let cascade_points: u32 = report.rounds.iter().map(|r| r.points).sum();
    assert_eq!(report.score_delta - cascade_points, 120);
    assert_eq!(g.state().score, report.score_delta);
    assert_eq!(g.state().moves_remaining, 29);
    assert_eq!(report.feedback[0], Feedback::Perfect);
    assert_eq!(report.cues[..2], [AudioCue::Swipe, AudioCue::Explosion]);
}

#[test]
fn test_row_clear_detonates_its_row() {
    let mut rows = CALM;
    rows[5] = "rBGYPRBG";
    let mut g = game(rows);
    let report = g
        .request_interaction(Position::new(5, 0), Position::new(5, 1))
        .unwrap();
    let blast = report
        .frames
        .iter()
        .find(|f| f.phase == Phase::Detonated)
        .unwrap();
    assert_eq!(blast.cleared.len(), GRID_SIZE);
    assert!(blast.cleared.iter().all(|p| p.row == 5));
    let cascade_points: u32 = report.rounds.iter().map(|r| r.points).sum();
    assert_eq!(report.score_delta - cascade_points, 80);
    assert_eq!(report.feedback[0], Feedback::Awesome);
}

#[test]
fn test_drop_chain_reaches_combo_two() {
    let rows = [
        "RRPPYGRG", "PBPPGBGR", "PGYGGYPP", "GPGRYGGP", "BGYRGBBR", "PPBPRPYP", "YBYGPGRY",
        "YRRGRBBG",
    ];
    let mut g = game(rows);
    let report = g
        .request_interaction(Position::new(4, 7), Position::new(5, 7))
        .unwrap();
    assert_eq!(report.combo_peak, 2);
    assert_eq!(report.rounds.len(), 2);
    // No multiplier before the third round.
    assert_eq!(report.rounds[1].combo, 2);
    assert_eq!(report.rounds[1].points, 15);
    assert_eq!(report.cues.iter().filter(|c| **c == AudioCue::Match).count(), 2);
    assert!(report.cues.contains(&AudioCue::Combo(2)));
    assert!(matches!(report.feedback[1], Feedback::Wow | Feedback::GoodJob));
    assert_eq!(g.state().combo_count, 2);
    assert!(is_stable(&g.state().board));
    g.finish_playback();
    assert_eq!(g.state().combo_count, 0);
}

#[test]
fn test_three_round_chain_applies_multiplier() {
    let rows = [
        "BRRBYBBP", "BRGBRYGR", "GPBGGBBY", "RPRYGRYG", "BBRGPBRB", "RBYYBGRP", "GYGBYGGY",
        "YBPYBBYG",
    ];
    let mut g = game(rows);
    let report = g
        .request_interaction(Position::new(6, 1), Position::new(7, 1))
        .unwrap();
    let points: Vec<u32> = report.rounds.iter().map(|r| r.points).collect();
    // 3 cells * 5 each round; the third is floored 22.5.
    assert_eq!(points, vec![15, 15, 22]);
    assert_eq!(report.combo_peak, 3);
    assert_eq!(report.score_delta, 52);
    assert_eq!(report.rounds[2].feedback, Feedback::Awesome);
}

#[test]
fn test_level_one_resolution() {
    let won = resolve(1, 110, 0);
    assert_eq!(won.phase, LevelPhase::Won);
    assert_eq!(won.earned_stars, 1);
    assert_eq!(resolve(1, 0, 0).phase, LevelPhase::Lost);
}

#[test]
fn test_busy_until_playback_finishes() {
    let mut g = game(CALM);
    g.request_interaction(Position::new(0, 0), Position::new(0, 1))
        .unwrap();
    assert_eq!(g.select(Position::new(3, 3)), Err(EngineError::Busy));
    g.finish_playback();
    assert!(g.select(Position::new(3, 3)).is_ok());
}
