//! App: terminal init, main loop, frame playback and key handling.

use crate::GameConfig;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use eclipse_tiles::{
    AudioCue, BellSink, Board, CueSink, Dealer, Direction, EngineError, Feedback, Frame, GRID_SIZE,
    Game, InteractionReport, LevelPhase, Phase, Position, Progress, ProgressStore, Resolution,
    Selection, SilentSink, TOTAL_LEVELS,
};
use ratatui::DefaultTerminal;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, info, warn};

/// Levels per row on the level screen.
pub const LEVELS_PER_ROW: u32 = 10;

/// How long each kind of frame stays on screen.
pub fn phase_duration(phase: Phase) -> Duration {
    Duration::from_millis(match phase {
        Phase::Swapped | Phase::Reverted | Phase::Dropped | Phase::Refilled => 150,
        Phase::Cleared => 200,
        Phase::Detonated => 300,
    })
}

/// How long a feedback message stays up.
const FEEDBACK_MS: u64 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    LevelSelect,
    Playing,
    LevelOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    LevelSelect,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOverOption {
    NextLevel,
    Restart,
    LevelSelect,
}

/// Rejected input is silent; `Invalid` is only played for reverted swaps.
fn rejected(e: EngineError) {
    debug!(error = %e, "input rejected");
}

/// Frames of the last report still to be shown.
#[derive(Debug)]
pub struct Playback {
    queue: VecDeque<Frame>,
    pub current: Frame,
    /// Board shown before `current`; cleared cells are drawn from it while they fade.
    pub previous: Board,
    started: Instant,
    feedback: VecDeque<Feedback>,
    /// Cues held back until the last frame (win / lose).
    deferred: Vec<AudioCue>,
}

impl Playback {
    fn new(report: InteractionReport, board: Board, now: Instant) -> Option<Self> {
        let mut queue: VecDeque<Frame> = report.frames.into();
        let current = queue.pop_front()?;
        let deferred = report
            .cues
            .iter()
            .copied()
            .filter(|c| matches!(c, AudioCue::Win | AudioCue::Lose))
            .collect();
        Some(Self {
            queue,
            current,
            previous: board,
            started: now,
            feedback: report.feedback.into(),
            deferred,
        })
    }

    pub fn is_clearing(&self) -> bool {
        matches!(self.current.phase, Phase::Cleared | Phase::Detonated)
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    game: Game,
    screen: Screen,
    store: ProgressStore,
    progress: Progress,
    sink: Box<dyn CueSink>,
    cursor: Position,
    level_cursor: u32,
    playback: Option<Playback>,
    feedback: Option<(Feedback, Instant)>,
    quit_selected: QuitOption,
    over_selected: LevelOverOption,
    /// TachyonFX fade for cleared cells (created when a clearing frame starts).
    clear_effect: Option<Effect>,
    /// Last time the clear effect was processed (for delta).
    clear_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let store = config
            .progress_file
            .clone()
            .map_or_else(ProgressStore::default_location, ProgressStore::new);
        let progress = store.load();
        let dealer = config.seed.map_or_else(Dealer::from_entropy, Dealer::seeded);
        // Never open on a level the player has not reached.
        let level = config.start_level.min(progress.unlocked_level).max(1);
        let game = Game::start_level(level, dealer);
        let sink: Box<dyn CueSink> = if config.bell {
            Box::new(BellSink::new(std::io::stdout()))
        } else {
            Box::new(SilentSink)
        };
        let screen = if config.no_menu {
            Screen::Playing
        } else {
            Screen::LevelSelect
        };
        info!(level, unlocked = progress.unlocked_level, path = %store.path().display(), "app started");
        Self {
            config,
            theme,
            game,
            screen,
            store,
            progress,
            sink,
            cursor: Position::new(GRID_SIZE / 2, GRID_SIZE / 2),
            level_cursor: level,
            playback: None,
            feedback: None,
            quit_selected: QuitOption::Resume,
            over_selected: LevelOverOption::Restart,
            clear_effect: None,
            clear_effect_process_time: None,
        }
    }

    fn start_level(&mut self, level: u32) {
        self.game.start(level);
        self.level_cursor = self.game.state().level;
        self.playback = None;
        self.feedback = None;
        self.clear_effect = None;
        self.clear_effect_process_time = None;
        self.screen = Screen::Playing;
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate);
        loop {
            let now = Instant::now();
            let view = crate::ui::View {
                screen: self.screen,
                state: self.game.state(),
                thresholds: self.game.thresholds(),
                playback: self.playback.as_ref(),
                cursor: self.cursor,
                feedback: self.feedback.map(|(f, _)| f),
                progress: &self.progress,
                level_cursor: self.level_cursor,
                quit_selected: self.quit_selected,
                over_selected: self.over_selected,
                over_options: self.level_over_options(),
                theme: &self.theme,
                animate: !self.config.no_animation,
            };
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &view,
                    &mut self.clear_effect,
                    &mut self.clear_effect_process_time,
                    now,
                );
            })?;

            if self.screen == Screen::Playing {
                self.advance_playback(now);
            }
            if self
                .feedback
                .is_some_and(|(_, at)| now.duration_since(at) >= Duration::from_millis(FEEDBACK_MS))
            {
                self.feedback = None;
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.handle_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Returns false when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match self.screen {
            Screen::LevelSelect => match action {
                Action::Quit => return false,
                Action::Cursor(dir) | Action::Swipe(dir) => self.move_level_cursor(dir),
                Action::Select => {
                    if self.progress.is_unlocked(self.level_cursor) {
                        self.start_level(self.level_cursor);
                    }
                }
                _ => {}
            },
            Screen::Playing => match action {
                Action::Quit => {
                    self.screen = Screen::QuitMenu;
                    self.quit_selected = QuitOption::Resume;
                }
                Action::Back if self.playback.is_none() => self.screen = Screen::LevelSelect,
                Action::Restart if self.playback.is_none() => self.start_level(self.game.state().level),
                Action::Cursor(dir) => {
                    if let Some(next) = self.cursor.step(dir) {
                        self.cursor = next;
                    }
                }
                Action::Swipe(dir) => self.swipe(dir),
                Action::Select => self.click(),
                _ => {}
            },
            Screen::QuitMenu => match action {
                Action::Cursor(Direction::Down | Direction::Right) => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::LevelSelect,
                        QuitOption::LevelSelect => QuitOption::Exit,
                        QuitOption::Exit => QuitOption::Resume,
                    };
                }
                Action::Cursor(Direction::Up | Direction::Left) => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::Exit,
                        QuitOption::LevelSelect => QuitOption::Resume,
                        QuitOption::Exit => QuitOption::LevelSelect,
                    };
                }
                Action::Select => match self.quit_selected {
                    QuitOption::Resume => self.screen = Screen::Playing,
                    QuitOption::LevelSelect => {
                        self.flush_playback();
                        self.screen = Screen::LevelSelect;
                    }
                    QuitOption::Exit => {
                        self.flush_playback();
                        return false;
                    }
                },
                Action::Quit => self.screen = Screen::Playing,
                _ => {}
            },
            Screen::LevelOver => {
                let options = self.level_over_options();
                match action {
                    Action::Cursor(dir) => {
                        let idx = options
                            .iter()
                            .position(|&o| o == self.over_selected)
                            .unwrap_or(0);
                        let step = if matches!(dir, Direction::Up | Direction::Left) {
                            options.len() - 1
                        } else {
                            1
                        };
                        self.over_selected = options[(idx + step) % options.len()];
                    }
                    Action::Select => self.confirm_level_over(self.over_selected),
                    Action::Restart => self.confirm_level_over(LevelOverOption::Restart),
                    Action::Back => self.confirm_level_over(LevelOverOption::LevelSelect),
                    Action::Quit => return false,
                    _ => {}
                }
            }
        }
        true
    }

    fn move_level_cursor(&mut self, dir: Direction) {
        let level = self.level_cursor;
        self.level_cursor = match dir {
            Direction::Left => level.saturating_sub(1),
            Direction::Right => level + 1,
            Direction::Up => level.saturating_sub(LEVELS_PER_ROW),
            Direction::Down => level + LEVELS_PER_ROW,
        }
        .clamp(1, TOTAL_LEVELS);
    }

    pub fn level_over_options(&self) -> Vec<LevelOverOption> {
        let state = self.game.state();
        let mut options = Vec::with_capacity(3);
        if state.phase == LevelPhase::Won && state.level < TOTAL_LEVELS {
            options.push(LevelOverOption::NextLevel);
        }
        options.extend([LevelOverOption::Restart, LevelOverOption::LevelSelect]);
        options
    }

    fn confirm_level_over(&mut self, option: LevelOverOption) {
        let level = self.game.state().level;
        match option {
            LevelOverOption::NextLevel => self.start_level((level + 1).min(TOTAL_LEVELS)),
            LevelOverOption::Restart => self.start_level(level),
            LevelOverOption::LevelSelect => {
                self.level_cursor = self.progress.unlocked_level.min(level + 1).max(1);
                self.screen = Screen::LevelSelect;
            }
        }
    }

    fn click(&mut self) {
        match self.game.select(self.cursor) {
            Ok(Selection::Selected(_)) => self.sink.play(AudioCue::Select),
            Ok(Selection::Interacted(report)) => self.begin_playback(report),
            Err(e) => rejected(e),
        }
    }

    fn swipe(&mut self, dir: Direction) {
        match self.game.swipe(self.cursor, dir) {
            Ok(report) => {
                if let Some(next) = self.cursor.step(dir) {
                    self.cursor = next;
                }
                self.begin_playback(report);
            }
            Err(e) => rejected(e),
        }
    }

    fn begin_playback(&mut self, report: InteractionReport) {
        if let Some(resolution) = report.resolution {
            self.record_resolution(resolution);
        }
        for &cue in &report.cues {
            if !matches!(cue, AudioCue::Win | AudioCue::Lose) {
                self.sink.play(cue);
            }
        }
        let shown = self
            .playback
            .take()
            .map_or_else(|| self.game.state().board.clone(), |p| p.current.board);
        if self.config.no_animation {
            // The engine state already holds the settled board.
            if let Some(&f) = report.feedback.last() {
                self.feedback = Some((f, Instant::now()));
            }
            for &cue in &report.cues {
                if matches!(cue, AudioCue::Win | AudioCue::Lose) {
                    self.sink.play(cue);
                }
            }
            self.finish_playback();
            return;
        }
        self.playback = Playback::new(report, shown, Instant::now());
        if let Some(p) = self.playback.as_mut() {
            if p.is_clearing() {
                if let Some(f) = p.feedback.pop_front() {
                    self.feedback = Some((f, Instant::now()));
                }
            }
        } else {
            self.finish_playback();
        }
    }

    fn advance_playback(&mut self, now: Instant) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        if now.duration_since(playback.started) < phase_duration(playback.current.phase) {
            return;
        }
        if let Some(next) = playback.queue.pop_front() {
            playback.previous = std::mem::replace(&mut playback.current, next).board;
            playback.started = now;
            self.clear_effect = None;
            self.clear_effect_process_time = None;
            if playback.is_clearing() {
                if let Some(f) = playback.feedback.pop_front() {
                    self.feedback = Some((f, now));
                }
            }
            return;
        }
        for cue in std::mem::take(&mut playback.deferred) {
            self.sink.play(cue);
        }
        self.playback = None;
        self.clear_effect = None;
        self.clear_effect_process_time = None;
        self.finish_playback();
    }

    /// Drop the frames still queued; the engine already holds the settled board.
    fn flush_playback(&mut self) {
        if let Some(playback) = self.playback.take() {
            for cue in playback.deferred {
                self.sink.play(cue);
            }
            self.clear_effect = None;
            self.clear_effect_process_time = None;
            self.finish_playback();
        }
    }

    /// Save a win as soon as the engine resolves it, ahead of its animation.
    fn record_resolution(&mut self, resolution: Resolution) {
        if resolution.phase != LevelPhase::Won {
            return;
        }
        let level = self.game.state().level;
        self.progress.record_win(level, resolution.earned_stars);
        if let Err(e) = self.store.save(&self.progress) {
            warn!(error = %e, "could not save progress");
        }
    }

    /// Release the engine latch and, if the level ended, switch to the level-over screen.
    fn finish_playback(&mut self) {
        self.game.finish_playback();
        let state = self.game.state();
        if state.phase == LevelPhase::Playing {
            return;
        }
        let resolution = self.game.resolution();
        self.over_selected = if resolution.phase == LevelPhase::Won && state.level < TOTAL_LEVELS {
            LevelOverOption::NextLevel
        } else {
            LevelOverOption::Restart
        };
        self.screen = Screen::LevelOver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eclipse_tiles::ScriptedDice;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    /// Red pairs everywhere plus a blue bomb at (2,0): 36 reds, no runs.
    const RED_FIELD: [&str; GRID_SIZE] = [
        "RRGRRGRR", "RRBRRBRR", "2BYPGYPB", "RRGRRGRR", "RRBRRBRR", "GYPBYPGY", "RRGRRGRR",
        "RRBRRBRR",
    ];

    struct Recorder(Rc<RefCell<Vec<AudioCue>>>);

    impl CueSink for Recorder {
        fn play(&mut self, cue: AudioCue) {
            self.0.borrow_mut().push(cue);
        }
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("eclipse-tiles-app-{}", std::process::id()));
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    fn app_on(rows: [&str; GRID_SIZE], progress_file: PathBuf) -> App {
        let config = GameConfig {
            start_level: 1,
            seed: Some(1),
            no_animation: false,
            frame_rate: 30.0,
            no_menu: true,
            progress_file: Some(progress_file),
            bell: false,
        };
        let mut app = App::new(config, Theme::default());
        let mut dealer = Dealer::new(ScriptedDice::default());
        let board = Board::from_rows(&rows, &mut dealer).unwrap();
        app.game = Game::with_board(1, board, dealer);
        app
    }

    #[test]
    fn test_win_is_saved_when_quitting_mid_animation() {
        let path = scratch("quit-mid-win.json");
        let mut app = app_on(RED_FIELD, path.clone());
        app.cursor = Position::new(2, 0);

        assert!(app.handle_action(Action::Swipe(Direction::Up)));
        assert_eq!(app.game.state().phase, LevelPhase::Won);
        assert!(app.playback.is_some());

        assert!(app.handle_action(Action::Quit));
        assert_eq!(app.screen, Screen::QuitMenu);
        app.handle_action(Action::Cursor(Direction::Down));
        app.handle_action(Action::Cursor(Direction::Down));
        assert_eq!(app.quit_selected, QuitOption::Exit);
        assert!(!app.handle_action(Action::Select));

        let saved = ProgressStore::new(&path).load();
        assert_eq!(saved.unlocked_level, 2);
        assert_eq!(saved.stars_for(1), 3);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_win_is_saved_before_playback_ends() {
        let path = scratch("early-win.json");
        let mut app = app_on(RED_FIELD, path.clone());
        app.cursor = Position::new(2, 0);
        app.handle_action(Action::Swipe(Direction::Up));
        assert!(app.playback.is_some());
        assert_eq!(ProgressStore::new(&path).load().unlocked_level, 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_swipe_off_grid_is_silent() {
        let path = scratch("off-grid.json");
        let mut app = app_on(RED_FIELD, path);
        let cues = Rc::new(RefCell::new(Vec::new()));
        app.sink = Box::new(Recorder(Rc::clone(&cues)));
        app.cursor = Position::new(0, 0);
        let before = app.game.state().clone();

        assert!(app.handle_action(Action::Swipe(Direction::Up)));
        assert!(app.handle_action(Action::Swipe(Direction::Left)));
        assert!(cues.borrow().is_empty());
        assert!(app.playback.is_none());
        assert_eq!(app.game.state(), &before);
    }

    #[test]
    fn test_phase_durations() {
        assert_eq!(phase_duration(Phase::Swapped), Duration::from_millis(150));
        assert_eq!(phase_duration(Phase::Cleared), Duration::from_millis(200));
        assert_eq!(phase_duration(Phase::Detonated), Duration::from_millis(300));
        assert_eq!(phase_duration(Phase::Refilled), Duration::from_millis(150));
    }
}
