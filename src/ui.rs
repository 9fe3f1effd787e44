//! Layout and drawing: level screen, board, sidebar, level-over and quit popups.

use crate::app::{LEVELS_PER_ROW, LevelOverOption, Playback, QuitOption, Screen, phase_duration};
use crate::theme::{Theme, level_accent};
use eclipse_tiles::level::StarThresholds;
use eclipse_tiles::{
    Board, Feedback, GRID_SIZE, LevelPhase, Position as TilePos, Progress, SessionState, Special,
    TOTAL_LEVELS, Tile,
};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns per tile (4 coloured plus a gutter on each side for markers).
const TILE_W: u16 = 6;
/// Terminal rows per tile.
const TILE_H: u16 = 2;
const BOARD_W: u16 = GRID_SIZE as u16 * TILE_W + 2;
const BOARD_H: u16 = GRID_SIZE as u16 * TILE_H + 2;
const SIDEBAR_WIDTH: u16 = 26;
/// Level screen cell: four-digit number plus three stars.
const LEVEL_CELL_W: u16 = 7;

const STAR: &str = "★";
const NO_STAR: &str = "☆";

/// Everything one frame needs, borrowed from the app.
pub struct View<'a> {
    pub screen: Screen,
    pub state: &'a SessionState,
    pub thresholds: StarThresholds,
    pub playback: Option<&'a Playback>,
    pub cursor: TilePos,
    pub feedback: Option<Feedback>,
    pub progress: &'a Progress,
    pub level_cursor: u32,
    pub quit_selected: QuitOption,
    pub over_selected: LevelOverOption,
    pub over_options: Vec<LevelOverOption>,
    pub theme: &'a Theme,
    pub animate: bool,
}

impl View<'_> {
    /// Board on screen: the playing frame, or the settled state.
    fn board(&self) -> &Board {
        self.playback
            .map_or(&self.state.board, |p| &p.current.board)
    }

    fn combo(&self) -> u32 {
        self.playback
            .map_or(self.state.combo_count, |p| p.current.combo)
    }

    fn earned_stars(&self) -> u8 {
        self.thresholds.stars_for(self.state.score)
    }
}

/// Draw the current screen. While a clearing frame plays (and animation is on),
/// fades the cleared cells with TachyonFX and keeps `clear_effect` / `clear_process_time` updated.
pub fn draw(
    frame: &mut Frame,
    view: &View<'_>,
    clear_effect: &mut Option<Effect>,
    clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(view.theme.bg))
        .render(area, frame.buffer_mut());
    match view.screen {
        Screen::LevelSelect => draw_level_select(frame, view, area),
        Screen::Playing => {
            draw_game(frame, view, area);
            if view.animate {
                if let Some(playback) = view.playback.filter(|p| p.is_clearing()) {
                    apply_clear_effect(
                        frame,
                        view,
                        playback,
                        area,
                        clear_effect,
                        clear_process_time,
                        now,
                    );
                }
            }
        }
        Screen::QuitMenu => {
            draw_game(frame, view, area);
            draw_quit_menu(frame, view.theme, view.quit_selected);
        }
        Screen::LevelOver => {
            draw_game(frame, view, area);
            draw_level_over(frame, view, area);
        }
    }
}

/// Board (with border) and sidebar rects, centred in `area`.
fn game_rects(area: Rect) -> (Rect, Rect) {
    let total_w = BOARD_W + SIDEBAR_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(BOARD_H) / 2;
    let board = Rect {
        x,
        y,
        width: BOARD_W.min(area.width),
        height: BOARD_H.min(area.height),
    }
    .intersection(area);
    let sidebar = Rect {
        x: x + BOARD_W,
        y,
        width: SIDEBAR_WIDTH,
        height: BOARD_H,
    }
    .intersection(area);
    (board, sidebar)
}

/// Top-left terminal cell of a tile inside the board's inner rect.
fn tile_origin(inner: Rect, pos: TilePos) -> (u16, u16) {
    (
        inner.x + pos.col as u16 * TILE_W,
        inner.y + pos.row as u16 * TILE_H,
    )
}

fn put(buf: &mut Buffer, x: u16, y: u16, symbol: &str, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_symbol(symbol).set_style(style);
    }
}

const KEY_HINT: &str = "hjkl move  Enter select  HJKL swap  R restart  B levels  Q menu";

fn draw_game(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let (board_outer, sidebar) = game_rects(area);
    draw_board(frame, view, board_outer);
    draw_sidebar(frame, view, sidebar);
    let hint_y = board_outer.bottom();
    if hint_y < area.bottom() {
        frame.buffer_mut().set_string(
            board_outer.x,
            hint_y,
            KEY_HINT,
            Style::default().fg(view.theme.inactive_fg),
        );
    }
}

fn draw_board(frame: &mut Frame, view: &View<'_>, outer: Rect) {
    let theme = view.theme;
    let accent = level_accent(view.state.level);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(
            format!(" Eclipse Tiles  Level {} ", view.state.level),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(outer);
    block.render(outer, frame.buffer_mut());

    let board = view.board();
    // Cells being cleared still show their old tile while they fade.
    let ghosts: HashSet<TilePos> = match view.playback {
        Some(p) if view.animate && p.is_clearing() => p.current.cleared.iter().copied().collect(),
        _ => HashSet::new(),
    };
    let buf = frame.buffer_mut();
    for pos in Board::positions() {
        let tile = if ghosts.contains(&pos) {
            view.playback.and_then(|p| p.previous.tile_at(pos))
        } else {
            board.tile_at(pos)
        };
        if let Some(tile) = tile {
            draw_tile(buf, theme, inner, pos, tile);
        }
    }

    if view.screen != Screen::Playing || view.playback.is_some() {
        return;
    }
    if let Some(selected) = view.state.selected {
        let style = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
        draw_marker(buf, inner, selected, ("[", "]"), style);
    }
    let cursor_marks = if view.state.selected == Some(view.cursor) {
        ("[", "]")
    } else {
        ("▶", "◀")
    };
    draw_marker(buf, inner, view.cursor, cursor_marks, Style::default().fg(theme.cursor));
}

fn draw_tile(buf: &mut Buffer, theme: &Theme, inner: Rect, pos: TilePos, tile: Tile) {
    let (x0, y0) = tile_origin(inner, pos);
    if x0 + TILE_W > inner.right() || y0 + TILE_H > inner.bottom() {
        return;
    }
    let color = theme.tile_color(tile.color);
    let style = Style::default().fg(Color::Black).bg(color);
    for dy in 0..TILE_H {
        for dx in 1..TILE_W - 1 {
            put(buf, x0 + dx, y0 + dy, " ", style);
        }
    }
    let label = match tile.special {
        Special::None => return,
        Special::RowClear => "<==>",
        Special::ColorBomb => "(**)",
    };
    buf.set_string(x0 + 1, y0, label, style.add_modifier(Modifier::BOLD));
}

fn draw_marker(buf: &mut Buffer, inner: Rect, pos: TilePos, (left, right): (&str, &str), style: Style) {
    let (x0, y0) = tile_origin(inner, pos);
    for dy in 0..TILE_H {
        put(buf, x0, y0 + dy, left, style);
        put(buf, x0 + TILE_W - 1, y0 + dy, right, style);
    }
}

/// Buffer positions covered by the cleared cells of the current frame.
fn clearing_buffer_positions(inner: Rect, cleared: &[TilePos]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &pos in cleared {
        let (x0, y0) = tile_origin(inner, pos);
        for x in x0..(x0 + TILE_W).min(inner.right()) {
            for y in y0..(y0 + TILE_H).min(inner.bottom()) {
                set.insert((x, y));
            }
        }
    }
    set
}

/// Create or update the clear fade and process it (fade cleared tiles to the background).
fn apply_clear_effect(
    frame: &mut Frame,
    view: &View<'_>,
    playback: &Playback,
    area: Rect,
    clear_effect: &mut Option<Effect>,
    clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let (board_outer, _) = game_rects(area);
    let inner = Block::default().borders(Borders::ALL).inner(board_outer);
    let delta = clear_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *clear_process_time = Some(now);

    if clear_effect.is_none() {
        let clearing_set = clearing_buffer_positions(inner, &playback.current.cleared);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            clearing_set.contains(&(pos.x, pos.y))
        }));
        let fade_ms = phase_duration(playback.current.phase).as_millis() as u32;
        let bg = view.theme.bg;
        let effect = fx::fade_to(bg, bg, (fade_ms, Interpolation::Linear))
            .with_filter(filter)
            .with_area(inner);
        *clear_effect = Some(effect);
    }

    if let Some(effect) = clear_effect {
        frame.render_effect(effect, inner, TfxDuration::from_millis(delta_ms));
    }
}

fn stars_line(earned: u8, theme: &Theme) -> Line<'static> {
    Line::from(
        (0..3u8)
            .map(|i| {
                if i < earned {
                    Span::styled(STAR, Style::default().fg(theme.title))
                } else {
                    Span::styled(NO_STAR, Style::default().fg(theme.inactive_fg))
                }
            })
            .collect::<Vec<_>>(),
    )
}

fn bordered(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_sidebar(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Stats
            Constraint::Length(5), // Stars gauge + markers
            Constraint::Length(4), // Combo + feedback
            Constraint::Min(0),
        ])
        .split(area);

    // --- Stats ---
    let stats_block = bordered(theme);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let state = view.state;
    let lines = vec![
        Line::from(vec![
            Span::styled("Level: ", title_style),
            Span::styled(
                state.level.to_string(),
                Style::default().fg(level_accent(state.level)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Moves: ", title_style),
            Span::styled(state.moves_remaining.to_string(), fg_style),
        ]),
        stars_line(view.earned_stars(), theme),
    ];
    Paragraph::new(lines).render(stats_inner, frame.buffer_mut());

    // --- Stars: progress toward three stars, markers under each threshold ---
    let stars_block = bordered(theme);
    let stars_inner = stars_block.inner(chunks[1]);
    stars_block.render(chunks[1], frame.buffer_mut());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(stars_inner);
    let t = view.thresholds;
    Paragraph::new(Line::from(vec![
        Span::styled("Stars ", title_style),
        Span::styled(format!("{} / {} / {}", t.one, t.two, t.three), fg_style),
    ]))
    .render(rows[0], frame.buffer_mut());
    let ratio = (f64::from(state.score) / f64::from(t.three.max(1))).min(1.0);
    Gauge::default()
        .ratio(ratio)
        .label("")
        .gauge_style(
            Style::default()
                .fg(level_accent(state.level))
                .bg(theme.div_line),
        )
        .render(rows[1], frame.buffer_mut());
    let width = rows[2].width;
    for (threshold, earned) in [(t.one, 1), (t.two, 2), (t.three, 3)] {
        let offset = (u64::from(threshold) * u64::from(width) / u64::from(t.three.max(1))) as u16;
        let x = rows[2].x + offset.min(width.saturating_sub(1));
        let style = if view.earned_stars() >= earned {
            Style::default().fg(theme.title)
        } else {
            Style::default().fg(theme.inactive_fg)
        };
        put(frame.buffer_mut(), x, rows[2].y, "▲", style);
    }

    // --- Combo + feedback ---
    let combo_block = bordered(theme);
    let combo_inner = combo_block.inner(chunks[2]);
    combo_block.render(chunks[2], frame.buffer_mut());
    let combo = view.combo();
    let combo_line = if combo > 1 {
        Line::from(Span::styled(
            format!("Combo x{combo}"),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled("Combo", Style::default().fg(theme.inactive_fg)))
    };
    let feedback_line = view.feedback.map_or_else(Line::default, |f| {
        Line::from(Span::styled(
            f.label(),
            Style::default()
                .fg(level_accent(state.level))
                .add_modifier(Modifier::BOLD),
        ))
    });
    Paragraph::new(vec![combo_line, feedback_line]).render(combo_inner, frame.buffer_mut());
}

fn draw_level_select(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let grid_w = LEVELS_PER_ROW as u16 * LEVEL_CELL_W;
    let outer = Rect {
        x: area.x + area.width.saturating_sub(grid_w + 2) / 2,
        y: area.y,
        width: (grid_w + 2).min(area.width),
        height: area.height,
    };
    let block = bordered(theme).title(Span::styled(
        " Eclipse Tiles ",
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
    ));
    let inner = block.inner(outer);
    block.render(outer, frame.buffer_mut());
    if inner.height < 4 {
        return;
    }

    let header = Line::from(vec![
        Span::styled("Select Level  ", Style::default().fg(theme.title)),
        Span::styled(
            format!(
                "{STAR} {}   unlocked {}/{}",
                view.progress.total_stars(),
                view.progress.unlocked_level,
                TOTAL_LEVELS
            ),
            Style::default().fg(theme.main_fg),
        ),
    ]);
    frame.buffer_mut().set_line(inner.x, inner.y, &header, inner.width);

    let visible_rows = u32::from(inner.height - 3);
    let total_rows = TOTAL_LEVELS.div_ceil(LEVELS_PER_ROW);
    let cursor_row = (view.level_cursor - 1) / LEVELS_PER_ROW;
    let first_row = cursor_row
        .saturating_sub(visible_rows / 2)
        .min(total_rows.saturating_sub(visible_rows));

    let buf = frame.buffer_mut();
    for (i, row) in (first_row..total_rows).take(visible_rows as usize).enumerate() {
        let y = inner.y + 2 + i as u16;
        for col in 0..LEVELS_PER_ROW {
            let level = row * LEVELS_PER_ROW + col + 1;
            if level > TOTAL_LEVELS {
                break;
            }
            let x = inner.x + col as u16 * LEVEL_CELL_W;
            let unlocked = view.progress.is_unlocked(level);
            let mut number_style = if unlocked {
                Style::default().fg(Color::Black).bg(level_accent(level))
            } else {
                Style::default().fg(theme.inactive_fg).bg(theme.div_line)
            };
            if level == view.level_cursor {
                number_style = number_style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            buf.set_string(x, y, format!("{level:>4}"), number_style);
            if unlocked {
                buf.set_line(x + 4, y, &stars_line(view.progress.stars_for(level), theme), 3);
            } else {
                buf.set_string(x + 4, y, " - ", Style::default().fg(theme.inactive_fg));
            }
        }
    }

    let footer = " Enter play   arrows move   Q quit ";
    buf.set_string(
        inner.x,
        inner.bottom().saturating_sub(1),
        footer,
        Style::default().fg(theme.inactive_fg),
    );
}

fn draw_level_over(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let (board_outer, _) = game_rects(area);
    let popup_w = 34u16;
    let popup_h = 10 + view.over_options.len() as u16;
    let popup = Rect {
        x: board_outer.x + board_outer.width.saturating_sub(popup_w) / 2,
        y: board_outer.y + board_outer.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    }
    .intersection(area);

    let won = view.state.phase == LevelPhase::Won;
    let (title, title_bg) = if won {
        (" Level Complete! ", level_accent(view.state.level))
    } else {
        (" Out of Moves! ", Color::Red)
    };
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(title_bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        stars_line(view.earned_stars(), theme),
        Line::from(Span::styled(
            format!(" Score: {} ", view.state.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
    ];
    for option in &view.over_options {
        let label = match option {
            LevelOverOption::NextLevel => " Next Level ",
            LevelOverOption::Restart => " Restart ",
            LevelOverOption::LevelSelect => " Levels ",
        };
        let style = if *option == view.over_selected {
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        lines.push(Line::from(Span::styled(label, style)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R Restart   B Levels   Q Quit ",
        Style::default().fg(theme.inactive_fg),
    )));

    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(bordered(theme))
        .render(popup, frame.buffer_mut());
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let area = frame.area();
    let qw = 24;
    let qh = 8;
    let quit_rect = Rect {
        x: area.x + area.width.saturating_sub(qw) / 2,
        y: area.y + area.height.saturating_sub(qh) / 2,
        width: qw,
        height: qh,
    }
    .intersection(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    // Clear background
    for y in quit_rect.y..quit_rect.bottom() {
        for x in quit_rect.x..quit_rect.right() {
            put(frame.buffer_mut(), x, y, " ", Style::default().bg(theme.bg));
        }
    }

    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::LevelSelect, " Levels "),
        (QuitOption::Exit, " Exit "),
    ];

    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.bottom() {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_fits_standard_terminal() {
        let (board, sidebar) = game_rects(Rect::new(0, 0, 80, 24));
        assert_eq!(board.width, BOARD_W);
        assert_eq!(board.height, BOARD_H);
        assert!(sidebar.right() <= 80);
    }

    #[test]
    fn test_clearing_positions_cover_whole_tiles() {
        let inner = Rect::new(1, 1, BOARD_W - 2, BOARD_H - 2);
        let set = clearing_buffer_positions(inner, &[TilePos::new(0, 0), TilePos::new(7, 7)]);
        assert_eq!(set.len(), 2 * usize::from(TILE_W * TILE_H));
        assert!(set.contains(&(1, 1)));
        assert!(set.contains(&(BOARD_W - 2, BOARD_H - 2)));
    }
}
