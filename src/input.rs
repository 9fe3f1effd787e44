//! Key bindings: arrows and vim-style hjkl move the cursor; shift swipes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eclipse_tiles::Direction;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Cursor(Direction),
    /// Swap the tile under the cursor with its neighbour.
    Swipe(Direction),
    /// Click the tile under the cursor (select, or swap with the selection).
    Select,
    Restart,
    Back,
    Quit,
    None,
}

fn direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Left | KeyCode::Char('h' | 'H') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('l' | 'L') => Some(Direction::Right),
        KeyCode::Up | KeyCode::Char('k' | 'K') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('j' | 'J') => Some(Direction::Down),
        _ => None,
    }
}

/// Map key event to an action. Uppercase HJKL and shift+arrows swipe.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let shift = modifiers.contains(KeyModifiers::SHIFT)
        || matches!(code, KeyCode::Char(c) if c.is_ascii_uppercase());
    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return Action::None;
    }
    if let Some(dir) = direction(code) {
        return if shift {
            Action::Swipe(dir)
        } else {
            Action::Cursor(dir)
        };
    }
    match code {
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Char('b' | 'B') | KeyCode::Backspace => Action::Back,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}
