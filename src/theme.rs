//! Theme loading: btop-style `theme[key]="value"` files, palettes and level accents.

use crate::Palette;
use eclipse_tiles::TileColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Levels sharing one accent colour.
pub const LEVELS_PER_ACCENT: u32 = 150;

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Tile colours in palette order: red, blue, green, yellow, purple.
const DEFAULT_TILES: [Color; 5] = [
    rgb(0xFF6B6B),
    rgb(0x4D96FF),
    rgb(0x6BCB77),
    rgb(0xFFD93D),
    rgb(0xC9B1FF),
];

const LEVEL_ACCENTS: [Color; 10] = [
    rgb(0xFF6B6B),
    rgb(0x4D96FF),
    rgb(0x6BCB77),
    rgb(0xFFD93D),
    rgb(0xC9B1FF),
    rgb(0xFF8E53),
    rgb(0x00D9FF),
    rgb(0xFF6B9D),
    rgb(0x7BED9F),
    rgb(0xFFA502),
];

#[derive(Debug, Clone)]
pub struct Theme {
    /// Indexed by [`TileColor::index`].
    pub tiles: [Color; 5],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, moves).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Locked levels, empty stars.
    pub inactive_fg: Color,
    /// Cursor and selection frame.
    pub cursor: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            tiles: DEFAULT_TILES,
            bg: rgb(0x1A1B2E),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xFFD93D),
            inactive_fg: rgb(0x5C6370),
            cursor: rgb(0xFFFFFF),
        }
    }
}

impl Theme {
    /// Load a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// No path, or a missing file, gives the built-in colours.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            _ => Self::default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.tiles = [
                    rgb(0xFF0000),
                    rgb(0x0088FF),
                    rgb(0x00FF00),
                    rgb(0xFFFF00),
                    rgb(0xFF00FF),
                ];
            }
            Palette::Colorblind => {
                // Paul Tol's vibrant set: no red/green pair.
                self.tiles = [
                    rgb(0xCC3311),
                    rgb(0x0077BB),
                    rgb(0x009988),
                    rgb(0xEE7733),
                    rgb(0xEE3377),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::default();
        Self {
            tiles: [
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.tiles[0]),
                get("cpu_box").unwrap_or(d.tiles[1]),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.tiles[2]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.tiles[3]),
                get("net_box").unwrap_or(d.tiles[4]),
            ],
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
            cursor: get("hi_fg").unwrap_or(d.cursor),
        }
    }

    #[inline]
    pub fn tile_color(&self, color: TileColor) -> Color {
        self.tiles[color.index() as usize]
    }
}

/// Accent for a level: cycles through ten colours, one per 150 levels.
pub fn level_accent(level: u32) -> Color {
    let band = level.saturating_sub(1) / LEVELS_PER_ACCENT;
    LEVEL_ACCENTS[band as usize % LEVEL_ACCENTS.len()]
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    match s.len() {
        6 => Ok(Color::Rgb(channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?)),
        3 => Ok(Color::Rgb(
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        )),
        _ => Err(invalid()),
    }
}
