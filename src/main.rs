//! Eclipse Tiles: level-based match-3 puzzle game in the terminal.

mod app;
mod input;
mod logging;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::warn;

/// Options derived from the CLI that the app needs after startup.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub start_level: u32,
    pub seed: Option<u64>,
    pub no_animation: bool,
    pub frame_rate: f64,
    pub no_menu: bool,
    pub progress_file: Option<PathBuf>,
    pub bell: bool,
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        Self {
            start_level: eclipse_tiles::level::clamp_level(args.level),
            seed: args.seed,
            no_animation: args.no_animation,
            frame_rate: if args.frame_rate > 0.0 { args.frame_rate } else { 30.0 },
            no_menu: args.no_menu,
            progress_file: args.progress_file.clone(),
            bell: args.bell,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        logging::init(path, args.log_level)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        warn!(error = %e, "theme unreadable; using built-in colours");
        let mut theme = theme::Theme::default();
        theme.apply_palette(args.palette);
        theme
    });
    let config = GameConfig::from(&args);
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// Eclipse Tiles: swap tiles, make lines of three, chain cascades.
#[derive(Debug, Parser)]
#[command(
    name = "eclipse-tiles",
    version,
    about = "Level-based match-3 puzzle in the terminal. Swap adjacent tiles to line up three or more of a colour.",
    long_about = "Eclipse Tiles is a match-3 puzzle game with 1500 levels.\n\n\
        Swap two adjacent tiles to line up three or more of one colour. Lines of four leave a \
        row-clear tile, lines of five a colour bomb. Reach the star thresholds before you run \
        out of moves.\n\n\
        CONTROLS:\n  Arrows / hjkl      Move cursor      Enter / Space   Select or swap with selection\n  \
        Shift+arrows / HJKL  Swap in that direction   R  Restart   B  Level select   Q / Esc  Menu\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Level to open the level screen on (or to start with --no-menu), 1..=1500.
    #[arg(short, long, default_value = "1", value_name = "N")]
    pub level: u32,

    /// Seed for reproducible boards. Random when not set.
    #[arg(short, long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Built-in colours if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable swap/clear/drop animation (jump straight to the settled board).
    #[arg(long)]
    pub no_animation: bool,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Skip the level screen and start playing immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Progress file. Defaults to $XDG_CONFIG_HOME/eclipse-tiles/progress.json.
    #[arg(long, value_name = "FILE")]
    pub progress_file: Option<PathBuf>,

    /// Ring the terminal bell on explosions, wins and losses.
    #[arg(long)]
    pub bell: bool,

    /// Write logs to this file (the terminal is taken by the game).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log verbosity for --log-file.
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["eclipse-tiles"]);
        let config = GameConfig::from(&args);
        assert_eq!(config.start_level, 1);
        assert_eq!(config.seed, None);
        assert_eq!(args.palette, Palette::Normal);
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(!config.bell);
    }

    #[test]
    fn test_cli_level_is_clamped() {
        let args = Args::parse_from(["eclipse-tiles", "--level", "4000", "--seed", "9"]);
        let config = GameConfig::from(&args);
        assert_eq!(config.start_level, 1500);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_palette_aliases() {
        let args = Args::parse_from(["eclipse-tiles", "--palette", "colourblind"]);
        assert_eq!(args.palette, Palette::Colorblind);
    }
}
