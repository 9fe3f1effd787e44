//! File logging. The terminal belongs to the game, so logs only go to `--log-file`.

use crate::LogLevel;
use anyhow::{Context, Result, anyhow};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

/// Install a plain-text `fmt` subscriber writing to `path` (truncated on start).
pub fn init(path: &Path, level: LogLevel) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::from(level))
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;
    Ok(())
}
