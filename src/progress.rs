//! Player progress (unlocked level, best stars per level) and its JSON file store.
//! Default location: XDG config dir or ~/.config, under `eclipse-tiles/progress.json`.

use crate::error::ProgressError;
use crate::level::{TOTAL_LEVELS, clamp_level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DIRNAME: &str = "eclipse-tiles";
const FILENAME: &str = "progress.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub unlocked_level: u32,
    #[serde(default)]
    pub stars_by_level: BTreeMap<u32, u8>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            unlocked_level: 1,
            stars_by_level: BTreeMap::new(),
        }
    }
}

impl Progress {
    pub fn stars_for(&self, level: u32) -> u8 {
        self.stars_by_level.get(&level).copied().unwrap_or(0)
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        (1..=self.unlocked_level).contains(&level)
    }

    pub fn total_stars(&self) -> u32 {
        self.stars_by_level.values().map(|&s| u32::from(s)).sum()
    }

    /// Apply a win: unlock the next level (never past the last) and keep the best star count.
    /// Neither value ever decreases.
    pub fn record_win(&mut self, level: u32, stars: u8) {
        let next = (level + 1).min(TOTAL_LEVELS);
        self.unlocked_level = self.unlocked_level.max(next);
        let best = self.stars_by_level.entry(level).or_insert(0);
        *best = (*best).max(stars.min(3));
    }

    /// Clamp values a hand-edited file could get wrong.
    fn sanitize(mut self) -> Self {
        self.unlocked_level = clamp_level(self.unlocked_level);
        self.stars_by_level
            .retain(|&level, _| (1..=TOTAL_LEVELS).contains(&level));
        for stars in self.stars_by_level.values_mut() {
            *stars = (*stars).min(3);
        }
        self
    }
}

/// Base config dir: `$XDG_CONFIG_HOME`, else `$HOME/.config`, else the working directory.
fn config_dir() -> PathBuf {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Reads and writes [`Progress`] as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Self {
        Self::new(config_dir().join(DIRNAME).join(FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield the default record.
    pub fn load(&self) -> Progress {
        match self.try_load() {
            Ok(progress) => progress,
            Err(ProgressError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Progress::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "progress unreadable; starting fresh");
                Progress::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<Progress, ProgressError> {
        let content = fs::read_to_string(&self.path)?;
        let progress: Progress = serde_json::from_str(&content)?;
        Ok(progress.sanitize())
    }

    /// Creates the parent directory if needed.
    pub fn save(&self, progress: &Progress) -> Result<(), ProgressError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(progress)?;
        fs::write(&self.path, json)?;
        info!(
            path = %self.path.display(),
            unlocked = progress.unlocked_level,
            "progress saved"
        );
        Ok(())
    }
}
