//! High-score persistence.
//!
//! The game only ever reads the stored best score once at start-up and writes
//! it again when a run beats it.  [`TomlScoreStore`] keeps it in
//! `saves/highscore.toml`; [`MemoryScoreStore`] is for tests and headless runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Durable home of the single best score.
pub trait ScoreStore {
    /// Stored best score; `0` when nothing was saved yet.
    fn load(&self) -> GameResult<u32>;
    fn save(&mut self, score: u32) -> GameResult<()>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct HighScoreFile {
    #[serde(rename = "highScore")]
    high_score: u32,
    #[serde(default)]
    saved_at_unix: u64,
}

pub fn default_highscore_path() -> PathBuf {
    PathBuf::from("saves").join("highscore.toml")
}

fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn persistence_error(path: &Path, reason: impl std::fmt::Display) -> GameError {
    GameError::Persistence {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Score stored as TOML under the key `highScore`.
#[derive(Debug, Clone)]
pub struct TomlScoreStore {
    path: PathBuf,
}

impl Default for TomlScoreStore {
    fn default() -> Self {
        Self::new(default_highscore_path())
    }
}

impl TomlScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for TomlScoreStore {
    fn load(&self) -> GameResult<u32> {
        if !self.path.exists() {
            return Ok(0);
        }
        let contents = fs::read_to_string(&self.path).map_err(|err| persistence_error(&self.path, err))?;
        let file: HighScoreFile =
            toml::from_str(&contents).map_err(|err| persistence_error(&self.path, format!("parse: {err}")))?;
        Ok(file.high_score)
    }

    fn save(&mut self, score: u32) -> GameResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| persistence_error(dir, err))?;
        }
        let file = HighScoreFile {
            high_score: score,
            saved_at_unix: current_unix_timestamp(),
        };
        let serialized =
            toml::to_string_pretty(&file).map_err(|err| persistence_error(&self.path, format!("serialize: {err}")))?;
        fs::write(&self.path, serialized).map_err(|err| persistence_error(&self.path, err))
    }
}

/// In-memory store; `fail_writes` simulates a read-only disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    pub score: u32,
    pub writes: u32,
    pub fail_writes: bool,
}

impl MemoryScoreStore {
    pub fn with_score(score: u32) -> Self {
        Self {
            score,
            ..Default::default()
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> GameResult<u32> {
        Ok(self.score)
    }

    fn save(&mut self, score: u32) -> GameResult<()> {
        if self.fail_writes {
            return Err(GameError::Persistence {
                path: "<memory>".to_string(),
                reason: "writes disabled".to_string(),
            });
        }
        self.score = score;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("hexhook-{}-{}", std::process::id(), name))
            .join("highscore.toml")
    }

    #[test]
    fn missing_file_reads_as_zero() {
        let store = TomlScoreStore::new(temp_path("missing"));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn save_then_load_uses_high_score_key() {
        let path = temp_path("roundtrip");
        let mut store = TomlScoreStore::new(&path);
        store.save(42).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("highScore = 42"));
        assert_eq!(store.load().unwrap(), 42);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_is_a_persistence_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "highScore = \"lots\"").unwrap();
        let store = TomlScoreStore::new(&path);
        assert!(matches!(store.load(), Err(GameError::Persistence { .. })));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn memory_store_can_refuse_writes() {
        let mut store = MemoryScoreStore {
            fail_writes: true,
            ..Default::default()
        };
        assert!(store.save(3).is_err());
        assert_eq!(store.load().unwrap(), 0);
    }
}
