use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::migrate;
use crate::error::Result;
use crate::model::Match;

/// The single persisted blob: every match plus the active-match pointer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub active_match_id: Option<String>,
}

impl AppState {
    pub fn find(&self, match_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub fn find_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == match_id)
    }

    /// Parse a serialized state, upgrading legacy records first
    pub fn from_json(content: &str) -> Result<AppState> {
        let mut value: serde_json::Value = serde_json::from_str(content)?;
        let upgraded = migrate::upgrade(&mut value);
        if upgraded > 0 {
            log::info!("Upgraded {} legacy rounds without a hand mode", upgraded);
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Where the app state blob lives
pub trait StateBackend {
    fn load(&self) -> Result<AppState>;
    fn save(&mut self, state: &AppState) -> Result<()>;
}

/// JSON file on disk. A missing file reads as an empty state.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateBackend for JsonFileBackend {
    fn load(&self) -> Result<AppState> {
        if !self.path.exists() {
            log::debug!("No state file at {}, starting empty", self.path.display());
            return Ok(AppState::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(AppState::default());
        }
        AppState::from_json(&content)
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, state.to_json()?)?;
        Ok(())
    }
}

/// In-process state, nothing written anywhere
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: AppState,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateBackend for MemoryBackend {
    fn load(&self) -> Result<AppState> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &AppState) -> Result<()> {
        self.state = state.clone();
        Ok(())
    }
}
