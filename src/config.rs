use crate::playback::PlaybackConfig;
use crate::session::SessionConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Persistent player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tick_rate_hz: u32,
    pub progress_log_interval: u32,
    pub nominal_frame_interval_ms: u64,
    pub log_filter: String,
    pub validate_on_load: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            progress_log_interval: 30,
            nominal_frame_interval_ms: 16,
            log_filter: "info".to_string(),
            validate_on_load: true,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rewind").join("settings.json"))
    }

    /// Load from the user config directory, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Ignoring unreadable settings: {:#}", e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("No config directory on this platform")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn playback(&self) -> PlaybackConfig {
        PlaybackConfig {
            nominal_frame_interval: Duration::from_millis(self.nominal_frame_interval_ms),
        }
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            tick_rate_hz: self.tick_rate_hz,
            progress_log_interval: self.progress_log_interval,
        }
    }
}
