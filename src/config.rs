use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::zoom::SCALE_DEFAULT;
use crate::engine::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::model::TimeScale;

const APP_NAME: &str = "PlanboardTimeline";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub time_scale: TimeScale,
    pub zoom_scale: f32,
    pub chart: TimelineConfig,
    /// Artificial delay before the task store applies a write.
    pub simulated_latency_ms: u64,
    pub last_file: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            time_scale: TimeScale::Day,
            zoom_scale: SCALE_DEFAULT,
            chart: TimelineConfig::default(),
            simulated_latency_ms: 0,
            last_file: None,
        }
    }
}

impl AppSettings {
    /// `<config dir>/settings.json`.
    pub fn default_path() -> Result<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
            .ok_or(TimelineError::NoConfigDir)
    }

    /// Missing or unreadable settings fall back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(TimelineError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}
