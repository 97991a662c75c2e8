// src/config.rs - Persisted application settings
use crate::adapter::AdapterSettings;
use crate::video::CameraFacing;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Minimum confidence, 0.0 to 1.0 (shown as a percent slider).
    pub score_threshold: f32,
    /// Detections kept per frame.
    pub max_results: usize,
    pub facing: CameraFacing,
    /// Open the camera immediately on startup.
    pub auto_start_camera: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            score_threshold: 0.5,
            max_results: 5,
            facing: CameraFacing::Front,
            auto_start_camera: false,
        }
    }
}

impl AppSettings {
    pub fn adapter(&self) -> AdapterSettings {
        AdapterSettings {
            score_threshold: self.score_threshold,
            max_results: self.max_results,
        }
    }

    fn settings_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "handoverlay", "HandOverlay")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Loads settings from the platform config directory; any problem falls
    /// back to defaults.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "settings file unreadable, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path().context("no config directory available")?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
