//! Application settings management
//!
//! Settings are stored as JSON. Every field has a default, so a partial file
//! is valid; a file that cannot be parsed is reported and ignored.

use anyhow::{Context, Result};
use mail_merge::MergeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name of the settings file in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "docx-fill.json";

/// Main application settings container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Template used when no `--template` is given
    pub template_path: Option<PathBuf>,
    /// Directory generated documents are written to
    pub output_dir: PathBuf,
    /// Substitution behavior
    pub merge: MergeOptions,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            template_path: None,
            output_dir: PathBuf::from("."),
            merge: MergeOptions::default(),
        }
    }
}

/// Settings manager for loading and saving application settings
pub struct SettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: AppSettings,
}

impl SettingsManager {
    /// Create a settings manager for the given file
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: AppSettings::default(),
        }
    }

    /// Get the path to the settings file
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load(&mut self) -> Result<&AppSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)
                .with_context(|| format!("Failed to read {}", self.settings_path.display()))?;
            match serde_json::from_str::<AppSettings>(&content) {
                Ok(settings) => {
                    tracing::debug!("Loaded settings from {}", self.settings_path.display());
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse settings file, using defaults: {}",
                        e
                    );
                    self.current = AppSettings::default();
                }
            }
        } else {
            self.current = AppSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    /// Replace the current settings
    pub fn update(&mut self, settings: AppSettings) {
        self.current = settings;
    }
}
