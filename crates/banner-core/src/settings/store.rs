//! Load/save of the settings blob.

use super::atomic::{atomic_read_json, atomic_write_json};
use super::schema::Settings;
use crate::config::EngineConfig;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed settings persistence.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional location inside a vault.
    pub fn for_vault(vault_root: impl AsRef<Path>) -> Self {
        Self::new(
            vault_root
                .as_ref()
                .join(EngineConfig::SETTINGS_DIR_NAME)
                .join(EngineConfig::SETTINGS_FILE_NAME),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults when nothing is stored yet.
    pub fn load(&self) -> Result<Settings> {
        match atomic_read_json::<Settings>(&self.path)? {
            Some(settings) => {
                debug!("Loaded settings from {}", self.path.display());
                Ok(settings)
            }
            None => {
                debug!("No settings at {}, using defaults", self.path.display());
                Ok(Settings::default())
            }
        }
    }

    /// Validate and persist settings.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;
        atomic_write_json(&self.path, settings)?;
        info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
