use crate::domain::entities::SyncSettings;
use crate::domain::value_objects::SubtreePrefix;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Settings file names, in lookup order
pub const SETTINGS_FILE_NAMES: [&str; 2] = [".expaper.yml", ".expaper.yaml"];

/// Settings store related errors
#[derive(Debug, Error)]
pub enum SettingsStoreError {
    #[error("Settings file read failed: {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing failed in {}: {source}", .path.display())]
    YamlParsingFailed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Settings validation failed in {}: {message}", .path.display())]
    ValidationFailed { path: PathBuf, message: String },
}

impl SettingsStoreError {
    pub fn path(&self) -> &Path {
        match self {
            SettingsStoreError::ReadFailed { path, .. }
            | SettingsStoreError::YamlParsingFailed { path, .. }
            | SettingsStoreError::ValidationFailed { path, .. } => path,
        }
    }
}

/// On-disk layout; other top-level sections belong to other tools
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    sync: SyncSettings,
}

/// Loads [`SyncSettings`] from a project's `.expaper.yml`
#[derive(Debug, Clone)]
pub struct SettingsStore {
    project_root: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(project_root: P) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    /// First settings file present in the project root
    pub fn settings_path(&self) -> Option<PathBuf> {
        SETTINGS_FILE_NAMES
            .iter()
            .map(|name| self.project_root.join(name))
            .find(|path| path.is_file())
    }

    /// Load settings, falling back to defaults when no file exists
    pub fn load(&self) -> Result<SyncSettings, SettingsStoreError> {
        let Some(path) = self.settings_path() else {
            debug!(project_root = %self.project_root.display(), "no settings file, using defaults");
            return Ok(SyncSettings::default());
        };

        let content = fs::read_to_string(&path).map_err(|source| SettingsStoreError::ReadFailed {
            path: path.clone(),
            source,
        })?;

        let settings = if content.trim().is_empty() {
            SyncSettings::default()
        } else {
            serde_yaml::from_str::<SettingsFile>(&content)
                .map_err(|source| SettingsStoreError::YamlParsingFailed {
                    path: path.clone(),
                    source,
                })?
                .sync
        };

        Self::validate(&path, &settings)?;
        debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    fn validate(path: &Path, settings: &SyncSettings) -> Result<(), SettingsStoreError> {
        if settings.remote.trim().is_empty() {
            return Err(SettingsStoreError::ValidationFailed {
                path: path.to_path_buf(),
                message: "sync.remote cannot be empty".to_string(),
            });
        }

        SubtreePrefix::new(&settings.paper_dir).map_err(|e| SettingsStoreError::ValidationFailed {
            path: path.to_path_buf(),
            message: format!("sync.paper_dir: {e}"),
        })?;

        Ok(())
    }
}
