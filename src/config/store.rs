//! Settings and preset persistence as flat JSON objects.
//!
//! Loading merges the stored object onto the caller's current
//! configuration, so a preset may carry any subset of the fields.
//! Saving always writes the complete configuration.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{ConfigError, VoxelConfig};
use crate::log;

/// File name of the settings store inside the config directory.
const SETTINGS_FILE: &str = "settings.json";

/// Load/save seam for persisted configuration.
pub trait SettingsStore {
    /// Merge the stored object onto `current`.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet. On error the
    /// caller keeps `current` unchanged.
    fn load_onto(&self, current: &VoxelConfig) -> Result<Option<VoxelConfig>, ConfigError>;

    fn save(&self, config: &VoxelConfig) -> Result<(), ConfigError>;
}

/// A JSON file on disk (the settings file or a named preset).
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform config dir>/voxelizer/settings.json`, when resolvable.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "voxelizer")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonStore {
    fn load_onto(&self, current: &VoxelConfig) -> Result<Option<VoxelConfig>, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::Io(self.path.clone(), e)),
        };

        let merged = current.merge_json(&content, &self.path)?;
        if !merged.ignored.is_empty() {
            log!(
                "warning";
                "unknown fields in {}: {}",
                self.path.display(),
                merged.ignored.join(", ")
            );
        }
        Ok(Some(merged.config))
    }

    fn save(&self, config: &VoxelConfig) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::Write(self.path.clone(), e);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = to_pretty_json(config, &self.path)?;
        fs::write(&self.path, content).map_err(write_err)
    }
}

/// Pretty JSON with a trailing newline, as written to disk.
fn to_pretty_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<String, ConfigError> {
    let mut content = serde_json::to_string_pretty(value)
        .map_err(|e| ConfigError::Serialize(path.to_path_buf(), e))?;
    content.push('\n');
    Ok(content)
}
