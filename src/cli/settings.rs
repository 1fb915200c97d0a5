//! Settings lifecycle for one invocation.
//!
//! load (startup) -> style overrides -> run -> persist (exit, if changed)

use std::path::Path;

use anyhow::{Context, Result};

use super::{Cli, StyleArgs};
use crate::config::{ConfigError, JsonStore, SettingsStore, VoxelConfig};
use crate::utils::path::expand_path;
use crate::{debug, log};

/// Effective configuration plus where it came from.
pub struct Settings {
    store: Option<JsonStore>,
    /// Configuration as last read from the store.
    stored: VoxelConfig,
    current: VoxelConfig,
    /// False when the stored file could not be parsed; it is left alone.
    writable: bool,
}

impl Settings {
    /// Load the settings file. Problems are logged and defaults are used.
    pub fn load(cli: &Cli) -> Self {
        let store = match &cli.settings {
            Some(path) => Some(JsonStore::new(expand_path(path))),
            None => JsonStore::default_path().map(JsonStore::new),
        };
        if store.is_none() {
            log!("settings"; "no config directory found, settings will not be kept");
        }
        Self::from_store(store)
    }

    fn from_store(store: Option<JsonStore>) -> Self {
        let mut settings = Self {
            store,
            stored: VoxelConfig::default(),
            current: VoxelConfig::default(),
            writable: true,
        };
        if let Err(e) = settings.read_store() {
            log!("settings"; "{:#}, using defaults", anyhow::Error::from(e));
            settings.writable = false;
        }
        settings
    }

    /// Merge the store onto defaults; on error nothing changes.
    fn read_store(&mut self) -> Result<(), ConfigError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let loaded = store
            .load_onto(&VoxelConfig::default())?
            .map(VoxelConfig::clamped)
            .unwrap_or_default();
        debug!("settings"; "loaded {}", store.path().display());
        self.stored = loaded.clone();
        self.current = loaded;
        Ok(())
    }

    pub fn config(&self) -> &VoxelConfig {
        &self.current
    }

    pub fn path(&self) -> Option<&Path> {
        self.store.as_ref().map(JsonStore::path)
    }

    /// Apply command-line overrides, then clamp and validate.
    pub fn apply(&mut self, style: &StyleArgs) -> Result<()> {
        let mut config = self.current.clone();
        config.apply_style_args(style);
        self.replace(config)
    }

    /// Clamp and validate `config`, and make it current if valid.
    pub fn replace(&mut self, config: VoxelConfig) -> Result<()> {
        let config = config.clamped();
        config.validate().context("invalid style")?;
        self.current = config;
        Ok(())
    }

    /// Re-read the settings file and re-apply `style` on top.
    ///
    /// Returns whether the effective configuration changed. On error the
    /// previous configuration stays in effect.
    pub fn reload(&mut self, style: &StyleArgs) -> Result<bool> {
        let previous = (self.stored.clone(), self.current.clone());
        let result = self
            .read_store()
            .map_err(anyhow::Error::from)
            .and_then(|()| self.apply(style));

        if let Err(e) = result {
            (self.stored, self.current) = previous;
            return Err(e);
        }
        self.writable = true;
        Ok(self.current != previous.1)
    }

    /// Merge a preset file onto the current configuration.
    pub fn merge_preset(&mut self, path: &Path) -> Result<()> {
        let merged = JsonStore::new(path)
            .load_onto(&self.current)?
            .with_context(|| format!("preset {} does not exist", path.display()))?;
        self.replace(merged)
    }

    /// Store the current configuration if it differs from the stored one.
    pub fn persist(&mut self, enabled: bool) -> Result<()> {
        if !enabled || self.current == self.stored {
            return Ok(());
        }
        let Some(store) = &self.store else {
            return Ok(());
        };
        if !self.writable {
            log!("settings"; "not overwriting unreadable {}", store.path().display());
            return Ok(());
        }

        store.save(&self.current)?;
        debug!("settings"; "saved {}", store.path().display());
        self.stored = self.current.clone();
        Ok(())
    }
}
