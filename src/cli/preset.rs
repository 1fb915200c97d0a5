//! `preset` commands: save, load and show style presets.

use std::path::Path;

use anyhow::{Context, Result};

use super::StyleArgs;
use super::args::PresetCommand;
use super::settings::Settings;
use crate::config::{JsonStore, SettingsStore, VoxelConfig};
use crate::log;
use crate::utils::path::expand_path;

/// Execute a preset subcommand.
pub fn run_preset(settings: &mut Settings, command: &PresetCommand) -> Result<()> {
    match command {
        PresetCommand::Save { path, style } => save_preset(settings, &expand_path(path), style),
        PresetCommand::Load { path } => load_preset(settings, &expand_path(path)),
        PresetCommand::Show { path } => {
            let config = show_preset(settings, path.as_deref().map(expand_path).as_deref())?;
            println!("{config}");
            Ok(())
        }
    }
}

/// Write the current style, with `style` on top, to `path`.
///
/// The stored settings are left unchanged.
fn save_preset(settings: &Settings, path: &Path, style: &StyleArgs) -> Result<()> {
    let mut config = settings.config().clone();
    config.apply_style_args(style);
    let config = config.clamped();
    config.validate().context("invalid style")?;

    JsonStore::new(path).save(&config)?;
    log!("preset"; "saved {}", path.display());
    Ok(())
}

/// Merge `path` onto the current settings and store the result.
fn load_preset(settings: &mut Settings, path: &Path) -> Result<()> {
    settings.merge_preset(path)?;
    settings.persist(true).context("failed to save settings")?;
    log!("preset"; "loaded {}", path.display());
    Ok(())
}

/// Pretty JSON of the current settings, or of `path` merged onto them.
fn show_preset(settings: &Settings, path: Option<&Path>) -> Result<String> {
    let config = match path {
        Some(path) => JsonStore::new(path)
            .load_onto(settings.config())?
            .map(VoxelConfig::clamped)
            .with_context(|| format!("preset {} does not exist", path.display()))?,
        None => settings.config().clone(),
    };
    Ok(serde_json::to_string_pretty(&config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::config::BlockType;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn settings_in(temp: &TempDir) -> Settings {
        let path = temp.path().join("settings.json");
        let cli = Cli::try_parse_from(["voxelizer", "--settings", path.to_str().unwrap(), "preset", "show"])
            .unwrap();
        Settings::load(&cli)
    }

    #[test]
    fn test_save_preset_leaves_settings() {
        let temp = TempDir::new().unwrap();
        let settings = settings_in(&temp);
        let preset = temp.path().join("presets/round.json");

        let style = StyleArgs {
            block_type: Some(BlockType::Circle),
            size_variation: Some(0.3),
            ..StyleArgs::default()
        };
        save_preset(&settings, &preset, &style).unwrap();

        let saved = JsonStore::new(&preset)
            .load_onto(&VoxelConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(saved.block_type, BlockType::Circle);
        assert_eq!(saved.size_variation, 0.3);
        assert_eq!(settings.config(), &VoxelConfig::default());
        assert!(!temp.path().join("settings.json").exists());
    }

    #[test]
    fn test_save_preset_rejects_bad_color() {
        let temp = TempDir::new().unwrap();
        let settings = settings_in(&temp);
        let preset = temp.path().join("bad.json");

        let style = StyleArgs {
            block_color: Some("#12345".into()),
            ..StyleArgs::default()
        };
        assert!(save_preset(&settings, &preset, &style).is_err());
        assert!(!preset.exists());
    }

    #[test]
    fn test_load_preset_persists_merge() {
        let temp = TempDir::new().unwrap();
        let mut settings = settings_in(&temp);
        let preset = temp.path().join("grid.json");
        fs::write(&preset, r#"{"gridResolution": 32}"#).unwrap();

        load_preset(&mut settings, &preset).unwrap();
        assert_eq!(settings.config().grid_resolution, 32);

        let reloaded = settings_in(&temp);
        assert_eq!(
            reloaded.config(),
            &VoxelConfig {
                grid_resolution: 32,
                ..VoxelConfig::default()
            }
        );
    }

    #[test]
    fn test_load_malformed_preset_keeps_config() {
        let temp = TempDir::new().unwrap();
        let mut settings = settings_in(&temp);
        let preset = temp.path().join("broken.json");
        fs::write(&preset, "{\"threshold\": 0.5,").unwrap();

        assert!(load_preset(&mut settings, &preset).is_err());
        assert_eq!(settings.config(), &VoxelConfig::default());
    }

    #[test]
    fn test_show_preset() {
        let temp = TempDir::new().unwrap();
        let settings = settings_in(&temp);
        let preset = temp.path().join("gradient.json");
        fs::write(&preset, r#"{"useGradient": true}"#).unwrap();

        let current: serde_json::Value =
            serde_json::from_str(&show_preset(&settings, None).unwrap()).unwrap();
        assert_eq!(current["useGradient"], false);

        let merged: serde_json::Value =
            serde_json::from_str(&show_preset(&settings, Some(&preset)).unwrap()).unwrap();
        assert_eq!(merged["useGradient"], true);
        assert_eq!(merged["gridResolution"], 16);
    }
}
