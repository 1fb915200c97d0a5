//! Voxel style configuration.
//!
//! `VoxelConfig` is the value handed to every synthesis call. It is
//! persisted as a flat JSON object with camelCase keys:
//!
//! ```json
//! {
//!   "gridResolution": 16,
//!   "threshold": 0.3,
//!   "blockType": "square",
//!   "blockColor": "#111827",
//!   "useGradient": false,
//!   "gradientStart": "#111827",
//!   "gradientEnd": "#3b82f6",
//!   "invertOutput": false,
//!   "sizeVariation": 0.0,
//!   "blockRotation": 0
//! }
//! ```
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error.rs   # ConfigError, ConfigDiagnostics
//! ├── store.rs   # SettingsStore (JSON file, partial merge)
//! └── mod.rs     # VoxelConfig (this file)
//! ```

mod error;
pub mod store;

pub use error::{ConfigDiagnostics, ConfigError};
pub use store::{JsonStore, SettingsStore};

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::StyleArgs;
use crate::image::color::Rgb;

/// Accepted grid sizes.
pub const GRID_RANGE: RangeInclusive<u32> = 4..=64;
/// Accepted occupancy thresholds (fraction of full alpha).
pub const THRESHOLD_RANGE: RangeInclusive<f64> = 0.0..=1.0;
/// Accepted random shrink fractions.
pub const SIZE_VARIATION_RANGE: RangeInclusive<f64> = 0.0..=0.9;
/// Accepted block rotations, in degrees.
pub const ROTATION_RANGE: RangeInclusive<u32> = 0..=90;

/// Shape emitted for each drawn cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    #[default]
    Square,
    Circle,
    Line,
}

/// Style settings for one synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoxelConfig {
    /// Cells per side; also the rasterization size.
    pub grid_resolution: u32,
    /// Alpha fraction a sample must exceed to count as filled.
    pub threshold: f64,
    pub block_type: BlockType,
    /// Hex color used when the gradient is off or unusable.
    pub block_color: String,
    pub use_gradient: bool,
    /// Top-left gradient color.
    pub gradient_start: String,
    /// Bottom-right gradient color.
    pub gradient_end: String,
    /// Draw the empty cells instead of the filled ones.
    pub invert_output: bool,
    /// Maximum random shrink per shape.
    pub size_variation: f64,
    /// Degrees; ignored for circles.
    pub block_rotation: u32,
}

impl Default for VoxelConfig {
    fn default() -> Self {
        Self {
            grid_resolution: 16,
            threshold: 0.3,
            block_type: BlockType::Square,
            block_color: "#111827".to_string(),
            use_gradient: false,
            gradient_start: "#111827".to_string(),
            gradient_end: "#3b82f6".to_string(),
            invert_output: false,
            size_variation: 0.0,
            block_rotation: 0,
        }
    }
}

/// Result of merging a JSON object onto a configuration.
#[derive(Debug)]
pub struct Merged {
    pub config: VoxelConfig,
    /// Keys that matched no field.
    pub ignored: Vec<String>,
}

impl VoxelConfig {
    /// Merge a (possibly partial) JSON object onto `self`.
    ///
    /// Keys absent from `content` keep their current values. `origin` is
    /// only used for error messages.
    pub fn merge_json(&self, content: &str, origin: &Path) -> Result<Merged, ConfigError> {
        let parse_err = |e: serde_json::Error| ConfigError::Parse(origin.to_path_buf(), e);

        let Value::Object(overlay) = serde_json::from_str::<Value>(content).map_err(parse_err)? else {
            return Err(ConfigError::NotAnObject(origin.to_path_buf()));
        };

        let mut merged = serde_json::to_value(self).map_err(parse_err)?;
        if let Value::Object(base) = &mut merged {
            base.extend(overlay);
        }

        let mut ignored = Vec::new();
        let config = serde_ignored::deserialize(merged, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(parse_err)?;

        Ok(Merged { config, ignored })
    }

    /// Force every field into its accepted range.
    ///
    /// Non-finite floats fall back to the default value.
    pub fn clamped(mut self) -> Self {
        let defaults = Self::default();
        self.grid_resolution = self
            .grid_resolution
            .clamp(*GRID_RANGE.start(), *GRID_RANGE.end());
        self.threshold = clamp_finite(self.threshold, &THRESHOLD_RANGE, defaults.threshold);
        self.size_variation = clamp_finite(
            self.size_variation,
            &SIZE_VARIATION_RANGE,
            defaults.size_variation,
        );
        self.block_rotation = self.block_rotation.min(*ROTATION_RANGE.end());
        self
    }

    /// Check fields that clamping cannot repair.
    ///
    /// Unparsable gradient endpoints are not an error: synthesis falls
    /// back to `blockColor`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if let Err(e) = self.block_color.parse::<Rgb>() {
            diag.error_with_hint("blockColor", e.to_string(), "use a hex color such as \"#111827\"");
        }
        if !GRID_RANGE.contains(&self.grid_resolution) {
            diag.error(
                "gridResolution",
                format!(
                    "{} is outside {}..={}",
                    self.grid_resolution,
                    GRID_RANGE.start(),
                    GRID_RANGE.end()
                ),
            );
        }

        diag.into_result()
    }

    /// Apply command-line style overrides.
    pub fn apply_style_args(&mut self, args: &StyleArgs) {
        Self::update_option(&mut self.grid_resolution, args.grid.as_ref());
        Self::update_option(&mut self.threshold, args.threshold.as_ref());
        Self::update_option(&mut self.block_type, args.block_type.as_ref());
        Self::update_option(&mut self.block_color, args.block_color.as_ref());
        Self::update_option(&mut self.use_gradient, args.gradient.as_ref());
        Self::update_option(&mut self.gradient_start, args.gradient_start.as_ref());
        Self::update_option(&mut self.gradient_end, args.gradient_end.as_ref());
        Self::update_option(&mut self.invert_output, args.invert.as_ref());
        Self::update_option(&mut self.size_variation, args.size_variation.as_ref());
        Self::update_option(&mut self.block_rotation, args.rotation.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }
}

fn clamp_finite(value: f64, range: &RangeInclusive<f64>, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(*range.start(), *range.end())
    } else {
        fallback
    }
}
