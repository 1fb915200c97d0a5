//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::BlockType;

/// Batch-convert SVG icons into blocky, voxel-style SVG
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Settings file path (default: platform config dir)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub settings: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Voxelize every SVG file of a directory
    #[command(visible_alias = "r")]
    Run {
        /// Directory containing the source icons
        #[arg(value_hint = clap::ValueHint::DirPath)]
        input: PathBuf,

        /// Output directory (default: <INPUT>_voxelized)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Voxelize a single file, optionally re-rendering on settings changes
    #[command(visible_alias = "p")]
    Preview {
        /// Source icon
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Re-synthesize whenever the settings or source file change
        #[arg(short, long, requires = "output")]
        watch: bool,

        #[command(flatten)]
        style: StyleArgs,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Save, load or show style presets
    Preset {
        #[command(subcommand)]
        command: PresetCommand,
    },
}

/// Preset subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PresetCommand {
    /// Write the current style (with overrides) to a preset file
    Save {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Merge a preset file onto the current settings and keep the result
    Load {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,
    },

    /// Print the current settings, or a preset merged onto them
    Show {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: Option<PathBuf>,
    },
}

/// Style overrides shared by every command that synthesizes.
///
/// Each flag replaces the stored setting for this invocation.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// Cells per side (4-64)
    #[arg(short, long)]
    pub grid: Option<u32>,

    /// Alpha fraction a sample must exceed to be filled (0-1)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Shape drawn for each cell
    #[arg(short, long, value_enum)]
    pub block_type: Option<BlockType>,

    /// Solid fill color (hex)
    #[arg(long)]
    pub block_color: Option<String>,

    /// Use a diagonal gradient instead of the solid color
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub gradient: Option<bool>,

    /// Gradient color at the top-left cell (hex)
    #[arg(long)]
    pub gradient_start: Option<String>,

    /// Gradient color at the bottom-right cell (hex)
    #[arg(long)]
    pub gradient_end: Option<String>,

    /// Draw the empty cells instead of the filled ones
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub invert: Option<bool>,

    /// Maximum random shrink per shape (0-0.9)
    #[arg(long)]
    pub size_variation: Option<f64>,

    /// Block rotation in degrees (0-90, ignored for circles)
    #[arg(short, long)]
    pub rotation: Option<u32>,
}

/// Per-invocation behavior that is never persisted.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Seed the size jitter for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not store changed settings on exit
    #[arg(long)]
    pub no_persist: bool,
}
