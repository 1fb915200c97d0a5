//! Voxelizer - batch-convert SVG icons into blocky, voxel-style SVG.

mod batch;
mod cli;
mod config;
mod core;
mod image;
mod logger;
mod preview;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::preview::PreviewArgs;
use cli::settings::Settings;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let mut settings = Settings::load(&cli);

    match &cli.command {
        Commands::Run {
            input,
            output,
            style,
            session,
        } => {
            settings.apply(style)?;
            cli::run::run_directory(&mut settings, input, output.as_deref(), session)
        }
        Commands::Preview {
            file,
            output,
            watch,
            style,
            session,
        } => {
            settings.apply(style)?;
            let args = PreviewArgs {
                file,
                output: output.as_deref(),
                watch: *watch,
                style,
                session,
            };
            cli::preview::preview_file(&mut settings, &args)
        }
        Commands::Preset { command } => cli::preset::run_preset(&mut settings, command),
    }
}
