//! `run` command: voxelize a whole directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::args::SessionArgs;
use super::settings::Settings;
use crate::batch::{BatchJob, LocalFs, OutputLock, run_batch};
use crate::image::raster::ResvgRasterizer;
use crate::image::voxel::random_source;
use crate::log;
use crate::utils::path::{expand_path, sibling_with_suffix};

/// Suffix of the default output directory.
const OUTPUT_SUFFIX: &str = "_voxelized";

/// Execute the run command.
pub fn run_directory(
    settings: &mut Settings,
    input: &Path,
    output: Option<&Path>,
    session: &SessionArgs,
) -> Result<()> {
    let input = expand_path(input);
    if !input.is_dir() {
        bail!("{} is not a directory", input.display());
    }
    let output = resolve_output(&input, output)?;
    let mut lock = OutputLock::open(&output)?;
    let _held = lock.try_acquire()?;

    let mut rng = random_source(session.seed);
    let job = BatchJob {
        input: &input,
        output: &output,
        config: settings.config(),
        quiet: false,
    };
    let report = run_batch(&LocalFs, &ResvgRasterizer, rng.as_mut(), job)?;
    log!("run"; "{report}");

    settings
        .persist(!session.no_persist)
        .context("failed to save settings")?;

    if report.listed > 0 && report.saved == 0 {
        bail!("no file could be voxelized");
    }
    Ok(())
}

/// `-o` when given, otherwise `<input>_voxelized` next to the input.
fn resolve_output(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    match output {
        Some(path) => Ok(expand_path(path)),
        None => sibling_with_suffix(input, OUTPUT_SUFFIX)
            .with_context(|| format!("cannot derive an output directory from {}", input.display())),
    }
}
