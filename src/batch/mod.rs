//! Batch orchestration: a directory of icons in, voxelized icons out.
//!
//! Phases:
//! - **Scan** - list `.svg` names in the input directory
//! - **Process** - read, rasterize, synthesize one file at a time
//! - **Save** - create the output directory, write every success
//!
//! A failure on one file is recorded on its item and never stops the
//! batch. Only a failure to create the output directory ends the save
//! phase early.

mod fs;
mod lock;

pub use fs::{FileSystem, LocalFs};
pub use lock::OutputLock;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::VoxelConfig;
use crate::image::raster::{Rasterizer, RenderError};
use crate::image::voxel::{RandomSource, synthesize};
use crate::logger::ProgressLine;
use crate::utils::plural_count;
use crate::{debug, log};

/// Why a file (or the whole save phase) failed.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot list {}: {}", .0.display(), .1)]
    List(PathBuf, #[source] io::Error),

    #[error("cannot read {}: {}", .0.display(), .1)]
    Read(PathBuf, #[source] io::Error),

    #[error("cannot render {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: RenderError,
    },

    #[error("cannot write {}: {}", .0.display(), .1)]
    Write(PathBuf, #[source] io::Error),

    #[error("cannot create output directory {}: {}", .0.display(), .1)]
    OutputDir(PathBuf, #[source] io::Error),

    #[error("another batch is writing to {}: {}", .0.display(), .1)]
    Busy(PathBuf, #[source] io::Error),
}

/// Per-file outcome.
#[derive(Debug)]
pub enum BatchStatus {
    Pending,
    /// Synthesized markup, waiting to be saved.
    Succeeded(String),
    Failed(BatchError),
}

#[derive(Debug)]
pub struct BatchItem {
    pub name: String,
    pub status: BatchStatus,
}

impl BatchItem {
    fn pending(name: String) -> Self {
        Self {
            name,
            status: BatchStatus::Pending,
        }
    }
}

/// Ordered items of one run.
#[derive(Debug, Default)]
pub struct Batch {
    items: Vec<BatchItem>,
}

impl Batch {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            items: names.into_iter().map(BatchItem::pending).collect(),
        }
    }

    /// List the `.svg` files of `dir` as pending items.
    pub fn scan(fs: &dyn FileSystem, dir: &Path) -> Result<Self, BatchError> {
        let names = fs
            .list_svg_files(dir)
            .map_err(|e| BatchError::List(dir.to_path_buf(), e))?;
        Ok(Self::new(names))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Succeeded(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&BatchStatus) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.status)).count()
    }

    /// Resolve every pending item, in order.
    pub fn process(
        &mut self,
        fs: &dyn FileSystem,
        rasterizer: &dyn Rasterizer,
        rng: &mut dyn RandomSource,
        input: &Path,
        config: &VoxelConfig,
        quiet: bool,
    ) {
        let total = self.items.len();
        let progress = (!quiet).then(|| ProgressLine::new("run", &[("svg", total)]));

        for (index, item) in self.items.iter_mut().enumerate() {
            if !matches!(item.status, BatchStatus::Pending) {
                continue;
            }
            debug!("run"; "processing ({}/{}): {}", index + 1, total, item.name);

            item.status = match voxelize_file(fs, rasterizer, rng, input, &item.name, config) {
                Ok(svg) => BatchStatus::Succeeded(svg),
                Err(e) => {
                    log!("failed"; "{e}");
                    BatchStatus::Failed(e)
                }
            };

            if let Some(p) = &progress {
                p.inc("svg");
            }
        }

        if let Some(p) = progress {
            p.finish();
        }
    }

    /// Write every succeeded item into `output`. Returns the number written.
    ///
    /// A write failure drops that file from the count; failing to create
    /// `output` itself aborts with nothing written.
    pub fn save(&self, fs: &dyn FileSystem, output: &Path) -> Result<usize, BatchError> {
        fs.ensure_dir(output)
            .map_err(|e| BatchError::OutputDir(output.to_path_buf(), e))?;

        let mut saved = 0;
        for item in &self.items {
            let BatchStatus::Succeeded(svg) = &item.status else {
                continue;
            };
            let path = output.join(&item.name);
            match fs.write_text(&path, svg) {
                Ok(()) => saved += 1,
                Err(e) => log!("failed"; "{}", BatchError::Write(path, e)),
            }
        }
        Ok(saved)
    }
}

/// Read, rasterize at the grid size, synthesize.
fn voxelize_file(
    fs: &dyn FileSystem,
    rasterizer: &dyn Rasterizer,
    rng: &mut dyn RandomSource,
    input: &Path,
    name: &str,
    config: &VoxelConfig,
) -> Result<String, BatchError> {
    let path = input.join(name);
    let markup = fs.read_text(&path).map_err(|e| BatchError::Read(path, e))?;
    let buffer = rasterizer
        .rasterize(&markup, config.grid_resolution)
        .map_err(|source| BatchError::Render {
            name: name.to_string(),
            source,
        })?;
    Ok(synthesize(&buffer, config, rng))
}

/// Inputs of one batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchJob<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub config: &'a VoxelConfig,
    /// Suppress the progress line.
    pub quiet: bool,
}

/// Final counts of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub listed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub saved: usize,
    pub output: PathBuf,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {}, {} ok, saved {} to {}",
            plural_count(self.listed, "file"),
            self.succeeded,
            self.saved,
            self.output.display()
        )?;
        if self.failed > 0 {
            write!(f, " ({} failed)", self.failed)?;
        }
        Ok(())
    }
}

/// Scan, process and save a whole directory.
pub fn run_batch(
    fs: &dyn FileSystem,
    rasterizer: &dyn Rasterizer,
    rng: &mut dyn RandomSource,
    job: BatchJob<'_>,
) -> Result<BatchReport, BatchError> {
    let mut batch = Batch::scan(fs, job.input)?;
    if batch.is_empty() {
        log!("run"; "no svg files in {}", job.input.display());
    } else if !job.quiet {
        log!("run"; "found {} in {}", plural_count(batch.len(), "svg file"), job.input.display());
    }

    batch.process(fs, rasterizer, rng, job.input, job.config, job.quiet);
    let saved = batch.save(fs, job.output)?;

    Ok(BatchReport {
        listed: batch.len(),
        succeeded: batch.succeeded(),
        failed: batch.failed(),
        saved,
        output: job.output.to_path_buf(),
    })
}
