//! Advisory lock on an output directory, held for a whole run.
//!
//! Two `run` processes pointed at the same output would interleave their
//! writes. The lock file stays in place after a run; only the OS lock on
//! it matters.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fd_lock::{RwLock, RwLockWriteGuard};

use super::BatchError;

/// Lock file name inside the output directory. Not an `.svg`, so never listed.
pub const LOCK_FILE: &str = ".voxelizer.lock";

pub struct OutputLock {
    dir: PathBuf,
    file: RwLock<File>,
}

impl OutputLock {
    /// Create `dir` if needed and open its lock file.
    pub fn open(dir: &Path) -> Result<Self, BatchError> {
        let dir_err = |e| BatchError::OutputDir(dir.to_path_buf(), e);
        fs::create_dir_all(dir).map_err(dir_err)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE))
            .map_err(dir_err)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            file: RwLock::new(file),
        })
    }

    /// Take the exclusive lock without waiting. Released when the guard drops.
    pub fn try_acquire(&mut self) -> Result<RwLockWriteGuard<'_, File>, BatchError> {
        let dir = &self.dir;
        self.file
            .try_write()
            .map_err(|e| BatchError::Busy(dir.clone(), e))
    }
}
