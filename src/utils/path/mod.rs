//! Path helpers for command-line arguments.
//!
//! - `expand_path` - `~` expansion, then `normalize_path`
//! - `normalize_path` - absolute form (canonicalize + fallback)
//! - `sibling_with_suffix` - `icons/` -> `icons_voxelized/`

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Expand a leading `~` and normalize to an absolute path.
pub fn expand_path(path: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    };
    normalize_path(&expanded)
}

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Sibling of `path` whose last component carries `suffix`.
///
/// Returns `None` for paths without a final component (e.g. `/`).
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    let name = path.file_name()?;
    let mut sibling = OsString::from(name);
    sibling.push(suffix);
    Some(path.with_file_name(sibling))
}
