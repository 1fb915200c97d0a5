//! Filesystem collaborator for batch runs.

use std::fs;
use std::io;
use std::path::Path;

/// File access used by the batch orchestrator.
pub trait FileSystem {
    /// Names of `.svg` files (any case) directly inside `dir`.
    ///
    /// Order is whatever the directory listing yields.
    fn list_svg_files(&self, dir: &Path) -> io::Result<Vec<String>>;

    fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Write `content`, creating missing parent directories.
    fn write_text(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Create `dir` and its ancestors if absent.
    fn ensure_dir(&self, dir: &Path) -> io::Result<()>;
}

/// The local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn list_svg_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            // Non-UTF-8 names cannot be reported back by name; skip them.
            if let Ok(name) = entry.file_name().into_string()
                && is_svg_name(&name)
            {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }

    fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }
}

/// Case-insensitive `.svg` suffix check.
#[inline]
pub fn is_svg_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".svg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_svg_name() {
        assert!(is_svg_name("icon.svg"));
        assert!(is_svg_name("ICON.SVG"));
        assert!(is_svg_name("logo.Svg"));
        assert!(!is_svg_name("icon.svg.bak"));
        assert!(!is_svg_name("icon.png"));
        assert!(!is_svg_name("svg"));
    }

    #[test]
    fn test_list_svg_files_filters() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("a.svg"), "").unwrap();
        fs::write(dir.join("B.SVG"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::create_dir(dir.join("nested.svg")).unwrap();

        let mut names = LocalFs.list_svg_files(dir).unwrap();
        names.sort();
        assert_eq!(names, ["B.SVG", "a.svg"]);
    }

    #[test]
    fn test_list_missing_dir_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(LocalFs.list_svg_files(&temp.path().join("missing")).is_err());
    }

    #[test]
    fn test_write_text_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out/deep/icon.svg");

        LocalFs.write_text(&path, "<svg/>").unwrap();
        assert_eq!(LocalFs.read_text(&path).unwrap(), "<svg/>");
    }
}
