//! Small filesystem helpers with path-carrying errors

use crate::error::{BootstrapError, Result};
use std::fs;
use std::path::Path;

/// Create `path` and any missing parents
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| BootstrapError::io(path, e))
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| BootstrapError::io(path, e))
}

/// Write `content`, refusing to replace an existing file unless `overwrite` is set
pub fn write_text(path: &Path, content: &str, overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        return Err(BootstrapError::FileExists {
            path: path.to_path_buf(),
        });
    }
    fs::write(path, content).map_err(|e| BootstrapError::io(path, e))
}

/// Delete a file if present; returns whether something was removed
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BootstrapError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_is_recursive_and_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b").join("c");

        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_write_refuses_to_overwrite_by_default() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("test.txt");
        std::fs::write(&file, "old").unwrap();

        let err = write_text(&file, "new", false).unwrap_err();
        assert!(matches!(err, BootstrapError::FileExists { .. }));
        assert_eq!(read_text(&file).unwrap(), "old");
    }

    #[test]
    fn test_write_overwrites_when_allowed() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("test.txt");
        std::fs::write(&file, "old").unwrap();

        write_text(&file, "new", true).unwrap();
        assert_eq!(read_text(&file).unwrap(), "new");
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("missing.txt");
        let err = read_text(&file).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("poetry.lock");
        std::fs::write(&file, "").unwrap();

        assert!(remove_if_exists(&file).unwrap());
        assert!(!remove_if_exists(&file).unwrap());
    }
}
