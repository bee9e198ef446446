use crate::error::{AtddError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Read a user file, attaching the path to any failure.
pub fn read_user_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|cause| AtddError::FileRead {
        path: path.to_path_buf(),
        cause,
    })
}

/// Read a file if it exists and is non-empty.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = read_user_file(path)?;
    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Atomically write `data` to `path` using a tempfile in the same directory.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_failure_carries_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.tsx");
        let err = read_user_file(&path).unwrap_err();
        assert!(matches!(err, AtddError::FileRead { path: ref p, .. } if *p == path));
        assert!(err.to_string().contains("missing.tsx"));
    }

    #[test]
    fn optional_read_treats_empty_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lessons.md");
        assert_eq!(read_optional(&path).unwrap(), None);
        std::fs::write(&path, "").unwrap();
        assert_eq!(read_optional(&path).unwrap(), None);
        std::fs::write(&path, "- rule").unwrap();
        assert_eq!(read_optional(&path).unwrap().as_deref(), Some("- rule"));
    }

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/notes.md");
        atomic_write(&path, b"data").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "data");
    }

    #[test]
    fn write_if_missing_skips_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("existing.txt");
        std::fs::write(&path, b"original").unwrap();
        let written = write_if_missing(&path, b"new").unwrap();
        assert!(!written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }
}
