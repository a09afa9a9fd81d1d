//! File system operations
//!
//! Physical primitives used by the directory operations.

use log::{debug, warn};
use std::fs;
use std::io::{ErrorKind, Result, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Create a directory (and any missing parents)
pub fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
}

/// Check if directory exists
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Check if file exists
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Writes `content` to a uniquely named temporary sibling, then renames it over `path`.
///
/// The temporary file is removed again if any step fails.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Same directory as the target, so the final rename never crosses volumes
    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content)?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Moves a file or directory, replacing a same-named destination file.
///
/// Falls back to copy-then-remove when the two paths are on different volumes.
pub fn move_path(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!(
                "Cross-device move {} -> {}, copying instead",
                from.display(),
                to.display()
            );
            if from.is_dir() {
                copy_tree(from, to)?;
                fs::remove_dir_all(from)
            } else {
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
        }
        Err(e) => Err(e),
    }
}

/// Removes a file or a whole directory tree. A missing target is not an error.
pub fn remove_path(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Nothing to remove at {}", path.display());
            Ok(())
        }
        other => other,
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_atomic_beside_tmp_named_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::create_dir(dir.path().join("meta.json.tmp")).unwrap();

        write_atomic(&path, b"[]").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"[]");
        assert!(dir.path().join("meta.json.tmp").is_dir());
    }

    #[test]
    fn test_move_path_overwrites_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a");
        let to = dir.path().join("b");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"old").unwrap();

        move_path(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"new");
    }

    #[test]
    fn test_remove_missing_path_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_path(&dir.path().join("ghost")).is_ok());
    }

    #[test]
    fn test_remove_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        fs::create_dir_all(tree.join("nested")).unwrap();
        fs::write(tree.join("nested/file"), b"x").unwrap();

        remove_path(&tree).unwrap();

        assert!(!tree.exists());
    }
}
