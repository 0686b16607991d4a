//! Filesystem steps around an install: clearing the old one and removing the
//! downloaded archive.

use crate::error::{Result, UpdateError};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Remove every entry directly under `dir`, recursing into directories.
///
/// `dir` itself is kept. Stops at the first failure; entries removed before
/// it stay removed. Returns the number of entries removed.
pub fn clean_dir(dir: &Path) -> Result<usize> {
    let cleanup_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| UpdateError::CleanupFailed { path, source }
    };

    let entries = fs::read_dir(dir).map_err(cleanup_error(dir))?;
    let mut removed = 0;

    for entry in entries {
        let entry = entry.map_err(cleanup_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(cleanup_error(&path))?;

        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(cleanup_error(&path))?;
        } else {
            remove_entry(&path, file_type.is_symlink()).map_err(cleanup_error(&path))?;
        }

        debug!(path = %path.display(), "removed");
        removed += 1;
    }

    Ok(removed)
}

/// Remove a file or a link without following it.
///
/// Windows directory symlinks and junctions only go away with `remove_dir`.
fn remove_entry(path: &Path, is_symlink: bool) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if is_symlink => {
            debug!(path = %path.display(), error = %err, "retrying link removal as directory");
            fs::remove_dir(path)
        }
        result => result,
    }
}

/// Delete a single file.
pub fn delete_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|source| UpdateError::DeleteFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_dir_keeps_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("go");
        fs::create_dir_all(root.join("src/runtime")).unwrap();
        fs::write(root.join("src/runtime/proc.go"), b"package runtime").unwrap();
        fs::write(root.join("VERSION"), b"go1.21.0").unwrap();

        let removed = clean_dir(&root).unwrap();

        assert_eq!(removed, 2);
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_dir_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(clean_dir(temp_dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_clean_dir_missing() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        match clean_dir(&missing) {
            Err(UpdateError::CleanupFailed { path, .. }) => assert_eq!(path, missing),
            other => panic!("Expected CleanupFailed, got: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_dir_does_not_follow_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let outside = temp_dir.path().join("outside");
        let root = temp_dir.path().join("go");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("keep.txt"), b"keep").unwrap();
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        clean_dir(&root).unwrap();

        assert!(outside.join("keep.txt").exists());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_entry_handles_links() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        fs::create_dir_all(&target).unwrap();
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        remove_entry(&link, true).unwrap();

        assert!(fs::symlink_metadata(&link).is_err());
        assert!(target.is_dir());
    }

    #[test]
    fn test_remove_entry_falls_back_to_remove_dir_for_links() {
        // An empty directory refuses remove_file the same way a Windows
        // directory link does
        let temp_dir = TempDir::new().unwrap();
        let dir_like_link = temp_dir.path().join("junction");
        fs::create_dir(&dir_like_link).unwrap();

        remove_entry(&dir_like_link, true).unwrap();

        assert!(!dir_like_link.exists());
    }

    #[test]
    fn test_remove_entry_fails_on_plain_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("dir");
        fs::create_dir_all(dir.join("nested")).unwrap();

        // Without the link flag there is no directory fallback
        assert!(remove_entry(&dir, false).is_err());
        assert!(dir.is_dir());
    }

    #[cfg(windows)]
    #[test]
    fn test_clean_dir_removes_directory_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let outside = temp_dir.path().join("outside");
        let root = temp_dir.path().join("go");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("keep.txt"), b"keep").unwrap();
        fs::create_dir_all(&root).unwrap();
        if std::os::windows::fs::symlink_dir(&outside, root.join("link")).is_err() {
            // Creating symlinks needs developer mode or elevation
            return;
        }

        clean_dir(&root).unwrap();

        assert!(outside.join("keep.txt").exists());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn test_delete_file() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("go1.22.3.tar.gz");
        fs::write(&archive, b"archive").unwrap();

        delete_file(&archive).unwrap();
        assert!(!archive.exists());

        assert!(matches!(
            delete_file(&archive),
            Err(UpdateError::DeleteFailed { .. })
        ));
    }
}
