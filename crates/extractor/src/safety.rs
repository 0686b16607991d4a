//! Path sanitization for archive extraction.
//!
//! Every entry is re-rooted under the destination directory before anything
//! touches the filesystem. An entry that would land outside the destination
//! (zip-slip) aborts the whole extraction instead of being skipped, because a
//! crafted traversal means the archive is hostile or corrupt.

use crate::error::ExtractError;
use std::path::{Component, Path, PathBuf};

/// Resolve an archive-relative path under `root`, rejecting escapes.
///
/// `relative` uses archive separators; both `/` and `\` are accepted. `.` and
/// `..` segments are resolved lexically. The result is always a strict
/// descendant of the cleaned `root`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use extractor::safety::resolve_safe;
///
/// let path = resolve_safe(Path::new("/opt/go"), "bin/gofmt").unwrap();
/// assert_eq!(path, Path::new("/opt/go/bin/gofmt"));
///
/// // Path traversal attempt - rejected
/// assert!(resolve_safe(Path::new("/opt/go"), "../../etc/passwd").is_err());
/// ```
pub fn resolve_safe(root: &Path, relative: &str) -> Result<PathBuf, ExtractError> {
    let escape = || ExtractError::PathEscape {
        entry: relative.to_string(),
    };

    let mut normalized: Vec<&str> = Vec::new();
    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => {
                // Popping past the root is exactly what a traversal looks like
                if normalized.pop().is_none() {
                    return Err(escape());
                }
            }
            part => {
                // Reject anything the host would treat as a root or drive
                let mut components = Path::new(part).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => normalized.push(part),
                    _ => return Err(escape()),
                }
            }
        }
    }

    if normalized.is_empty() {
        return Err(escape());
    }

    let root = clean_root(root);
    let mut resolved = root.clone();
    resolved.extend(&normalized);

    if resolved == root || !resolved.starts_with(&root) {
        return Err(escape());
    }

    Ok(resolved)
}

/// Lexically clean a destination root: drop `.` components and fold `..`
/// where a preceding normal component exists.
fn clean_root(root: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in root.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                let last_is_normal =
                    matches!(cleaned.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/opt/go")
    }

    #[test]
    fn test_resolve_safe_valid() {
        // Simple relative path
        assert_eq!(
            resolve_safe(&root(), "VERSION").unwrap(),
            Path::new("/opt/go/VERSION")
        );

        // Nested path
        assert_eq!(
            resolve_safe(&root(), "src/runtime/proc.go").unwrap(),
            Path::new("/opt/go/src/runtime/proc.go")
        );

        // Current directory and redundant separators
        assert_eq!(
            resolve_safe(&root(), "./bin//go").unwrap(),
            Path::new("/opt/go/bin/go")
        );

        // Trailing slash on directory entries
        assert_eq!(
            resolve_safe(&root(), "pkg/tool/").unwrap(),
            Path::new("/opt/go/pkg/tool")
        );
    }

    #[test]
    fn test_resolve_safe_backslash_separators() {
        assert_eq!(
            resolve_safe(&root(), "bin\\gofmt.exe").unwrap(),
            Path::new("/opt/go/bin/gofmt.exe")
        );
        assert!(resolve_safe(&root(), "..\\..\\evil").is_err());
    }

    #[test]
    fn test_resolve_safe_inner_parent_stays_inside() {
        // Folds back into the root without leaving it
        assert_eq!(
            resolve_safe(&root(), "src/../bin/go").unwrap(),
            Path::new("/opt/go/bin/go")
        );
    }

    #[test]
    fn test_resolve_safe_zip_slip_variants() {
        // Classic zip-slip
        assert!(resolve_safe(&root(), "../../etc/passwd").is_err());

        // Zip-slip with more levels
        assert!(resolve_safe(&root(), "../../../../../../../etc/passwd").is_err());

        // Zip-slip in middle of path
        assert!(resolve_safe(&root(), "safe/../../etc/passwd").is_err());

        // Zip-slip with current directory obfuscation
        assert!(resolve_safe(&root(), "./../../etc/passwd").is_err());

        // Sibling directory sharing the root's name as a prefix
        assert!(resolve_safe(&root(), "../gopath/bin/evil").is_err());
    }

    #[test]
    fn test_resolve_safe_error_carries_entry() {
        match resolve_safe(&root(), "../escape.txt") {
            Err(ExtractError::PathEscape { entry }) => assert_eq!(entry, "../escape.txt"),
            other => panic!("Expected PathEscape, got: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_safe_rejects_root_itself() {
        assert!(resolve_safe(&root(), ".").is_err());
        assert!(resolve_safe(&root(), "bin/..").is_err());
        assert!(resolve_safe(&root(), "").is_err());
    }

    #[test]
    fn test_resolve_safe_leading_slash_is_rerooted() {
        // "go//etc/passwd" strips to "/etc/passwd", which joins under the root
        assert_eq!(
            resolve_safe(&root(), "/etc/passwd").unwrap(),
            Path::new("/opt/go/etc/passwd")
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_resolve_safe_rejects_drive_prefix() {
        assert!(resolve_safe(Path::new("C:\\go"), "D:/evil.exe").is_err());
    }

    #[test]
    fn test_resolve_safe_relative_root() {
        assert_eq!(
            resolve_safe(Path::new("./install/./go"), "bin/go").unwrap(),
            Path::new("install/go/bin/go")
        );
        assert_eq!(
            resolve_safe(Path::new("."), "bin/go").unwrap(),
            Path::new("./bin/go")
        );
        assert!(resolve_safe(Path::new("."), "../bin/go").is_err());
    }

    #[test]
    fn test_resolve_safe_unicode() {
        assert_eq!(
            resolve_safe(&root(), "doc/日本語/ファイル.txt").unwrap(),
            Path::new("/opt/go/doc/日本語/ファイル.txt")
        );
        assert!(resolve_safe(&root(), "日本語/../../etc/passwd").is_err());
    }

    #[test]
    fn test_clean_root() {
        assert_eq!(clean_root(Path::new("/opt/./go/")), Path::new("/opt/go"));
        assert_eq!(clean_root(Path::new("/opt/sdk/../go")), Path::new("/opt/go"));
        assert_eq!(clean_root(Path::new("../go")), Path::new("../go"));
        assert_eq!(clean_root(Path::new("")), Path::new("."));
    }
}
