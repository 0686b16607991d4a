//! Type definitions for archive extraction.

use crate::error::ExtractError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default mode for directories created during extraction.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Default mode for files whose archive entry declares none.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Entry type as declared by the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Hard link
    Hardlink,
    /// Other special file types (device, fifo, etc.)
    Other,
}

/// Individual entry within an archive, derived while scanning it.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Archive-relative name with forward slashes
    pub name: String,

    /// Declared entry type
    pub kind: EntryType,

    /// Permission bits (`0o7777` mask) to apply to the extracted entry
    pub mode: u32,

    /// Uncompressed size in bytes
    pub size: u64,
}

impl ArchiveEntry {
    /// Build an entry, normalizing `name` to forward slashes.
    pub fn new(name: &str, kind: EntryType, mode: u32, size: u64) -> Self {
        Self {
            name: name.replace('\\', "/"),
            kind,
            mode: mode & 0o7777,
            size,
        }
    }
}

/// Archive formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// gzip-compressed tarball
    TarGz,
    /// zip with a central directory
    Zip,
}

impl ArchiveFormat {
    /// File suffix used by release archives of this format.
    pub fn suffix(self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => ".tar.gz",
            ArchiveFormat::Zip => ".zip",
        }
    }

    /// Detect the format from a file name.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| ExtractError::UnsupportedFormat(path.display().to_string()))?;

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(ArchiveFormat::TarGz)
        } else if name.ends_with(".zip") {
            Ok(ArchiveFormat::Zip)
        } else {
            Err(ExtractError::UnsupportedFormat(name))
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::TarGz => f.write_str("TAR.GZ"),
            ArchiveFormat::Zip => f.write_str("ZIP"),
        }
    }
}

/// What to extract, and where.
///
/// Built once per install and discarded after extraction.
#[derive(Debug, Clone)]
pub struct ExtractionPlan {
    /// Archive on disk
    pub source: PathBuf,

    /// Top-level folder to re-root, always ending in `/`
    prefix: String,

    /// Directory the stripped entries land in
    pub destination: PathBuf,
}

impl ExtractionPlan {
    pub fn new(
        source: impl Into<PathBuf>,
        prefix: &str,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            prefix: normalize_prefix(prefix),
            destination: destination.into(),
        }
    }

    /// The normalized top-level prefix (`"go"` becomes `"go/"`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Strip the prefix from an entry name.
    ///
    /// Returns `None` for names outside the prefix and for the prefix
    /// directory itself.
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.prefix.as_str())
            .filter(|rest| !rest.is_empty())
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let mut prefix = prefix.replace('\\', "/");
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    prefix
}

/// Statistics about a completed extraction operation.
///
/// Serializes to JSON with `duration` in milliseconds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractStats {
    /// Number of regular files written
    pub files_extracted: u64,

    /// Number of directory entries materialized
    pub directories_created: u64,

    /// Total bytes written to disk
    pub bytes_written: u64,

    /// Entries outside the prefix or of an unsupported type
    pub entries_skipped: u64,

    /// Wall-clock time spent extracting
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

// Helper module for Duration serialization
mod duration_serde {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }
}
