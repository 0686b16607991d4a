//! Error types for archive extraction operations.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extraction operations.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Archive file not found at the specified path.
    #[error("Archive not found: {0}")]
    NotFound(PathBuf),

    /// The archive format could not be determined from the file name.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An entry would resolve outside the destination root.
    ///
    /// Carries the entry name exactly as it appeared in the archive.
    #[error("Illegal path in archive (escapes destination): {entry}")]
    PathEscape {
        /// Original archive entry name
        entry: String,
    },

    /// The archive is corrupted or malformed.
    #[error("Corrupted archive: {0}")]
    Corrupted(String),

    /// An I/O error occurred during extraction.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for ExtractError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => ExtractError::Io(e),
            other => ExtractError::Corrupted(other.to_string()),
        }
    }
}

impl ExtractError {
    /// Whether this error was raised by the path sanitizer.
    pub fn is_path_escape(&self) -> bool {
        matches!(self, ExtractError::PathEscape { .. })
    }
}
