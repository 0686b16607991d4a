//! Error types for the update workflow.

use extractor::ExtractError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single HTTP request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS or protocol failure.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Reading the response body failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the stages of an update run.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The toolchain binary could not report its version.
    #[error("local toolchain version unavailable: {0}")]
    LocalVersionUnavailable(String),

    /// The toolchain binary could not report its root directory.
    #[error("install directory unavailable: {0}")]
    InstallDirUnavailable(String),

    /// The release feed could not be fetched.
    #[error("failed to fetch release feed {url}: {source}")]
    RemoteFetchFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The release feed was not a JSON array of releases.
    #[error("failed to decode release feed: {0}")]
    FeedDecode(#[from] serde_json::Error),

    /// The feed lists no release flagged stable.
    #[error("No stable version found")]
    NoStableVersionFound,

    /// The download endpoint answered with a non-success status.
    #[error("Download failed, status code: {status_code}")]
    DownloadFailed { status_code: u16 },

    /// The download request itself failed.
    #[error("download request to {url} failed: {source}")]
    DownloadRequest {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The downloaded archive could not be written.
    #[error("failed to write archive {path}: {source}")]
    DownloadWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unpacking the archive failed, including path escapes.
    #[error("extraction failed: {0}")]
    ExtractionFailed(#[from] ExtractError),

    /// Removing the previous installation failed.
    #[error("failed to clean {path}: {source}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing the downloaded archive failed.
    #[error("failed to delete {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    /// Entry name of the offending archive member for a path escape.
    pub fn path_escape_entry(&self) -> Option<&str> {
        match self {
            UpdateError::ExtractionFailed(ExtractError::PathEscape { entry }) => Some(entry),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, UpdateError>;
