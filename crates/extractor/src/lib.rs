//! # Extractor
//!
//! Prefix-stripping, path-traversal-safe extraction of toolchain release
//! archives.
//!
//! Release archives nest everything under one top-level folder (`go/`). The
//! extractor unpacks only the entries under that folder, strips it, and
//! writes the rest straight into the install directory. Any entry that would
//! resolve outside the install directory aborts the extraction.
//!
//! ## Supported Formats
//!
//! - TAR + gzip (`.tar.gz`, `.tgz`)
//! - ZIP
//!
//! Only directories and regular files are reproduced. Symlinks, hard links
//! and special files are skipped.
//!
//! ## Example
//!
//! ```rust,no_run
//! use extractor::{extract, ArchiveFormat, ExtractionPlan};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let plan = ExtractionPlan::new("go1.22.3.linux-amd64.tar.gz", "go", "/usr/local/go");
//! let stats = extract(&plan, ArchiveFormat::TarGz)?;
//!
//! println!("Extracted {} files ({} bytes)", stats.files_extracted, stats.bytes_written);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod safety;
pub mod types;

// Re-export main types
pub use error::ExtractError;
pub use safety::resolve_safe;
pub use types::{ArchiveEntry, ArchiveFormat, EntryType, ExtractStats, ExtractionPlan};

use std::path::Path;

/// Extract an archive according to `plan`.
///
/// # Errors
///
/// Returns an error if:
/// - The archive file doesn't exist or is corrupted
/// - An entry would escape the destination ([`ExtractError::PathEscape`])
/// - I/O errors occur while writing
pub fn extract(plan: &ExtractionPlan, format: ArchiveFormat) -> Result<ExtractStats, ExtractError> {
    extract::extract_archive(plan, format)
}

/// Extract the entries of a `.tar.gz` under `prefix` into `dest`.
pub fn extract_tar_gz(src: &Path, prefix: &str, dest: &Path) -> Result<ExtractStats, ExtractError> {
    extract(&ExtractionPlan::new(src, prefix, dest), ArchiveFormat::TarGz)
}

/// Extract the entries of a `.zip` under `prefix` into `dest`.
pub fn extract_zip(src: &Path, prefix: &str, dest: &Path) -> Result<ExtractStats, ExtractError> {
    extract(&ExtractionPlan::new(src, prefix, dest), ArchiveFormat::Zip)
}
