//! Prefix-stripping archive extraction.
//!
//! Both formats feed one pipeline: an [`EntrySource`] enumerates entries (a
//! forward-only tar stream or the zip central directory) and hands each one,
//! together with a reader over its bytes, to [`write_entry`]. Prefix
//! stripping, path sanitization and the actual filesystem writes live only
//! here.
//!
//! Extraction is not transactional. Entries written before a failure stay on
//! disk; callers treat any error as a failed install.

mod tar_gz;
mod zip_archive;

use crate::error::ExtractError;
use crate::safety::resolve_safe;
use crate::types::{
    ArchiveEntry, ArchiveFormat, EntryType, ExtractStats, ExtractionPlan, DEFAULT_DIR_MODE,
};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, trace};

pub(crate) use tar_gz::TarGzSource;
pub(crate) use zip_archive::ZipSource;

/// Callback invoked once per archive entry with its metadata and contents.
pub(crate) type EntryVisitor<'v> =
    dyn FnMut(ArchiveEntry, &mut dyn Read) -> Result<(), ExtractError> + 'v;

/// A format-specific way of walking the entries of an archive.
pub(crate) trait EntrySource {
    /// Visit every entry in archive order, stopping at the first error.
    fn for_each_entry(&mut self, visit: &mut EntryVisitor<'_>) -> Result<(), ExtractError>;
}

/// Extract the entries under `plan.prefix()` into `plan.destination`.
///
/// Entries outside the prefix are skipped. The prefix directory itself is
/// skipped. An entry resolving outside the destination aborts with
/// [`ExtractError::PathEscape`].
pub fn extract_archive(
    plan: &ExtractionPlan,
    format: ArchiveFormat,
) -> Result<ExtractStats, ExtractError> {
    let start_time = Instant::now();

    // Verify archive exists
    if !plan.source.exists() {
        return Err(ExtractError::NotFound(plan.source.clone()));
    }

    debug!(
        archive = %plan.source.display(),
        prefix = plan.prefix(),
        destination = %plan.destination.display(),
        %format,
        "extracting archive"
    );

    let file = BufReader::new(File::open(&plan.source)?);
    let mut stats = ExtractStats::default();

    match format {
        ArchiveFormat::TarGz => {
            extract_entries(&mut TarGzSource::new(file), plan, &mut stats)?;
        }
        ArchiveFormat::Zip => {
            extract_entries(&mut ZipSource::new(file)?, plan, &mut stats)?;
        }
    }

    stats.duration = start_time.elapsed();
    debug!(
        files = stats.files_extracted,
        directories = stats.directories_created,
        bytes = stats.bytes_written,
        skipped = stats.entries_skipped,
        "extraction finished"
    );
    Ok(stats)
}

fn extract_entries(
    source: &mut dyn EntrySource,
    plan: &ExtractionPlan,
    stats: &mut ExtractStats,
) -> Result<(), ExtractError> {
    source.for_each_entry(&mut |entry: ArchiveEntry, reader: &mut dyn Read| {
        write_entry(plan, &entry, reader, stats)
    })
}

/// Apply one entry to the destination.
fn write_entry(
    plan: &ExtractionPlan,
    entry: &ArchiveEntry,
    reader: &mut dyn Read,
    stats: &mut ExtractStats,
) -> Result<(), ExtractError> {
    let Some(relative) = plan.strip(&entry.name) else {
        trace!(entry = %entry.name, "outside prefix, skipping");
        stats.entries_skipped += 1;
        return Ok(());
    };

    let target = resolve_safe(&plan.destination, relative).map_err(|_| {
        ExtractError::PathEscape {
            entry: entry.name.clone(),
        }
    })?;

    match entry.kind {
        EntryType::Directory => {
            create_dir_all_with_mode(&target, entry.mode)?;
            stats.directories_created += 1;
        }
        EntryType::File => {
            if let Some(parent) = target.parent() {
                create_dir_all_with_mode(parent, DEFAULT_DIR_MODE)?;
            }
            let written = write_file(&target, entry.mode, reader)?;
            trace!(entry = %entry.name, declared = entry.size, bytes = written, "wrote file");
            stats.files_extracted += 1;
            stats.bytes_written += written;
        }
        EntryType::Symlink | EntryType::Hardlink | EntryType::Other => {
            debug!(entry = %entry.name, kind = ?entry.kind, "unsupported entry type, skipping");
            stats.entries_skipped += 1;
        }
    }

    Ok(())
}

/// Create `path` and any missing parents; existing directories are fine.
fn create_dir_all_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path)
}

/// Create or truncate `path` and copy `reader` into it.
fn write_file(path: &Path, mode: u32, reader: &mut dyn Read) -> Result<u64, ExtractError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut out = options.open(path)?;
    let copied = io::copy(reader, &mut out);
    drop(out);
    let written = copied?;

    // The creation mode is masked by the umask; restore the archived bits
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(written)
}
