//! Forward-only tar stream behind a gzip decoder.

use super::{EntrySource, EntryVisitor};
use crate::error::ExtractError;
use crate::types::{ArchiveEntry, EntryType, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use flate2::read::GzDecoder;
use std::io::Read;

pub(crate) struct TarGzSource<R: Read> {
    archive: tar::Archive<GzDecoder<R>>,
}

impl<R: Read> TarGzSource<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            archive: tar::Archive::new(GzDecoder::new(reader)),
        }
    }
}

impl<R: Read> EntrySource for TarGzSource<R> {
    fn for_each_entry(&mut self, visit: &mut EntryVisitor<'_>) -> Result<(), ExtractError> {
        let entries = self.archive.entries().map_err(corrupted)?;

        for entry in entries {
            let mut entry = entry.map_err(corrupted)?;

            let kind = entry_kind(entry.header().entry_type());
            // Directories are always created 0755, whatever the header says
            let mode = match kind {
                EntryType::Directory => DEFAULT_DIR_MODE,
                _ => entry.header().mode().unwrap_or(DEFAULT_FILE_MODE),
            };
            let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let meta = ArchiveEntry::new(&name, kind, mode, entry.size());

            visit(meta, &mut entry)?;
        }

        Ok(())
    }
}

fn entry_kind(entry_type: tar::EntryType) -> EntryType {
    match entry_type {
        tar::EntryType::Regular | tar::EntryType::Continuous => EntryType::File,
        tar::EntryType::Directory => EntryType::Directory,
        tar::EntryType::Symlink => EntryType::Symlink,
        tar::EntryType::Link => EntryType::Hardlink,
        _ => EntryType::Other,
    }
}

fn corrupted(err: std::io::Error) -> ExtractError {
    ExtractError::Corrupted(format!("tar.gz stream: {}", err))
}
