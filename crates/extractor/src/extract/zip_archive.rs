//! Indexed entries from a zip central directory.

use super::{EntrySource, EntryVisitor};
use crate::error::ExtractError;
use crate::types::{ArchiveEntry, EntryType, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use std::io::{Read, Seek};
use zip::ZipArchive;

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const S_IFLNK: u32 = 0o120000;

pub(crate) struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub(crate) fn new(reader: R) -> Result<Self, ExtractError> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn for_each_entry(&mut self, visit: &mut EntryVisitor<'_>) -> Result<(), ExtractError> {
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index)?;

            let unix_mode = file.unix_mode();
            let file_type = unix_mode.map(|m| m & S_IFMT);
            let kind = if file.is_dir() || file_type == Some(S_IFDIR) {
                EntryType::Directory
            } else if file_type == Some(S_IFLNK) {
                EntryType::Symlink
            } else {
                EntryType::File
            };

            let mode = match unix_mode {
                Some(m) if m & 0o7777 != 0 => m,
                _ if kind == EntryType::Directory => DEFAULT_DIR_MODE,
                _ => DEFAULT_FILE_MODE,
            };
            let meta = ArchiveEntry::new(file.name(), kind, mode, file.size());

            visit(meta, &mut file)?;
        }

        Ok(())
    }
}
