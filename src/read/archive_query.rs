//! Archive query methods.
//!
//! Everything here works on data read while opening; no payload is touched.

use crate::Result;
use crate::format::{CompressionDescriptor, StartHeader};
use crate::script::{Instruction, StringTable};

use super::{Archive, ArchiveInfo, FileEntry, Header};

impl<R> Archive<R> {
    /// Returns information about the archive.
    pub fn info(&self) -> &ArchiveInfo {
        &self.info
    }

    /// Returns the files the installer script places, in script order.
    ///
    /// Each path appears once; later instructions writing the same path are
    /// not listed.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Returns the number of files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the script places no files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry by its normalized path.
    pub fn entry(&self, path: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Returns the start header.
    pub fn start_header(&self) -> &StartHeader {
        &self.start
    }

    /// Returns the detected compression.
    pub fn compression(&self) -> &CompressionDescriptor {
        &self.compression
    }

    /// Returns the decompressed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the header's string table.
    pub fn strings(&self) -> StringTable<'_> {
        self.header.strings()
    }

    /// Iterates over the instructions of the entries table.
    pub fn instructions(&self) -> impl Iterator<Item = Result<Instruction>> + '_ {
        self.header.instructions()
    }
}
