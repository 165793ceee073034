//! Archive information types.

use crate::format::{CompressionDescriptor, StartFlags, StringEncoding};

/// Information about an opened installer archive.
#[derive(Debug, Clone)]
pub struct ArchiveInfo {
    /// Offset of the start header in the host file.
    pub base_offset: u64,
    /// Start header flags.
    pub flags: StartFlags,
    /// Size of the decompressed header.
    pub header_size: u32,
    /// Declared size of the archive.
    pub archive_size: u32,
    /// Header and data compression.
    pub compression: CompressionDescriptor,
    /// Encoding of the string table.
    pub encoding: StringEncoding,
    /// Number of code units in the string table.
    pub string_char_count: usize,
    /// Number of instructions in the entries table.
    pub instruction_count: usize,
    /// Size of one instruction record.
    pub instruction_size: usize,
}

impl ArchiveInfo {
    /// Returns `true` if the archive is an uninstaller.
    pub fn is_uninstaller(&self) -> bool {
        self.flags.is_uninstaller()
    }

    /// Returns `true` if all data shares one compression stream.
    pub fn is_solid(&self) -> bool {
        self.compression.solid
    }

    /// Returns `"uninstaller"` or `"installer"`.
    pub fn kind(&self) -> &'static str {
        if self.is_uninstaller() {
            "uninstaller"
        } else {
            "installer"
        }
    }
}

/// Result of extracting files from an archive.
#[must_use = "extraction results should be checked for skipped files"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractResult {
    /// Number of files written.
    pub files_extracted: usize,
    /// Number of files rejected by the path filter.
    pub files_filtered: usize,
    /// Number of extract-file instructions repeating an earlier path.
    pub duplicates_skipped: usize,
    /// Total bytes written.
    pub bytes_extracted: u64,
}

impl ExtractResult {
    /// Total number of extract-file instructions seen.
    pub fn files_seen(&self) -> usize {
        self.files_extracted + self.files_filtered + self.duplicates_skipped
    }
}
