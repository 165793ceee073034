//! Block directory of the decompressed header.
//!
//! The header starts with a flags word followed by eight `(offset, count)`
//! descriptors. Offsets are relative to the start of the decompressed
//! header. Only the entries, strings and language tables blocks are needed
//! for extraction, and only those are bounds-checked.

use std::fmt;
use std::ops::Range;

use super::reader::{read_u16_at, read_u32_at};
use super::{BLOCK_COUNT, BLOCK_DIRECTORY_OFFSET, MAX_ENTRY_COUNT, MIN_HEADER_SIZE};
use crate::{Error, Result};

/// The blocks of the header, in directory order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Installer pages.
    Pages,
    /// Installer sections.
    Sections,
    /// Instruction records.
    Entries,
    /// String table.
    Strings,
    /// Language tables.
    LangTables,
    /// Control colors.
    CtlColors,
    /// Background font.
    BgFont,
    /// Extra data.
    Data,
}

impl BlockKind {
    /// All blocks in directory order.
    pub const ALL: [BlockKind; BLOCK_COUNT] = [
        BlockKind::Pages,
        BlockKind::Sections,
        BlockKind::Entries,
        BlockKind::Strings,
        BlockKind::LangTables,
        BlockKind::CtlColors,
        BlockKind::BgFont,
        BlockKind::Data,
    ];

    /// Returns the block's name.
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Pages => "pages",
            BlockKind::Sections => "sections",
            BlockKind::Entries => "entries",
            BlockKind::Strings => "strings",
            BlockKind::LangTables => "language tables",
            BlockKind::CtlColors => "control colors",
            BlockKind::BgFont => "background font",
            BlockKind::Data => "data",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location of one block inside the decompressed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockDescriptor {
    /// Offset from the start of the header.
    pub offset: u32,
    /// Number of records in the block.
    pub count: u32,
}

/// Character width of the string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    /// One byte per code unit (ANSI installers).
    Narrow,
    /// Two bytes per code unit, UTF-16LE (Unicode installers).
    Wide,
}

impl StringEncoding {
    /// Size of one code unit in bytes.
    pub fn char_width(self) -> usize {
        match self {
            StringEncoding::Narrow => 1,
            StringEncoding::Wide => 2,
        }
    }
}

impl fmt::Display for StringEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StringEncoding::Narrow => "ANSI",
            StringEncoding::Wide => "Unicode",
        })
    }
}

/// Parsed and validated block directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDirectory {
    blocks: [BlockDescriptor; BLOCK_COUNT],
    encoding: StringEncoding,
    entry_size: usize,
}

impl BlockDirectory {
    /// Parses the block directory of `header` and validates it.
    ///
    /// `entry_size` is the size of one instruction record (28 or 36 bytes).
    ///
    /// # Errors
    ///
    /// Fails on the first violated invariant, in this order: block offsets
    /// inside the header, language tables after strings, string table size
    /// and terminator, entries table size.
    pub fn parse(header: &[u8], entry_size: usize) -> Result<Self> {
        if header.len() < MIN_HEADER_SIZE {
            return Err(Error::CorruptHeader {
                offset: 0,
                reason: format!(
                    "header is {} bytes, block directory needs {}",
                    header.len(),
                    MIN_HEADER_SIZE
                ),
            });
        }

        let mut blocks = [BlockDescriptor::default(); BLOCK_COUNT];
        for (i, block) in blocks.iter_mut().enumerate() {
            let at = BLOCK_DIRECTORY_OFFSET + i * 8;
            *block = BlockDescriptor {
                offset: read_u32_at(header, at)?,
                count: read_u32_at(header, at + 4)?,
            };
        }

        let header_size = u32::try_from(header.len()).map_err(|_| {
            Error::ResourceLimitExceeded(format!("header of {} bytes", header.len()))
        })?;
        let get = |kind: BlockKind| blocks[kind as usize];

        for kind in [BlockKind::Entries, BlockKind::Strings, BlockKind::LangTables] {
            let offset = get(kind).offset;
            if offset > header_size {
                return Err(Error::BlockOutOfBounds {
                    block: kind,
                    offset,
                    header_size,
                });
            }
        }

        let strings = get(BlockKind::Strings).offset;
        let lang_tables = get(BlockKind::LangTables).offset;
        if lang_tables < strings {
            return Err(Error::InvalidBlockOrder {
                strings,
                lang_tables,
            });
        }

        let table = &header[strings as usize..lang_tables as usize];
        if table.len() < 2 {
            return Err(Error::InvalidStringTable {
                reason: "table shorter than 2 bytes",
            });
        }
        if table[table.len() - 1] != 0 {
            return Err(Error::InvalidStringTable {
                reason: "table is not zero-terminated",
            });
        }
        let encoding = if read_u16_at(table, 0)? == 0 {
            StringEncoding::Wide
        } else {
            StringEncoding::Narrow
        };
        if encoding == StringEncoding::Wide
            && (table.len() % 2 != 0 || table[table.len() - 2] != 0)
        {
            return Err(Error::InvalidStringTable {
                reason: "wide table is not terminated by a zero code unit",
            });
        }

        let entries = get(BlockKind::Entries);
        let available = header_size - entries.offset;
        if entries.count > MAX_ENTRY_COUNT
            || u64::from(entries.count) * entry_size as u64 > u64::from(available)
        {
            return Err(Error::EntriesTableTooLarge {
                count: entries.count,
                entry_size: entry_size as u32,
                available,
            });
        }

        let directory = Self {
            blocks,
            encoding,
            entry_size,
        };
        log::debug!(
            "block directory: {} entries at {:#x}, {} string table of {} bytes at {:#x}",
            entries.count,
            entries.offset,
            encoding,
            table.len(),
            strings
        );
        Ok(directory)
    }

    /// Returns the descriptor of `kind`.
    pub fn get(&self, kind: BlockKind) -> BlockDescriptor {
        self.blocks[kind as usize]
    }

    /// Encoding of the string table.
    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    /// Byte range of the string table in the header.
    pub fn strings_range(&self) -> Range<usize> {
        self.get(BlockKind::Strings).offset as usize..self.get(BlockKind::LangTables).offset as usize
    }

    /// Number of code units in the string table.
    pub fn string_char_count(&self) -> usize {
        self.strings_range().len() / self.encoding.char_width()
    }

    /// Number of instruction records.
    pub fn entry_count(&self) -> usize {
        self.get(BlockKind::Entries).count as usize
    }

    /// Size of one instruction record.
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// Byte range of instruction `index` in the header.
    ///
    /// Returns `None` if `index` is past the entries table.
    pub fn entry_range(&self, index: usize) -> Option<Range<usize>> {
        if index >= self.entry_count() {
            return None;
        }
        let start = index
            .checked_mul(self.entry_size)?
            .checked_add(self.get(BlockKind::Entries).offset as usize)?;
        Some(start..start.checked_add(self.entry_size)?)
    }
}
