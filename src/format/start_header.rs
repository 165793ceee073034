//! The 28-byte start header that introduces installer data.

use super::{SIGNATURE_MAGIC, SIGNATURE_MARKER, START_HEADER_SIZE};
use crate::format::reader::read_u32_at;
use crate::{Error, Result};

/// Flags word of the start header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartFlags(pub u32);

impl StartFlags {
    /// The archive is an uninstaller.
    pub const UNINSTALL: u32 = 0x01;
    /// The installer runs silently.
    pub const SILENT: u32 = 0x02;
    /// CRC checking was disabled at build time.
    pub const NO_CRC: u32 = 0x04;
    /// CRC checking is forced.
    pub const FORCE_CRC: u32 = 0x08;
    /// Large-format variant with eight instruction parameters.
    pub const BIG_INSTRUCTIONS: u32 = 0x30;

    /// Returns `true` if this is an uninstaller.
    pub fn is_uninstaller(self) -> bool {
        self.0 & Self::UNINSTALL != 0
    }

    /// Returns `true` if the installer is silent.
    pub fn is_silent(self) -> bool {
        self.0 & Self::SILENT != 0
    }

    /// Returns `true` if CRC checking is disabled.
    pub fn no_crc(self) -> bool {
        self.0 & Self::NO_CRC != 0
    }

    /// Returns `true` if CRC checking is forced.
    pub fn force_crc(self) -> bool {
        self.0 & Self::FORCE_CRC != 0
    }

    /// Returns `true` for the large-format variant.
    ///
    /// This variant inserts 8 extra bytes before the compressed header size
    /// and widens every instruction to eight parameters.
    pub fn is_big(self) -> bool {
        self.0 & Self::BIG_INSTRUCTIONS != 0
    }
}

/// The start header found at the archive base.
///
/// Layout (little-endian):
///
/// | Offset | Size | Field |
/// |--------|------|-------|
/// | 0 | 4 | flags |
/// | 4 | 16 | signature (`0xDEADBEEF` + `NullsoftInst`) |
/// | 20 | 4 | decompressed header size |
/// | 24 | 4 | archive size |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartHeader {
    /// Flags word.
    pub flags: StartFlags,
    /// Size of the decompressed header.
    pub header_size: u32,
    /// Size of the whole archive starting at the start header.
    pub archive_size: u32,
}

impl StartHeader {
    /// Interprets `bytes` as a start header candidate.
    ///
    /// Returns `None` unless the flags fit in the low byte and the signature
    /// words match. Sizes are not checked here; see [`validate`](Self::validate).
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < START_HEADER_SIZE {
            return None;
        }
        let word = |i: usize| read_u32_at(bytes, i * 4).ok();

        let flags = word(0)?;
        if flags & !0xFF != 0 || word(1)? != SIGNATURE_MARKER {
            return None;
        }
        for (i, magic) in SIGNATURE_MAGIC.iter().enumerate() {
            if word(2 + i)? != *magic {
                return None;
            }
        }

        Some(Self {
            flags: StartFlags(flags),
            header_size: word(5)?,
            archive_size: word(6)?,
        })
    }

    /// Checks that the declared archive is larger than the start header.
    pub fn validate(&self) -> Result<()> {
        if self.archive_size as usize <= START_HEADER_SIZE {
            return Err(Error::ArchiveTooSmall {
                archive_size: self.archive_size,
            });
        }
        Ok(())
    }

    /// Number of parameters per instruction.
    pub fn instruction_params(&self) -> usize {
        if self.flags.is_big() { 8 } else { 6 }
    }

    /// Size of one instruction record in bytes.
    pub fn instruction_size(&self) -> usize {
        4 + 4 * self.instruction_params()
    }

    /// Serializes the start header.
    pub fn to_bytes(&self) -> [u8; START_HEADER_SIZE] {
        let mut out = [0u8; START_HEADER_SIZE];
        let words = [
            self.flags.0,
            SIGNATURE_MARKER,
            SIGNATURE_MAGIC[0],
            SIGNATURE_MAGIC[1],
            SIGNATURE_MAGIC[2],
            self.header_size,
            self.archive_size,
        ];
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}
