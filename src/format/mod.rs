//! Installer archive format constants, definitions, and low-level parsing utilities.
//!
//! This module contains the magic numbers, header layouts and block
//! directory definitions of the installer data appended to a host
//! executable.

pub mod blocks;
pub mod detect;
pub mod reader;
pub mod start_header;

pub use blocks::{BlockDescriptor, BlockDirectory, BlockKind, StringEncoding};
pub use detect::CompressionDescriptor;
pub use start_header::{StartFlags, StartHeader};

/// First signature word of the start header.
pub const SIGNATURE_MARKER: u32 = 0xDEAD_BEEF;

/// The three magic words spelling `NullsoftInst` that follow the marker.
pub const SIGNATURE_MAGIC: [u32; 3] = [0x6C6C_754E, 0x7466_6F73, 0x7473_6E49];

/// Size of the signature (marker plus magic words) in bytes.
pub const SIGNATURE_SIZE: usize = 16;

/// Size of the start header in bytes.
///
/// The start header contains:
/// - 4 bytes: flags
/// - 16 bytes: signature
/// - 4 bytes: decompressed header size
/// - 4 bytes: total archive size
pub const START_HEADER_SIZE: usize = 28;

/// Number of bytes after the start header inspected by compression detection.
pub const DETECT_WINDOW_SIZE: usize = 19;

/// Top bit of a size word: the data that follows is compressed.
pub const COMPRESSED_MASK: u32 = 0x8000_0000;

/// Number of blocks in the header's block directory.
pub const BLOCK_COUNT: usize = 8;

/// Offset of the block directory in the decompressed header.
pub const BLOCK_DIRECTORY_OFFSET: usize = 4;

/// Minimum size of a decompressed header (flags word plus block directory).
pub const MIN_HEADER_SIZE: usize = BLOCK_DIRECTORY_OFFSET + BLOCK_COUNT * 8;

/// Upper bound on the number of instructions in the entries table.
pub const MAX_ENTRY_COUNT: u32 = 1 << 25;

/// Instruction opcodes the extractor acts on.
pub mod opcode {
    /// Set the current output directory.
    pub const SET_OUTPUT_DIR: u32 = 11;
    /// Extract a file into the current output directory.
    pub const EXTRACT_FILE: u32 = 20;
}
