//! Error types for installer archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when locating, decoding, and extracting an installer
//! archive, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use unnsis::{Archive, ExtractOptions, Result};
//!
//! fn extract_installer(path: &str, dest: &str) -> Result<()> {
//!     let mut archive = Archive::open_path(path)?;
//!     archive.extract(dest, &ExtractOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Matching Specific Failures
//!
//! ```rust,no_run
//! use unnsis::{Archive, Error};
//!
//! fn describe(path: &str) {
//!     match Archive::open_path(path) {
//!         Ok(archive) => println!("{} instructions", archive.info().instruction_count),
//!         Err(Error::SignatureNotFound { scanned }) => {
//!             eprintln!("No installer data in the first {} bytes", scanned);
//!         }
//!         Err(e) if e.is_corruption() => eprintln!("Damaged installer: {}", e),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! Conditions that only affect how a string is displayed (negative or
//! out-of-range string indices, unknown variables) are never errors; they
//! are rendered as placeholders by the string decoder.

use std::io;

use crate::codec::Codec;
use crate::format::BlockKind;

/// The main error type for installer archive operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Input | [`SignatureNotFound`][Self::SignatureNotFound], [`ArchiveTooSmall`][Self::ArchiveTooSmall], [`BlockOutOfBounds`][Self::BlockOutOfBounds], [`InvalidBlockOrder`][Self::InvalidBlockOrder], [`InvalidStringTable`][Self::InvalidStringTable], [`EntriesTableTooLarge`][Self::EntriesTableTooLarge], [`CorruptHeader`][Self::CorruptHeader] | Not an installer, or a damaged one |
/// | Decode | [`SolidSizeMismatch`][Self::SolidSizeMismatch], [`TruncatedHeader`][Self::TruncatedHeader], [`TruncatedFileData`][Self::TruncatedFileData], [`SolidExtractionUnsupported`][Self::SolidExtractionUnsupported] | Compressed data does not match its declared layout |
/// | Compatibility | [`UnsupportedMethod`][Self::UnsupportedMethod] | Codec feature disabled |
/// | Security | [`PathTraversal`][Self::PathTraversal] | Paths escaping the output directory |
/// | Resources | [`ResourceLimitExceeded`][Self::ResourceLimitExceeded] | Safety limits |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    ///
    /// This is also how a missing source file is reported
    /// ([`std::io::ErrorKind::NotFound`]).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No start header was found in the scanned part of the host file.
    #[error("installer data not found (scanned {scanned} bytes)")]
    SignatureNotFound {
        /// Number of bytes examined before giving up.
        scanned: u64,
    },

    /// The start header declares an archive that cannot hold any data.
    #[error("archive size {archive_size} is not larger than the start header")]
    ArchiveTooSmall {
        /// The declared archive size.
        archive_size: u32,
    },

    /// The header or payload layout is corrupt or truncated.
    ///
    /// The offset is relative to the start of the buffer being parsed
    /// (the decompressed header for header errors, the file for payloads).
    #[error("Corrupt header at offset {offset:#x}: {reason}")]
    CorruptHeader {
        /// The byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// A solid archive's decompressed stream does not start with the
    /// declared header size.
    #[error("solid header size mismatch: expected {expected}, stream declares {actual}")]
    SolidSizeMismatch {
        /// Header size from the start header.
        expected: u32,
        /// Size found at the start of the decompressed stream.
        actual: u32,
    },

    /// The header stream ended before the declared number of bytes was read.
    #[error("truncated header: expected {expected} bytes, got {actual}")]
    TruncatedHeader {
        /// Number of bytes required.
        expected: u64,
        /// Number of bytes actually read.
        actual: u64,
    },

    /// A block directory offset points past the end of the header.
    #[error("{block} block offset {offset:#x} is outside the header ({header_size} bytes)")]
    BlockOutOfBounds {
        /// The offending block.
        block: BlockKind,
        /// Offset stored in the block directory.
        offset: u32,
        /// Size of the decompressed header.
        header_size: u32,
    },

    /// The language tables block starts before the string table.
    #[error("language tables at {lang_tables:#x} precede strings at {strings:#x}")]
    InvalidBlockOrder {
        /// Offset of the string table.
        strings: u32,
        /// Offset of the language tables.
        lang_tables: u32,
    },

    /// The string table violates its size or terminator invariants.
    #[error("invalid string table: {reason}")]
    InvalidStringTable {
        /// Which invariant failed.
        reason: &'static str,
    },

    /// The entries table claims more instructions than the header can hold.
    #[error(
        "entries table too large: {count} entries of {entry_size} bytes, {available} bytes available"
    )]
    EntriesTableTooLarge {
        /// Declared number of instructions.
        count: u32,
        /// Size of one instruction record.
        entry_size: u32,
        /// Bytes available after the entries offset.
        available: u32,
    },

    /// Per-file extraction from a solid archive was requested.
    ///
    /// Solid archives can be listed, but their payloads share one stream and
    /// are not extracted individually.
    #[error("cannot extract '{path}' from a solid archive")]
    SolidExtractionUnsupported {
        /// The file that was about to be extracted.
        path: String,
    },

    /// A file payload ended before its declared size.
    #[error("truncated data for '{path}': expected {expected} bytes, got {actual}")]
    TruncatedFileData {
        /// The file being extracted.
        path: String,
        /// Number of bytes required.
        expected: u64,
        /// Number of bytes actually read.
        actual: u64,
    },

    /// The archive uses a codec that is not enabled in this build.
    ///
    /// # Recovery
    ///
    /// Enable the corresponding feature flag when building:
    /// ```toml
    /// unnsis = { version = "0.1", features = ["lzma", "deflate", "bzip2"] }
    /// ```
    #[error("Unsupported method: {codec}")]
    UnsupportedMethod {
        /// The codec that is not available.
        codec: Codec,
    },

    /// Path traversal detected in an extracted path.
    ///
    /// This is a **security error**: the decoded installer script produced a
    /// path that would escape the output directory (e.g. `../../etc/passwd`).
    #[error("Path traversal detected: {path}")]
    PathTraversal {
        /// The path that contains traversal.
        path: String,
    },

    /// A resource limit was exceeded.
    ///
    /// This protects against corrupt or hostile archives declaring enormous
    /// headers or payloads. See [`ResourceLimits`].
    ///
    /// [`ResourceLimits`]: crate::safety::ResourceLimits
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// An invalid regular expression was given as a path filter.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex {
        /// The invalid regex pattern.
        pattern: String,
        /// Description of why the pattern is invalid.
        reason: String,
    },
}

impl Error {
    /// Returns `true` if this error indicates a security issue.
    pub fn is_security_error(&self) -> bool {
        matches!(self, Error::PathTraversal { .. })
    }

    /// Returns `true` if this is a data corruption error.
    ///
    /// Corruption errors indicate the installer data is damaged or was
    /// misclassified by the compression heuristics.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::CorruptHeader { .. }
                | Error::SolidSizeMismatch { .. }
                | Error::TruncatedHeader { .. }
                | Error::TruncatedFileData { .. }
                | Error::BlockOutOfBounds { .. }
                | Error::InvalidBlockOrder { .. }
                | Error::InvalidStringTable { .. }
                | Error::EntriesTableTooLarge { .. }
                | Error::ArchiveTooSmall { .. }
        )
    }

    /// Returns `true` if this error is related to unsupported features or codecs.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedMethod { .. } | Error::SolidExtractionUnsupported { .. }
        )
    }

    /// Returns the archive path associated with this error, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::SolidExtractionUnsupported { path }
            | Error::TruncatedFileData { path, .. }
            | Error::PathTraversal { path } => Some(path),
            _ => None,
        }
    }
}

/// A specialized Result type for installer archive operations.
pub type Result<T> = std::result::Result<T, Error>;
