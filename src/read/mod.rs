//! Archive reading API for installer archives.
//!
//! This module provides the public API for opening an installer, listing
//! the files its script places, and extracting them.
//!
//! # Example
//!
//! ```rust,no_run
//! use unnsis::read::{Archive, ExtractOptions};
//!
//! // Open an installer
//! let mut archive = Archive::open_path("setup.exe")?;
//!
//! // List files
//! for entry in archive.entries() {
//!     println!("{}", entry.path);
//! }
//!
//! // Extract all files
//! let result = archive.extract("output_dir", &ExtractOptions::default())?;
//! println!("{} files written", result.files_extracted);
//! # Ok::<(), unnsis::Error>(())
//! ```

mod destination;
mod entry;
mod header;
mod info;
mod options;

mod archive_open;
mod archive_query;
mod extraction;

pub use destination::{FileSink, FilesystemSink, MemorySink};
pub use entry::{FileEntry, PathFilter};
pub use header::{Header, read_header};
pub use info::{ArchiveInfo, ExtractResult};
pub use options::{ExtractOptions, OpenOptions};

use crate::format::{CompressionDescriptor, StartHeader};
use crate::safety::ResourceLimits;

/// An opened installer archive.
///
/// The session owns the underlying stream, the start header, the detected
/// compression and the decompressed header. Everything except file payloads
/// is read when the archive is opened.
pub struct Archive<R> {
    pub(crate) reader: R,
    pub(crate) base: u64,
    pub(crate) start: StartHeader,
    pub(crate) compression: CompressionDescriptor,
    pub(crate) header: Header,
    pub(crate) entries: Vec<FileEntry>,
    pub(crate) info: ArchiveInfo,
    pub(crate) limits: ResourceLimits,
}

impl<R> std::fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("base", &self.base)
            .field("compression", &self.compression)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
