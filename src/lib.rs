//! # unnsis
//!
//! A pure-Rust reader and extractor for NSIS installer archives.
//!
//! An installer is an executable with an archive appended to it. This crate
//! finds the archive inside the host file, works out how its header is
//! compressed, decodes the header's block directory and string table, and
//! replays the installer script far enough to learn where each packaged file
//! is written. Files can then be listed or extracted.
//!
//! ## Quick Start
//!
//! ### Listing and Extracting
//!
//! ```rust,no_run
//! use unnsis::{Archive, ExtractOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let mut archive = Archive::open_path("setup.exe")?;
//!
//!     println!(
//!         "{} with {} instructions",
//!         archive.info().compression,
//!         archive.info().instruction_count
//!     );
//!     for entry in archive.entries() {
//!         println!("{}", entry.path);
//!     }
//!
//!     archive.extract("./output", &ExtractOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ### Filtering
//!
//! ```rust,no_run
//! use unnsis::{Archive, ExtractOptions};
//!
//! let mut archive = Archive::open_path("setup.exe")?;
//! let options = ExtractOptions::new().filter(r"^bin/.*\.dll$")?;
//! let result = archive.extract("./output", &options)?;
//! println!("{} extracted, {} filtered", result.files_extracted, result.files_filtered);
//! # Ok::<(), unnsis::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `lzma` | Yes | LZMA decompression |
//! | `deflate` | Yes | Deflate decompression |
//! | `bzip2` | Yes | BZip2 decompression |
//! | `cli` | No | Command-line interface tool |
//!
//! ## Supported Archives
//!
//! Headers and file data may be stored or compressed with LZMA, Deflate or
//! BZip2. Files of solid archives, where every payload shares the header's
//! compression stream, can be listed but not extracted.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`:
//!
//! ```rust,no_run
//! use unnsis::{Archive, Error};
//!
//! fn open_installer(path: &str) -> unnsis::Result<()> {
//!     match Archive::open_path(path) {
//!         Ok(archive) => {
//!             println!("Installer places {} files", archive.len());
//!             Ok(())
//!         }
//!         Err(Error::SignatureNotFound { scanned }) => {
//!             eprintln!("No installer data in the first {} bytes", scanned);
//!             Ok(())
//!         }
//!         Err(e) if e.is_corruption() => {
//!             eprintln!("Damaged installer: {}", e);
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! ## Safety and Resource Limits
//!
//! Installer scripts are untrusted input:
//!
//! - **Path traversal protection**: paths are validated against the output
//!   directory before writing
//! - **Resource limits**: header and per-file sizes are capped
//!
//! ```rust,no_run
//! use unnsis::{ExtractOptions, PathSafety, ResourceLimits};
//!
//! let options = ExtractOptions::new()
//!     .path_safety(PathSafety::Strict)
//!     .limits(ResourceLimits::new().max_file_size(256 << 20));
//! ```
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod codec;
pub mod error;
pub mod format;
pub mod read;
pub mod safety;
pub mod scanner;
pub mod script;

pub use error::{Error, Result};

// Re-export reading API at crate root for convenience
pub use read::{
    Archive, ArchiveInfo, ExtractOptions, ExtractResult, FileEntry, FileSink, FilesystemSink,
    MemorySink, OpenOptions, PathFilter,
};

// Re-export safety utilities
pub use safety::{PathSafety, ResourceLimits, validate_extract_path};

pub use codec::Codec;
pub use scanner::{ScanOptions, SignatureScanner};
