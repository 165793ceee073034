//! Extraction sinks.
//!
//! This module provides the [`FileSink`] trait that receives extracted
//! files, along with built-in implementations:
//!
//! - [`FilesystemSink`] - Writes files below an output directory
//! - [`MemorySink`] - Collects files in memory
//!
//! Duplicate suppression and path filtering happen before a sink is called,
//! so a sink sees every selected path exactly once.
//!
//! # Custom Sinks
//!
//! ```rust
//! use unnsis::read::{FileEntry, FileSink};
//!
//! struct SizeCounter(u64);
//!
//! impl FileSink for SizeCounter {
//!     fn write_file(&mut self, _entry: &FileEntry, data: &[u8]) -> unnsis::Result<()> {
//!         self.0 += data.len() as u64;
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::read::FileEntry;
use crate::safety::{PathSafety, validate_extract_path};

/// Trait for extraction targets.
pub trait FileSink {
    /// Receives the complete contents of one file.
    fn write_file(&mut self, entry: &FileEntry, data: &[u8]) -> Result<()>;

    /// Called once before the first file.
    fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once after the instruction stream was fully traversed.
    fn on_finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Filesystem extraction sink.
///
/// Files are written to a temporary sibling and renamed into place, so an
/// output path holds either the complete file or whatever was there before.
/// Parent directories are created as needed.
#[derive(Debug, Clone)]
pub struct FilesystemSink {
    output_dir: PathBuf,
    path_safety: PathSafety,
}

impl FilesystemSink {
    /// Creates a sink writing below `output_dir`.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            path_safety: PathSafety::default(),
        }
    }

    /// Sets the path safety policy.
    pub fn path_safety(mut self, policy: PathSafety) -> Self {
        self.path_safety = policy;
        self
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.unnsis-tmp", name))
}

impl FileSink for FilesystemSink {
    fn on_start(&mut self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    fn write_file(&mut self, entry: &FileEntry, data: &[u8]) -> Result<()> {
        let path = validate_extract_path(&entry.path, &self.output_dir, self.path_safety)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = temp_sibling(&path);
        let written = File::create(&temp)
            .and_then(|mut file| {
                file.write_all(data)?;
                file.flush()
            })
            .and_then(|()| fs::rename(&temp, &path));

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp) {
                log::warn!(
                    "Failed to clean up partial file '{}': {}",
                    temp.display(),
                    cleanup
                );
            }
            return Err(e.into());
        }

        log::debug!("wrote {} ({} bytes)", path.display(), data.len());
        Ok(())
    }
}

/// In-memory extraction sink.
///
/// # Example
///
/// ```rust,no_run
/// use unnsis::Archive;
/// use unnsis::read::{ExtractOptions, MemorySink};
///
/// let mut archive = Archive::open_path("setup.exe")?;
/// let mut sink = MemorySink::new();
/// archive.extract_to_sink(&mut sink, &ExtractOptions::default())?;
///
/// for (path, data) in sink.files() {
///     println!("{}: {} bytes", path, data.len());
/// }
/// # Ok::<(), unnsis::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySink {
    /// Creates an empty memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the extracted files keyed by path.
    pub fn files(&self) -> &HashMap<String, Vec<u8>> {
        &self.files
    }

    /// Takes ownership of the extracted files.
    pub fn into_files(self) -> HashMap<String, Vec<u8>> {
        self.files
    }

    /// Gets the extracted content for a specific path.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Returns the number of extracted files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no files have been extracted.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSink for MemorySink {
    fn write_file(&mut self, entry: &FileEntry, data: &[u8]) -> Result<()> {
        self.files.insert(entry.path.clone(), data.to_vec());
        Ok(())
    }
}
