//! Archive opening methods.
//!
//! Opening runs the whole header pipeline: signature scan, compression
//! detection, header decompression, block directory validation and one
//! interpretation pass to build the file listing.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::Result;
use crate::format::detect::detect_compression;
use crate::format::reader::read_fully;
use crate::format::{DETECT_WINDOW_SIZE, START_HEADER_SIZE};
use crate::scanner::SignatureScanner;
use crate::script::{ExtractionState, Interpreter};

use super::{Archive, ArchiveInfo, Header, OpenOptions, read_header};

impl Archive<BufReader<File>> {
    /// Opens an installer from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or holds no valid
    /// installer archive.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_path_with_options(path, OpenOptions::default())
    }

    /// Opens an installer from a file path with custom options.
    pub fn open_path_with_options(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Archive::open_with_options(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Opens an installer from a reader.
    ///
    /// The reader may hold arbitrary data before the archive (typically the
    /// installer executable itself).
    pub fn open(reader: R) -> Result<Self> {
        Self::open_with_options(reader, OpenOptions::default())
    }

    /// Opens an installer from a reader with custom options.
    pub fn open_with_options(mut reader: R, options: OpenOptions) -> Result<Self> {
        let hit = SignatureScanner::new(&mut reader, options.scan.clone()).find()?;
        let base = hit.offset;
        let start = hit.header;
        start.validate()?;

        reader.seek(SeekFrom::Start(base + START_HEADER_SIZE as u64))?;
        let mut window = [0u8; DETECT_WINDOW_SIZE];
        let n = read_fully(&mut reader, &mut window)?;
        let compression = detect_compression(&start, &window[..n]);

        let blob = read_header(&mut reader, base, &start, &compression, &options.limits)?;
        let header = Header::parse(blob, start.instruction_params())?;

        let entries = Interpreter::new(&header).files(&mut ExtractionState::new())?;

        let directory = header.directory();
        let info = ArchiveInfo {
            base_offset: base,
            flags: start.flags,
            header_size: start.header_size,
            archive_size: start.archive_size,
            compression,
            encoding: directory.encoding(),
            string_char_count: directory.string_char_count(),
            instruction_count: directory.entry_count(),
            instruction_size: directory.entry_size(),
        };

        log::debug!(
            "opened {} at {:#x}: {}, {} instructions, {} files",
            info.kind(),
            base,
            compression,
            info.instruction_count,
            entries.len()
        );

        Ok(Self {
            reader,
            base,
            start,
            compression,
            header,
            entries,
            info,
            limits: options.limits,
        })
    }

    /// Consumes the archive and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
