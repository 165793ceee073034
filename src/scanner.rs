//! Signature scanning for installer data.
//!
//! Installers are ordinary executables with the archive appended somewhere
//! after the loader stub, so the start header has to be searched for. The
//! scanner reads the host file in overlapping windows and tests every
//! aligned position as a start header candidate.

use std::io::{Read, Seek, SeekFrom};

use crate::format::reader::read_fully;
use crate::format::{START_HEADER_SIZE, StartHeader};
use crate::{Error, Result};

/// Default scan window size (32 KiB).
pub const DEFAULT_WINDOW_SIZE: usize = 32 * 1024;

/// Options controlling the signature scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Number of bytes read per window.
    pub window_size: usize,
    /// Candidate positions are multiples of this value.
    pub alignment: u64,
    /// Maximum number of bytes to scan, `None` for the whole stream.
    pub search_limit: Option<u64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            alignment: 1,
            search_limit: None,
        }
    }
}

impl ScanOptions {
    /// Creates default scan options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window size.
    pub fn window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Sets the candidate alignment.
    ///
    /// The installer compiler places the archive on a 512-byte boundary, so
    /// `512` is a safe speedup for unmodified installers.
    pub fn alignment(mut self, alignment: u64) -> Self {
        self.alignment = alignment;
        self
    }

    /// Limits the scan to the first `limit` bytes of the stream.
    pub fn search_limit(mut self, limit: u64) -> Self {
        self.search_limit = Some(limit);
        self
    }
}

/// A start header found by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHit {
    /// Offset of the start header in the stream (the archive base).
    pub offset: u64,
    /// The parsed start header.
    pub header: StartHeader,
}

/// Scanner for finding the installer start header in a host file.
pub struct SignatureScanner<'a, R: Read + Seek> {
    reader: &'a mut R,
    options: ScanOptions,
    buffer: Vec<u8>,
    bytes_scanned: u64,
}

impl<'a, R: Read + Seek> SignatureScanner<'a, R> {
    /// Creates a new signature scanner.
    pub fn new(reader: &'a mut R, options: ScanOptions) -> Self {
        Self {
            reader,
            options,
            buffer: Vec::new(),
            bytes_scanned: 0,
        }
    }

    /// Finds the first start header in the stream.
    ///
    /// Returns `Ok(None)` if the stream (or the search limit) is exhausted
    /// without a match.
    pub fn find_first(&mut self) -> Result<Option<ScanHit>> {
        // A window must hold more than one header for the overlap to advance
        let window = self.options.window_size.max(2 * START_HEADER_SIZE);
        let overlap = (START_HEADER_SIZE - 1) as u64;
        let alignment = self.options.alignment.max(1);
        let limit = self.options.search_limit.unwrap_or(u64::MAX);

        self.buffer.resize(window, 0);
        let mut window_start = 0u64;

        while window_start < limit {
            let want = (limit - window_start).min(window as u64) as usize;
            self.reader.seek(SeekFrom::Start(window_start))?;
            let len = read_fully(self.reader, &mut self.buffer[..want])?;
            self.bytes_scanned = window_start + len as u64;

            let data = &self.buffer[..len];
            if let Some(pos) = find_in_window(data, window_start, alignment) {
                let offset = window_start + pos as u64;
                if let Some(header) = StartHeader::parse(&data[pos..]) {
                    log::debug!("start header found at offset {:#x}", offset);
                    return Ok(Some(ScanHit { offset, header }));
                }
            }

            if len < want || len as u64 <= overlap {
                break;
            }
            window_start += len as u64 - overlap;
        }

        Ok(None)
    }

    /// Finds the first start header, failing with
    /// [`Error::SignatureNotFound`] if there is none.
    pub fn find(&mut self) -> Result<ScanHit> {
        self.find_first()?.ok_or(Error::SignatureNotFound {
            scanned: self.bytes_scanned,
        })
    }

    /// Returns the number of bytes examined so far.
    pub fn bytes_scanned(&self) -> u64 {
        self.bytes_scanned
    }
}

/// Returns the first aligned position in `data` holding a start header.
fn find_in_window(data: &[u8], window_start: u64, alignment: u64) -> Option<usize> {
    if data.len() < START_HEADER_SIZE {
        return None;
    }
    let first = (alignment - window_start % alignment) % alignment;
    (first as usize..=data.len() - START_HEADER_SIZE)
        .step_by(alignment as usize)
        .find(|&pos| {
            // Cheap marker test before the full parse
            data[pos + 4..pos + 8] == [0xEF, 0xBE, 0xAD, 0xDE]
                && StartHeader::parse(&data[pos..]).is_some()
        })
}
