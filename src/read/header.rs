//! Header decompression and access.
//!
//! The header blob is read once when an archive is opened. Depending on the
//! detected compression it is stored verbatim, decoded from a non-solid
//! stream, or decoded from the front of the solid stream where it is
//! preceded by its own size.

use std::io::{Read, Seek, SeekFrom};

use crate::codec::{self, Codec};
use crate::format::reader::{read_fully, read_u32_at, slice_at};
use crate::format::{BlockDirectory, BlockKind, CompressionDescriptor, StartHeader};
use crate::safety::ResourceLimits;
use crate::script::{Instruction, StringTable};
use crate::{Error, Result};

/// The decompressed header with its validated block directory.
#[derive(Debug, Clone)]
pub struct Header {
    blob: Vec<u8>,
    directory: BlockDirectory,
    instruction_params: usize,
}

impl Header {
    /// Validates `blob` and wraps it.
    ///
    /// `instruction_params` is 6, or 8 for the large instruction format.
    pub fn parse(blob: Vec<u8>, instruction_params: usize) -> Result<Self> {
        let directory = BlockDirectory::parse(&blob, 4 + 4 * instruction_params)?;
        Ok(Self {
            blob,
            directory,
            instruction_params,
        })
    }

    /// Raw header bytes.
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// The block directory.
    pub fn directory(&self) -> &BlockDirectory {
        &self.directory
    }

    /// The string table.
    pub fn strings(&self) -> StringTable<'_> {
        StringTable::new(&self.blob, &self.directory)
    }

    /// Number of instructions in the entries table.
    pub fn instruction_count(&self) -> usize {
        self.directory.entry_count()
    }

    /// Size of one instruction record.
    pub fn instruction_size(&self) -> usize {
        self.directory.entry_size()
    }

    /// Parses instruction `index`.
    pub fn instruction(&self, index: usize) -> Result<Instruction> {
        let range = self
            .directory
            .entry_range(index)
            .ok_or_else(|| Error::CorruptHeader {
                offset: u64::from(self.directory.get(BlockKind::Entries).offset),
                reason: format!(
                    "instruction {} requested, table holds {}",
                    index,
                    self.instruction_count()
                ),
            })?;
        let bytes = slice_at(&self.blob, range.start, range.len())?;
        Instruction::parse(bytes, self.instruction_params)
    }

    /// Iterates over all instructions in order.
    pub fn instructions(&self) -> impl Iterator<Item = Result<Instruction>> + '_ {
        (0..self.instruction_count()).map(move |i| self.instruction(i))
    }
}

/// Reads and decompresses the header blob of the archive at `base`.
///
/// # Errors
///
/// - [`Error::ResourceLimitExceeded`] if the declared header size is above
///   `limits.max_header_size` (checked before reading)
/// - [`Error::TruncatedHeader`] if the stream ends before the blob is complete
/// - [`Error::SolidSizeMismatch`] if a solid stream's size prefix disagrees
///   with the start header
pub fn read_header<R: Read + Seek>(
    reader: &mut R,
    base: u64,
    start: &StartHeader,
    compression: &CompressionDescriptor,
    limits: &ResourceLimits,
) -> Result<Vec<u8>> {
    let header_size = u64::from(start.header_size);
    limits.check_header(header_size)?;
    let size = usize::try_from(header_size)
        .map_err(|_| Error::ResourceLimitExceeded(format!("header of {} bytes", header_size)))?;

    let position = base + compression.header_stream_offset();
    reader.seek(SeekFrom::Start(position))?;
    log::debug!(
        "reading {} header of {} bytes at {:#x}",
        compression,
        size,
        position
    );

    if !compression.solid && !compression.header_is_compressed {
        let mut blob = vec![0u8; size];
        let n = read_fully(reader, &mut blob)?;
        if n < size {
            return Err(Error::TruncatedHeader {
                expected: header_size,
                actual: n as u64,
            });
        }
        return Ok(blob);
    }

    let mut properties = [0u8; 5];
    let properties = &mut properties[..compression.codec.properties_len()];
    let n = read_fully(reader, properties)?;
    if n < properties.len() {
        return Err(Error::TruncatedHeader {
            expected: properties.len() as u64,
            actual: n as u64,
        });
    }

    let available = if compression.solid {
        u64::from(start.archive_size).saturating_sub(properties.len() as u64)
    } else {
        u64::from(compression.non_solid_start_offset).saturating_sub(properties.len() as u64)
    };

    if !compression.solid {
        let blob = codec::decompress(compression.codec, properties, &mut *reader, available, size)?;
        if blob.len() < size {
            return Err(Error::TruncatedHeader {
                expected: header_size,
                actual: blob.len() as u64,
            });
        }
        return Ok(blob);
    }

    let mut decoded =
        codec::decompress(compression.codec, properties, &mut *reader, available, size + 4)?;
    if decoded.len() < 4 {
        return Err(Error::TruncatedHeader {
            expected: header_size + 4,
            actual: decoded.len() as u64,
        });
    }
    let prefix = read_u32_at(&decoded, 0)?;
    if prefix != start.header_size {
        return Err(Error::SolidSizeMismatch {
            expected: start.header_size,
            actual: prefix,
        });
    }
    decoded.drain(..4);
    if decoded.len() < size {
        return Err(Error::TruncatedHeader {
            expected: header_size,
            actual: decoded.len() as u64,
        });
    }
    Ok(decoded)
}
