//! File extraction from archives.
//!
//! Extraction replays the installer script, selects files with the path
//! filter, reads each selected payload from its data block and hands the
//! bytes to a [`FileSink`].

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::codec::{self, Codec};
use crate::format::reader::read_fully;
use crate::format::{COMPRESSED_MASK, CompressionDescriptor};
use crate::safety::ResourceLimits;
use crate::script::{ExtractionState, Interpreter, Step};
use crate::{Error, Result};

use super::{Archive, ExtractOptions, ExtractResult, FileEntry, FileSink, FilesystemSink};

impl<R: Read + Seek> Archive<R> {
    /// Extracts files into `dest`.
    ///
    /// The directory is created if missing. Files are validated against
    /// `options.path_safety` before anything is written.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use unnsis::{Archive, ExtractOptions};
    ///
    /// let mut archive = Archive::open_path("setup.exe")?;
    ///
    /// // Extract only DLLs
    /// let options = ExtractOptions::new().filter(r"\.dll$")?;
    /// let result = archive.extract("./output", &options)?;
    /// println!("{} of {} files", result.files_extracted, result.files_seen());
    /// # Ok::<(), unnsis::Error>(())
    /// ```
    pub fn extract(
        &mut self,
        dest: impl AsRef<Path>,
        options: &ExtractOptions,
    ) -> Result<ExtractResult> {
        let mut sink = FilesystemSink::new(dest).path_safety(options.path_safety);
        self.extract_to_sink(&mut sink, options)
    }

    /// Extracts files into a custom sink.
    ///
    /// Stops at the first error; files already handed to the sink stay there.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SolidExtractionUnsupported`] when a selected file
    /// lives in a solid archive, plus any decode, limit or sink error.
    pub fn extract_to_sink<S: FileSink + ?Sized>(
        &mut self,
        sink: &mut S,
        options: &ExtractOptions,
    ) -> Result<ExtractResult> {
        let mut result = ExtractResult::default();
        let mut state = ExtractionState::new();
        let mut interpreter = Interpreter::new(&self.header);

        sink.on_start()?;

        while let Some(step) = interpreter.step(&mut state)? {
            let entry = match step {
                Step::File(entry) => entry,
                Step::Duplicate(_) => {
                    result.duplicates_skipped += 1;
                    continue;
                }
                Step::SetOutputDir(_) | Step::Other(_) => continue,
            };

            if !options.selects(&entry.path) {
                log::trace!("'{}' does not match the filter", entry.path);
                result.files_filtered += 1;
                continue;
            }

            let data = read_payload(
                &mut self.reader,
                self.base,
                &self.compression,
                &entry,
                &options.limits,
            )?;
            sink.write_file(&entry, &data)?;

            result.files_extracted += 1;
            result.bytes_extracted += data.len() as u64;
        }

        sink.on_finish()?;

        log::info!(
            "extracted {} files ({} bytes), {} filtered, {} duplicates skipped",
            result.files_extracted,
            result.bytes_extracted,
            result.files_filtered,
            result.duplicates_skipped
        );
        Ok(result)
    }

    /// Reads the contents of one file.
    ///
    /// Uses the limits the archive was opened with.
    pub fn read_entry(&mut self, entry: &FileEntry) -> Result<Vec<u8>> {
        read_payload(
            &mut self.reader,
            self.base,
            &self.compression,
            entry,
            &self.limits,
        )
    }
}

/// Reads and decodes the data block of `entry`.
///
/// A data block is a size word followed by the payload. The word's top bit
/// marks compressed data; the remaining bits count the stored bytes
/// including the word itself.
fn read_payload<R: Read + Seek>(
    reader: &mut R,
    base: u64,
    compression: &CompressionDescriptor,
    entry: &FileEntry,
    limits: &ResourceLimits,
) -> Result<Vec<u8>> {
    if compression.solid {
        return Err(Error::SolidExtractionUnsupported {
            path: entry.path.clone(),
        });
    }

    let position = base + compression.data_base() + u64::from(entry.data_offset);
    reader.seek(SeekFrom::Start(position))?;

    let mut word = [0u8; 4];
    let n = read_fully(reader, &mut word)?;
    if n < word.len() {
        return Err(Error::TruncatedFileData {
            path: entry.path.clone(),
            expected: 4,
            actual: n as u64,
        });
    }
    let word = u32::from_le_bytes(word);
    let compressed = word & COMPRESSED_MASK != 0;
    let count = word & !COMPRESSED_MASK;
    if count < 4 {
        return Err(Error::CorruptHeader {
            offset: position,
            reason: format!(
                "data block of '{}' declares {} bytes, less than its size word",
                entry.path, count
            ),
        });
    }

    let stored = u64::from(count - 4);
    limits.check_file(&entry.path, stored)?;

    let mut raw = Vec::new();
    reader.by_ref().take(stored).read_to_end(&mut raw)?;
    if (raw.len() as u64) < stored {
        return Err(Error::TruncatedFileData {
            path: entry.path.clone(),
            expected: stored,
            actual: raw.len() as u64,
        });
    }

    if !compressed {
        return Ok(raw);
    }

    let codec = match compression.codec {
        Codec::Deflate | Codec::BZip2 => compression.codec,
        Codec::None | Codec::Lzma => Codec::Lzma,
    };
    let props_len = codec.properties_len();
    if raw.len() < props_len {
        return Err(Error::CorruptHeader {
            offset: position + 4,
            reason: format!("data block of '{}' is too short for {} properties", entry.path, codec),
        });
    }
    let (properties, stream) = raw.split_at(props_len);

    let cap = usize::try_from(limits.max_file_size.saturating_add(1)).unwrap_or(usize::MAX);
    let data = codec::decompress(codec, properties, stream, stream.len() as u64, cap)?;
    limits.check_file(&entry.path, data.len() as u64)?;

    log::trace!(
        "'{}': {} bytes of {} data decoded to {}",
        entry.path,
        stored,
        codec,
        data.len()
    );
    Ok(data)
}
