//! Shared test utilities for integration tests.
//!
//! The [`InstallerBuilder`] assembles synthetic installers byte by byte:
//! an arbitrary host prefix, the start header, the (optionally compressed)
//! script header and the file data blocks.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use unnsis::format::{StartFlags, StartHeader};

/// Variable index of `$INSTDIR`.
const VAR_INSTDIR: u16 = 21;
/// Variable index of `$OUTDIR`.
const VAR_OUTDIR: u16 = 22;

/// How the script header is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Header stored verbatim after its size word.
    Stored,
    /// Header LZMA-compressed on its own; file blocks follow it.
    LzmaNonSolid,
    /// Header and file blocks share one LZMA stream.
    LzmaSolid,
}

/// Builder for synthetic installer files.
pub struct InstallerBuilder {
    prefix: Vec<u8>,
    flags: u32,
    wide: bool,
    mode: HeaderMode,
    compress_files: bool,
    strings: Vec<u16>,
    instructions: Vec<Vec<u32>>,
    data: Vec<u8>,
    header_patches: Vec<(usize, Vec<u8>)>,
    solid_prefix: Option<u32>,
}

impl Default for InstallerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstallerBuilder {
    /// Creates a builder for a stored, narrow-string installer with a
    /// 512-byte host prefix.
    pub fn new() -> Self {
        let mut builder = Self {
            prefix: (0..512u32).map(|i| (i * 7 % 251) as u8).collect(),
            flags: 0,
            wide: false,
            mode: HeaderMode::Stored,
            compress_files: false,
            strings: vec![0],
            instructions: Vec::new(),
            data: Vec::new(),
            header_patches: Vec::new(),
            solid_prefix: None,
        };
        // A non-empty first string keeps narrow tables from looking wide
        builder.add_string("Setup");
        builder
    }

    /// Replaces the host prefix.
    pub fn prefix(mut self, prefix: Vec<u8>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Sets the start header flags.
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Uses a UTF-16 string table.
    pub fn wide(mut self) -> Self {
        assert!(self.instructions.is_empty(), "call wide() before adding instructions");
        self.wide = true;
        self
    }

    /// Sets how the header is stored.
    pub fn header_mode(mut self, mode: HeaderMode) -> Self {
        self.mode = mode;
        self
    }

    /// LZMA-compresses file payloads.
    pub fn compress_files(mut self) -> Self {
        self.compress_files = true;
        self
    }

    /// Overwrites header bytes at `offset` after the header is laid out.
    pub fn patch_header(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.header_patches.push((offset, bytes.to_vec()));
        self
    }

    /// Overrides the size prefix of a solid header stream.
    pub fn solid_prefix(mut self, size: u32) -> Self {
        self.solid_prefix = Some(size);
        self
    }

    /// Adds a string and returns its index.
    ///
    /// `$INSTDIR` and `$OUTDIR` are encoded as variable references.
    pub fn add_string(&mut self, text: &str) -> u32 {
        let index = if self.wide {
            self.strings.len()
        } else {
            self.narrow_units().len()
        } as u32;
        let mut rest = text;
        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix("$INSTDIR") {
                self.strings.extend([3, var_operand(VAR_INSTDIR)]);
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix("$OUTDIR") {
                self.strings.extend([3, var_operand(VAR_OUTDIR)]);
                rest = tail;
            } else {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    let mut buf = [0u16; 2];
                    self.strings.extend_from_slice(c.encode_utf16(&mut buf));
                }
                rest = chars.as_str();
            }
        }
        self.strings.push(0);
        index
    }

    /// Adds a raw instruction.
    pub fn instruction(mut self, opcode: u32, params: &[u32]) -> Self {
        let mut record = vec![opcode];
        record.extend_from_slice(params);
        self.instructions.push(record);
        self
    }

    /// Adds a set-output-directory instruction.
    pub fn set_output_dir(mut self, path: &str) -> Self {
        let index = self.add_string(path);
        self.instruction(11, &[index, 1])
    }

    /// Adds an extract-file instruction and its data block.
    pub fn file(mut self, name: &str, data: &[u8]) -> Self {
        let block = if self.compress_files {
            let payload = lzma_payload(data);
            let mut block = ((payload.len() as u32 + 4) | 0x8000_0000).to_le_bytes().to_vec();
            block.extend_from_slice(&payload);
            block
        } else {
            let mut block = (data.len() as u32 + 4).to_le_bytes().to_vec();
            block.extend_from_slice(data);
            block
        };
        self.file_with_block(name, &block)
    }

    /// Adds an extract-file instruction whose data block is `block` verbatim.
    pub fn file_with_block(mut self, name: &str, block: &[u8]) -> Self {
        let name_index = self.add_string(name);
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(block);
        self.instruction(20, &[0, name_index, offset, 0, 0, 0])
    }

    fn param_count(&self) -> usize {
        if self.flags & StartFlags::BIG_INSTRUCTIONS != 0 { 8 } else { 6 }
    }

    /// Lays out the decompressed header.
    pub fn header_blob(&self) -> Vec<u8> {
        let params = self.param_count();
        let entry_size = 4 + 4 * params;
        let string_bytes: Vec<u8> = if self.wide {
            self.strings.iter().flat_map(|u| u.to_le_bytes()).collect()
        } else {
            self.narrow_units()
        };

        let entries_offset = 68u32;
        let strings_offset = entries_offset + (self.instructions.len() * entry_size) as u32;
        let lang_offset = strings_offset + string_bytes.len() as u32;

        let mut blob = vec![0u8; 68];
        for (at, v) in [
            (20, entries_offset),
            (24, self.instructions.len() as u32),
            (28, strings_offset),
            (36, lang_offset),
            (40, 1),
        ] {
            blob[at..at + 4].copy_from_slice(&v.to_le_bytes());
        }
        for record in &self.instructions {
            let mut words = record.clone();
            words.resize(1 + params, 0);
            blob.extend(words.iter().flat_map(|w| w.to_le_bytes()));
        }
        blob.extend_from_slice(&string_bytes);
        // One language table entry
        blob.extend_from_slice(&[0x09, 0x04, 0, 0, 0, 0, 0, 0]);

        for (offset, bytes) in &self.header_patches {
            blob[*offset..*offset + bytes.len()].copy_from_slice(bytes);
        }
        blob
    }

    /// Builds the installer file.
    pub fn build(&self) -> Vec<u8> {
        let blob = self.header_blob();
        let header_size = blob.len() as u32;

        let mut body = Vec::new();
        if self.flags & StartFlags::BIG_INSTRUCTIONS != 0 {
            body.extend_from_slice(&[0u8; 8]);
        }

        match self.mode {
            HeaderMode::Stored => {
                body.extend_from_slice(&header_size.to_le_bytes());
                body.extend_from_slice(&blob);
                body.extend_from_slice(&self.data);
            }
            HeaderMode::LzmaNonSolid => {
                let mut stream = lzma_payload(&blob);
                // A size word ending in 5D 00 00 would read as a solid LZMA stream
                if stream.len() & 0x00FF_FFFF == 0x5D {
                    stream.push(0);
                }
                body.extend_from_slice(&(stream.len() as u32 | 0x8000_0000).to_le_bytes());
                body.extend_from_slice(&stream);
                body.extend_from_slice(&self.data);
            }
            HeaderMode::LzmaSolid => {
                let mut plain = self.solid_prefix.unwrap_or(header_size).to_le_bytes().to_vec();
                plain.extend_from_slice(&blob);
                plain.extend_from_slice(&self.data);
                body.extend_from_slice(&lzma_payload(&plain));
            }
        }

        let start = StartHeader {
            flags: StartFlags(self.flags),
            header_size,
            archive_size: (28 + body.len()) as u32,
        };

        let mut file = self.prefix.clone();
        file.extend_from_slice(&start.to_bytes());
        file.extend_from_slice(&body);
        file
    }

    /// Offset of the start header in the built file.
    pub fn base_offset(&self) -> u64 {
        self.prefix.len() as u64
    }
}

/// Encodes a variable index as an escape operand.
fn var_operand(index: u16) -> u16 {
    0x8080 | (index & 0x7F) | ((index >> 7) & 0x7F) << 8
}

impl InstallerBuilder {
    /// Narrow tables store each code unit as one byte; escape operands
    /// become two bytes.
    fn narrow_units(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut units = self.strings.iter().peekable();
        while let Some(&u) = units.next() {
            if u == 3 {
                out.push(3);
                if let Some(&&operand) = units.peek() {
                    out.extend_from_slice(&operand.to_le_bytes());
                    units.next();
                }
            } else {
                out.push(u as u8);
            }
        }
        out
    }
}

/// Properties record followed by a raw LZMA stream of `data`.
pub fn lzma_payload(data: &[u8]) -> Vec<u8> {
    use std::io::Write;
    use unnsis::codec::{Encoder, LzmaEncoder, LzmaEncoderOptions};

    let opts = LzmaEncoderOptions::default();
    let mut out = opts.properties();
    {
        let mut encoder = LzmaEncoder::new(&mut out, &opts).expect("Failed to create encoder");
        encoder.write_all(data).expect("Failed to compress");
        Box::new(encoder).finish().expect("Failed to finish stream");
    }
    out
}

/// Writes `bytes` to a file in a fresh temporary directory.
pub fn write_temp_installer(bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("setup.exe");
    std::fs::write(&path, bytes).expect("Failed to write installer");
    (dir, path)
}
