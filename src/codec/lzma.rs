//! LZMA codec implementation.
//!
//! Installer streams carry a bare 5-byte properties record (one lc/lp/pb
//! byte and a little-endian dictionary size) with no uncompressed size, so
//! the decoder always runs in unknown-size mode.

use crate::{Error, Result};
use std::io::{self, Read, Write};

use super::{Codec, Decoder, Encoder};

/// Size of the LZMA properties record.
pub const PROPERTIES_SIZE: usize = 5;

/// LZMA decoder.
pub struct LzmaDecoder<R> {
    inner: lzma_rust2::LzmaReader<R>,
}

impl<R> std::fmt::Debug for LzmaDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LzmaDecoder").finish_non_exhaustive()
    }
}

impl<R: Read> LzmaDecoder<R> {
    /// Creates a new LZMA decoder for a stream of unknown length.
    ///
    /// # Arguments
    ///
    /// * `input` - The compressed data source
    /// * `properties` - LZMA properties (5 bytes: 1 byte props + 4 byte dict size)
    ///
    /// # Errors
    ///
    /// Returns an error if properties are invalid.
    pub fn new(input: R, properties: &[u8]) -> Result<Self> {
        let Some(props) = properties.get(..PROPERTIES_SIZE) else {
            return Err(Error::CorruptHeader {
                offset: 0,
                reason: "LZMA properties too short (need 5 bytes)".into(),
            });
        };

        let props_byte = props[0];
        let dict_size = u32::from_le_bytes([props[1], props[2], props[3], props[4]]);

        let reader =
            lzma_rust2::LzmaReader::new_with_props(input, u64::MAX, props_byte, dict_size, None)
                .map_err(|e| {
                    Error::Io(io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
                })?;

        Ok(Self { inner: reader })
    }
}

impl<R: Read> Read for LzmaDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Decoder for LzmaDecoder<R> {
    fn codec(&self) -> Codec {
        Codec::Lzma
    }
}

/// LZMA encoder options.
#[derive(Debug, Clone)]
pub struct LzmaEncoderOptions {
    /// Compression preset level (0-9, default 6).
    pub preset: u32,
    /// Dictionary size in bytes (optional, uses preset default if None).
    pub dict_size: Option<u32>,
}

impl Default for LzmaEncoderOptions {
    fn default() -> Self {
        Self {
            preset: 6,
            dict_size: None,
        }
    }
}

impl LzmaEncoderOptions {
    /// Creates options with the given preset level.
    pub fn with_preset(preset: u32) -> Self {
        Self {
            preset: preset.min(9),
            dict_size: None,
        }
    }

    /// Sets a custom dictionary size.
    pub fn with_dict_size(mut self, dict_size: u32) -> Self {
        self.dict_size = Some(dict_size);
        self
    }

    fn to_lzma_options(&self) -> lzma_rust2::LzmaOptions {
        let mut opts = lzma_rust2::LzmaOptions::with_preset(self.preset);
        if let Some(dict_size) = self.dict_size {
            opts.dict_size = dict_size;
        }
        opts
    }

    /// Returns LZMA properties (5 bytes: props byte + dict size).
    pub fn properties(&self) -> Vec<u8> {
        let opts = self.to_lzma_options();
        let mut props = vec![opts.get_props()];
        props.extend_from_slice(&opts.dict_size.to_le_bytes());
        props
    }
}

/// LZMA encoder producing a raw stream terminated by an end marker.
pub struct LzmaEncoder<W: Write> {
    inner: lzma_rust2::LzmaWriter<W>,
}

impl<W: Write> std::fmt::Debug for LzmaEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LzmaEncoder").finish_non_exhaustive()
    }
}

impl<W: Write> LzmaEncoder<W> {
    /// Creates a new LZMA encoder.
    ///
    /// The properties record is not written; callers emit
    /// [`LzmaEncoderOptions::properties`] themselves where the container
    /// format expects it.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder cannot be initialized.
    pub fn new(output: W, options: &LzmaEncoderOptions) -> Result<Self> {
        let lzma_opts = options.to_lzma_options();
        let writer = lzma_rust2::LzmaWriter::new_no_header(output, &lzma_opts, true)
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e.to_string())))?;

        Ok(Self { inner: writer })
    }
}

impl<W: Write> Write for LzmaEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Encoder for LzmaEncoder<W> {
    fn codec(&self) -> Codec {
        Codec::Lzma
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner
            .finish()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(())
    }
}
