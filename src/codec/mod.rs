//! Compression codec infrastructure for installer archives.
//!
//! Installer headers and non-solid file payloads are protected by one of
//! three codecs (LZMA, raw Deflate, BZip2) or stored verbatim. This module
//! wraps the backend crates behind a common [`Decoder`] trait and exposes
//! the one-shot [`decompress`] service the archive reader is built on.

#[cfg(feature = "lzma")]
pub mod lzma;

#[cfg(feature = "deflate")]
pub mod deflate;

#[cfg(feature = "bzip2")]
pub mod bzip2;

mod copy;

use std::fmt;
use std::io::{self, Read, Write};

use crate::{Error, Result};

/// Compression codec used by an installer archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Data is stored without compression.
    None,
    /// LZMA with a 5-byte properties record.
    Lzma,
    /// BZip2 block stream.
    BZip2,
    /// Raw Deflate (no zlib or gzip wrapper).
    Deflate,
}

impl Codec {
    /// Returns a human-readable name for this codec.
    pub fn name(self) -> &'static str {
        match self {
            Codec::None => "None",
            Codec::Lzma => "LZMA",
            Codec::BZip2 => "BZip2",
            Codec::Deflate => "Deflate",
        }
    }

    /// Returns `true` if support for this codec was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            Codec::None => true,
            Codec::Lzma => cfg!(feature = "lzma"),
            Codec::BZip2 => cfg!(feature = "bzip2"),
            Codec::Deflate => cfg!(feature = "deflate"),
        }
    }

    /// Number of properties bytes that precede the compressed stream.
    pub fn properties_len(self) -> usize {
        match self {
            Codec::Lzma => 5,
            _ => 0,
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoder that reads compressed data and produces uncompressed output.
pub trait Decoder: Read {
    /// Returns the codec implemented by this decoder.
    fn codec(&self) -> Codec;
}

/// An encoder that takes uncompressed data and produces compressed output.
///
/// Reading installers never encodes; the LZMA encoder exists so test
/// fixtures and tools can produce streams the reader accepts.
pub trait Encoder: Write {
    /// Returns the codec implemented by this encoder.
    fn codec(&self) -> Codec;

    /// Finishes encoding and flushes any remaining data.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

pub use copy::StoredDecoder;

#[cfg(feature = "lzma")]
pub use lzma::{LzmaDecoder, LzmaEncoder, LzmaEncoderOptions};

#[cfg(feature = "deflate")]
pub use deflate::DeflateDecoder;

#[cfg(feature = "bzip2")]
pub use bzip2::Bzip2Decoder;

/// Builds a decoder for `codec` over `input`.
///
/// `properties` must hold the codec's properties record (5 bytes for LZMA,
/// empty otherwise).
///
/// # Errors
///
/// Returns [`Error::UnsupportedMethod`] if the codec's feature is disabled,
/// or an error if the properties are invalid.
pub fn build_decoder<'a, R: Read + 'a>(
    codec: Codec,
    properties: &[u8],
    input: R,
) -> Result<Box<dyn Decoder + 'a>> {
    match codec {
        Codec::None => Ok(Box::new(StoredDecoder::new(input))),
        #[cfg(feature = "lzma")]
        Codec::Lzma => Ok(Box::new(LzmaDecoder::new(input, properties)?)),
        #[cfg(feature = "deflate")]
        Codec::Deflate => Ok(Box::new(DeflateDecoder::new(input))),
        #[cfg(feature = "bzip2")]
        Codec::BZip2 => Ok(Box::new(Bzip2Decoder::new(input)?)),
        #[allow(unreachable_patterns)]
        other => {
            let _ = properties;
            Err(Error::UnsupportedMethod { codec: other })
        }
    }
}

/// Decompresses at most `compressed_len` bytes of `input` with `codec`.
///
/// Decoding stops as soon as `output_cap` bytes have been produced, so the
/// returned buffer never exceeds the cap. A stream that ends early returns
/// what was decoded so far; callers compare the length against what they
/// need. An LZMA stream that runs out of input without an end marker is
/// tolerated the same way.
///
/// # Errors
///
/// Returns [`Error::UnsupportedMethod`] for disabled codecs and
/// [`Error::Io`] for corrupt compressed data.
pub fn decompress<R: Read>(
    codec: Codec,
    properties: &[u8],
    input: R,
    compressed_len: u64,
    output_cap: usize,
) -> Result<Vec<u8>> {
    let limited = input.take(compressed_len);
    let mut decoder = build_decoder(codec, properties, limited)?;

    let mut output = Vec::with_capacity(output_cap.min(1 << 20));
    let mut chunk = [0u8; 64 * 1024];
    while output.len() < output_cap {
        let want = chunk.len().min(output_cap - output.len());
        match decoder.read(&mut chunk[..want]) {
            Ok(0) => break,
            Ok(n) => output.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && !output.is_empty() => {
                log::warn!(
                    "{} stream ended without end marker after {} bytes",
                    codec,
                    output.len()
                );
                break;
            }
            Err(e) => return Err(Error::Io(e)),
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_codec_names() {
        assert_eq!(Codec::None.to_string(), "None");
        assert_eq!(Codec::Lzma.to_string(), "LZMA");
        assert_eq!(Codec::BZip2.to_string(), "BZip2");
        assert_eq!(Codec::Deflate.to_string(), "Deflate");
    }

    #[test]
    fn test_properties_len() {
        assert_eq!(Codec::Lzma.properties_len(), 5);
        assert_eq!(Codec::Deflate.properties_len(), 0);
        assert_eq!(Codec::None.properties_len(), 0);
    }

    #[test]
    fn test_decompress_none_respects_limits() {
        let data = b"0123456789".to_vec();
        let out = decompress(Codec::None, &[], Cursor::new(&data), 8, 100).unwrap();
        assert_eq!(out, b"01234567");

        let out = decompress(Codec::None, &[], Cursor::new(&data), 10, 3).unwrap();
        assert_eq!(out, b"012");
    }

    #[cfg(feature = "lzma")]
    #[test]
    fn test_decompress_lzma() {
        let data = b"installer payload ".repeat(64);
        let opts = LzmaEncoderOptions::default();
        let mut compressed = Vec::new();
        {
            let mut encoder = LzmaEncoder::new(Cursor::new(&mut compressed), &opts).unwrap();
            encoder.write_all(&data).unwrap();
            Box::new(encoder).finish().unwrap();
        }

        let out = decompress(
            Codec::Lzma,
            &opts.properties(),
            Cursor::new(&compressed),
            compressed.len() as u64,
            usize::MAX,
        )
        .unwrap();
        assert_eq!(out, data);

        // Capped output stops early
        let out = decompress(
            Codec::Lzma,
            &opts.properties(),
            Cursor::new(&compressed),
            compressed.len() as u64,
            10,
        )
        .unwrap();
        assert_eq!(out, &data[..10]);
    }

    #[cfg(feature = "deflate")]
    #[test]
    fn test_decompress_deflate() {
        use flate2::write::DeflateEncoder;

        let data = b"deflated bytes".repeat(10);
        let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&data).unwrap();
        let compressed = encoder.finish().unwrap();

        let out = decompress(
            Codec::Deflate,
            &[],
            Cursor::new(&compressed),
            compressed.len() as u64,
            usize::MAX,
        )
        .unwrap();
        assert_eq!(out, data);
    }

    #[cfg(feature = "bzip2")]
    #[test]
    fn test_decompress_bzip2_without_stream_header() {
        use ::bzip2::write::BzEncoder;

        let data = b"bzip2 block data ".repeat(40);
        let mut encoder = BzEncoder::new(Vec::new(), ::bzip2::Compression::best());
        encoder.write_all(&data).unwrap();
        let compressed = encoder.finish().unwrap();

        let stream = &compressed[4..];
        let out = decompress(
            Codec::BZip2,
            &[],
            Cursor::new(stream),
            stream.len() as u64,
            usize::MAX,
        )
        .unwrap();
        assert_eq!(out, data);
    }

    #[cfg(not(feature = "bzip2"))]
    #[test]
    fn test_disabled_codec_is_unsupported() {
        let err = decompress(Codec::BZip2, &[], Cursor::new(Vec::new()), 0, 1).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMethod { codec: Codec::BZip2 }));
    }
}
