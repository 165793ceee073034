//! Raw Deflate decoding.
//!
//! Installers built with the zlib compressor store bare Deflate blocks,
//! without the zlib header or Adler-32 trailer.

use std::io::{self, BufReader, Read};

use flate2::bufread::DeflateDecoder as RawInflater;

use super::{Codec, Decoder};

/// Raw Deflate decoder.
pub struct DeflateDecoder<R> {
    inner: RawInflater<BufReader<R>>,
}

impl<R> std::fmt::Debug for DeflateDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateDecoder").finish_non_exhaustive()
    }
}

impl<R: Read> DeflateDecoder<R> {
    /// Creates a decoder over the compressed stream `input`.
    pub fn new(input: R) -> Self {
        Self {
            inner: RawInflater::new(BufReader::new(input)),
        }
    }
}

impl<R: Read> Read for DeflateDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Decoder for DeflateDecoder<R> {
    fn codec(&self) -> Codec {
        Codec::Deflate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_raw_stream() {
        let data = b"$INSTDIR\\bin\\app.exe ".repeat(20);
        let compressed = deflate(&data);

        let mut decoder = DeflateDecoder::new(&compressed[..]);
        let mut output = Vec::new();
        decoder.read_to_end(&mut output).unwrap();
        assert_eq!(output, data);
        assert_eq!(decoder.codec(), Codec::Deflate);
    }

    #[test]
    fn test_zlib_wrapper_is_rejected() {
        // 78 9C is a zlib header, not a valid raw block sequence here
        let mut decoder = DeflateDecoder::new(&[0x78u8, 0x9C, 0xFF, 0xFF, 0xFF][..]);
        let mut output = Vec::new();
        assert!(decoder.read_to_end(&mut output).is_err());
    }
}
