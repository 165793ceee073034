//! BZip2 decoding.
//!
//! Decoding goes through the `bzip2` crate. Payloads are often written
//! without the `BZh` stream header, so one is synthesized when the data
//! opens directly with a block. The installer compiler's own block framing
//! (a `1` byte followed by a small block-size digit) is not standard bzip2
//! and surfaces as a decode error.

use std::io::{self, Chain, Cursor, Read};

use bzip2::read::BzDecoder;

use super::{Codec, Decoder};

/// Stream header announcing the largest block size.
const STREAM_HEADER: &[u8; 4] = b"BZh9";

/// Magic opening every compressed block.
const BLOCK_MAGIC: [u8; 6] = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59];

type Prefixed<R> = Chain<Cursor<Vec<u8>>, R>;

/// BZip2 decoder.
pub struct Bzip2Decoder<R> {
    inner: BzDecoder<Prefixed<R>>,
}

impl<R> std::fmt::Debug for Bzip2Decoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bzip2Decoder").finish_non_exhaustive()
    }
}

impl<R: Read> Bzip2Decoder<R> {
    /// Creates a decoder over `input`.
    ///
    /// Peeks at the first bytes to decide whether a stream header must be
    /// supplied.
    pub fn new(mut input: R) -> io::Result<Self> {
        let mut head = Vec::with_capacity(BLOCK_MAGIC.len());
        input
            .by_ref()
            .take(BLOCK_MAGIC.len() as u64)
            .read_to_end(&mut head)?;

        let mut prefix = Vec::with_capacity(STREAM_HEADER.len() + head.len());
        if head.starts_with(&BLOCK_MAGIC) {
            prefix.extend_from_slice(STREAM_HEADER);
        }
        prefix.extend_from_slice(&head);

        Ok(Self {
            inner: BzDecoder::new(Cursor::new(prefix).chain(input)),
        })
    }
}

impl<R: Read> Read for Bzip2Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Decoder for Bzip2Decoder<R> {
    fn codec(&self) -> Codec {
        Codec::BZip2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::Compression;
    use bzip2::write::BzEncoder;
    use std::io::Write;

    fn bzip2(data: &[u8]) -> Vec<u8> {
        let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn decode(stream: &[u8]) -> Vec<u8> {
        let mut decoder = Bzip2Decoder::new(stream).unwrap();
        let mut output = Vec::new();
        decoder.read_to_end(&mut output).unwrap();
        output
    }

    #[test]
    fn test_decode_standard_stream() {
        let data = b"bzip2 installer data ".repeat(30);
        assert_eq!(decode(&bzip2(&data)), data);
    }

    #[test]
    fn test_decode_headerless_stream() {
        let data = b"headerless block stream ".repeat(30);
        let stream = bzip2(&data);
        assert_eq!(&stream[..4], STREAM_HEADER);
        assert_eq!(decode(&stream[4..]), data);
    }

    #[test]
    fn test_codec() {
        let decoder = Bzip2Decoder::new(&[][..]).unwrap();
        assert_eq!(decoder.codec(), Codec::BZip2);
    }
}
