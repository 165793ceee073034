//! Pass-through decoder for stored data.

use std::io::{self, Read};

use super::{Codec, Decoder};

/// Decoder for data stored without compression.
///
/// Bounds are applied by the caller, so this only forwards reads.
#[derive(Debug)]
pub struct StoredDecoder<R> {
    inner: R,
}

impl<R: Read> StoredDecoder<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for StoredDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Decoder for StoredDecoder<R> {
    fn codec(&self) -> Codec {
        Codec::None
    }
}
