//! Bounds-checked little-endian accessors over byte buffers.
//!
//! Every multi-byte field of the installer format is little-endian and lives
//! at an offset computed from untrusted header data, so all access goes
//! through these helpers instead of raw indexing.

use std::io::{self, Read};

use crate::{Error, Result};

/// Returns `len` bytes of `buf` starting at `offset`.
///
/// # Errors
///
/// Returns [`Error::CorruptHeader`] if the range extends past the buffer.
pub fn slice_at(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or_else(|| Error::CorruptHeader {
            offset: offset as u64,
            reason: format!("{} bytes requested, buffer holds {}", len, buf.len()),
        })
}

/// Reads a little-endian `u16` at `offset`.
pub fn read_u16_at(buf: &[u8], offset: usize) -> Result<u16> {
    let b = slice_at(buf, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

/// Reads a little-endian `u32` at `offset`.
pub fn read_u32_at(buf: &[u8], offset: usize) -> Result<u32> {
    let b = slice_at(buf, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Reads a little-endian `u32`, returning 0 when the buffer is too short.
///
/// Used where a short buffer is legitimately zero-padded (the compression
/// detection window at the very end of a file).
pub fn read_u32_or_zero(buf: &[u8], offset: usize) -> u32 {
    read_u32_at(buf, offset).unwrap_or(0)
}

/// Reads until `buf` is full or the reader is exhausted.
///
/// Returns the number of bytes read; a value below `buf.len()` means the
/// stream ended early. Interrupted reads are retried.
pub fn read_fully<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_u32_at() {
        let buf = [0x78, 0x56, 0x34, 0x12, 0xFF];
        assert_eq!(read_u32_at(&buf, 0).unwrap(), 0x1234_5678);
        assert!(read_u32_at(&buf, 2).is_err());
    }

    #[test]
    fn test_read_u16_at() {
        let buf = [0x34, 0x12];
        assert_eq!(read_u16_at(&buf, 0).unwrap(), 0x1234);
        assert!(read_u16_at(&buf, 1).is_err());
    }

    #[test]
    fn test_slice_at_overflow() {
        let buf = [0u8; 4];
        assert!(slice_at(&buf, usize::MAX, 2).is_err());
        assert_eq!(slice_at(&buf, 4, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_read_u32_or_zero() {
        assert_eq!(read_u32_or_zero(&[1, 0], 0), 0);
        assert_eq!(read_u32_or_zero(&[1, 0, 0, 0], 0), 1);
    }

    /// Reader that hands out one byte per call.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn test_read_fully_accumulates_partial_reads() {
        let mut reader = Trickle(Cursor::new(b"abcdef".to_vec()));
        let mut buf = [0u8; 4];
        assert_eq!(read_fully(&mut reader, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");

        let mut rest = [0u8; 4];
        assert_eq!(read_fully(&mut reader, &mut rest).unwrap(), 2);
        assert_eq!(&rest[..2], b"ef");
    }
}
