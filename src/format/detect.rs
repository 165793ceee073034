//! Header compression detection.
//!
//! The installer format does not record which codec protects the header.
//! It is inferred from the bytes that follow the start header with an
//! ordered list of heuristic rules; the first rule that matches wins. A
//! misclassification is not detected here and surfaces later as a decode
//! error.

use std::fmt;

use super::reader::read_u32_or_zero;
use super::{COMPRESSED_MASK, DETECT_WINDOW_SIZE, START_HEADER_SIZE, StartHeader};
use crate::codec::Codec;

/// Returns `true` if `bytes` starts with an installer LZMA stream.
///
/// Matches the `lc/lp/pb` byte `0x5D`, a dictionary size whose low 16 bits
/// are zero, and the first two range-coder bytes (`0x00`, then a value
/// below `0x80`). Short input never matches.
pub fn is_lzma_signature(bytes: &[u8]) -> bool {
    bytes.len() >= 7
        && bytes[0] == 0x5D
        && bytes[1] == 0
        && bytes[2] == 0
        && bytes[5] == 0
        && bytes[6] & 0x80 == 0
}

/// Returns `true` if `bytes` starts with a BZip2 block stream.
pub fn is_bzip2_signature(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x31 && bytes[1] < 14
}

/// How the archive header (and file data) is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionDescriptor {
    /// Codec protecting the header.
    pub codec: Codec,
    /// All payloads share the header's compression stream.
    pub solid: bool,
    /// For non-solid archives, whether the header itself is compressed.
    pub header_is_compressed: bool,
    /// For non-solid archives, the stored length of the header data. File
    /// data starts right after it.
    pub non_solid_start_offset: u32,
    /// Raw word read at the detection cursor.
    pub compressed_header_size: u32,
    /// Offset from the archive base of the compressed-header-size word.
    pub stream_offset: u32,
    /// A 4-byte filter prefix precedes the LZMA properties.
    pub filter_prefix: bool,
}

impl CompressionDescriptor {
    /// Offset from the archive base where the header's stream starts.
    ///
    /// Non-solid archives skip the size word. Solid streams start at the
    /// cursor itself, past the filter prefix when there is one.
    pub fn header_stream_offset(&self) -> u64 {
        let base = u64::from(self.stream_offset);
        if !self.solid || self.filter_prefix {
            base + 4
        } else {
            base
        }
    }

    /// Offset from the archive base that per-file data offsets are relative to.
    pub fn data_base(&self) -> u64 {
        u64::from(self.stream_offset) + 4 + u64::from(self.non_solid_start_offset)
    }
}

impl fmt::Display for CompressionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.codec == Codec::None {
            return f.write_str("None");
        }
        write!(
            f,
            "{} ({})",
            self.codec,
            if self.solid { "solid" } else { "non-solid" }
        )
    }
}

/// Bytes and sizes a detection rule looks at.
struct Probe {
    window: [u8; DETECT_WINDOW_SIZE],
    cursor: usize,
    compressed_size: u32,
    header_size: u32,
}

impl Probe {
    fn at(&self, offset: usize) -> &[u8] {
        self.window.get(self.cursor + offset..).unwrap_or(&[])
    }

    fn word_at(&self, offset: usize) -> u32 {
        read_u32_or_zero(&self.window, self.cursor + offset)
    }
}

/// Result of a matching rule.
struct Outcome {
    codec: Codec,
    solid: bool,
    filter_prefix: bool,
}

/// One entry of the ordered rule list.
struct Rule {
    name: &'static str,
    matches: fn(&Probe) -> bool,
    outcome: fn(&Probe) -> Outcome,
}

fn has_filter_prefix(p: &Probe) -> bool {
    !is_lzma_signature(p.at(0)) && p.word_at(0) <= 1 && is_lzma_signature(p.at(4))
}

const RULES: &[Rule] = &[
    Rule {
        name: "stored",
        matches: |p| p.compressed_size == p.header_size,
        outcome: |_| Outcome {
            codec: Codec::None,
            solid: false,
            filter_prefix: false,
        },
    },
    Rule {
        name: "lzma-solid",
        matches: |p| is_lzma_signature(p.at(0)) || has_filter_prefix(p),
        outcome: |p| Outcome {
            codec: Codec::Lzma,
            solid: true,
            filter_prefix: has_filter_prefix(p),
        },
    },
    Rule {
        name: "non-solid",
        matches: |p| p.at(3).first() == Some(&0x80),
        outcome: |p| Outcome {
            codec: if is_lzma_signature(p.at(4)) {
                Codec::Lzma
            } else if is_bzip2_signature(p.at(4)) {
                Codec::BZip2
            } else {
                Codec::Deflate
            },
            solid: false,
            filter_prefix: false,
        },
    },
    Rule {
        name: "bzip2-solid",
        matches: |p| is_bzip2_signature(p.at(0)),
        outcome: |_| Outcome {
            codec: Codec::BZip2,
            solid: true,
            filter_prefix: false,
        },
    },
    Rule {
        name: "deflate-solid",
        matches: |_| true,
        outcome: |_| Outcome {
            codec: Codec::Deflate,
            solid: true,
            filter_prefix: false,
        },
    },
];

/// Classifies the header compression from the bytes after the start header.
///
/// `window` holds up to [`DETECT_WINDOW_SIZE`] bytes following the start
/// header; a shorter slice is treated as zero-padded.
pub fn detect_compression(start: &StartHeader, window: &[u8]) -> CompressionDescriptor {
    let mut padded = [0u8; DETECT_WINDOW_SIZE];
    let n = window.len().min(DETECT_WINDOW_SIZE);
    padded[..n].copy_from_slice(&window[..n]);

    let cursor = if start.flags.is_big() { 8 } else { 0 };
    let probe = Probe {
        window: padded,
        cursor,
        compressed_size: read_u32_or_zero(&padded, cursor),
        header_size: start.header_size,
    };

    // The last rule always matches
    let (name, outcome) = RULES
        .iter()
        .find(|rule| (rule.matches)(&probe))
        .map(|rule| (rule.name, (rule.outcome)(&probe)))
        .unwrap_or((
            "deflate-solid",
            Outcome {
                codec: Codec::Deflate,
                solid: true,
                filter_prefix: false,
            },
        ));

    let (header_is_compressed, non_solid_start_offset) = if outcome.solid {
        (true, 0)
    } else {
        (
            probe.compressed_size & COMPRESSED_MASK != 0,
            probe.compressed_size & !COMPRESSED_MASK,
        )
    };

    let descriptor = CompressionDescriptor {
        codec: outcome.codec,
        solid: outcome.solid,
        header_is_compressed,
        non_solid_start_offset,
        compressed_header_size: probe.compressed_size,
        stream_offset: (START_HEADER_SIZE + cursor) as u32,
        filter_prefix: outcome.filter_prefix,
    };

    log::debug!(
        "compression rule '{}' matched: {} (size word {:#010x})",
        name,
        descriptor,
        probe.compressed_size
    );
    if descriptor.filter_prefix {
        log::warn!("LZMA stream has a filter prefix; the branch filter is not applied");
    }

    descriptor
}
