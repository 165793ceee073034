//! Tests for malformed and corrupted installer handling.
//!
//! These tests verify that unnsis reports damaged, truncated or hostile
//! installers with the right error instead of panicking or reading garbage.

#![cfg(feature = "lzma")]

mod common;

use std::io::Cursor;

use common::{HeaderMode, InstallerBuilder};
use unnsis::format::{StartFlags, StartHeader};
use unnsis::{Archive, Error, ExtractOptions, MemorySink, OpenOptions, ResourceLimits};

fn open(bytes: Vec<u8>) -> unnsis::Result<Archive<Cursor<Vec<u8>>>> {
    Archive::open(Cursor::new(bytes))
}

/// Builder with one instruction, so the strings block starts at 96.
fn one_file() -> InstallerBuilder {
    InstallerBuilder::new().file("a.txt", b"payload")
}

// =============================================================================
// Signature and start header
// =============================================================================

#[test]
fn test_empty_input() {
    let err = open(Vec::new()).unwrap_err();
    assert!(matches!(err, Error::SignatureNotFound { scanned: 0 }));
}

#[test]
fn test_no_signature() {
    let garbage: Vec<u8> = (0..10_000u32).map(|i| (i * 31 % 256) as u8).collect();
    let err = open(garbage).unwrap_err();
    assert!(matches!(err, Error::SignatureNotFound { scanned: 10_000 }));
}

#[test]
fn test_signature_with_reserved_flags_is_skipped() {
    let start = StartHeader {
        flags: StartFlags(0x100),
        header_size: 100,
        archive_size: 1000,
    };
    let mut bytes = vec![0u8; 64];
    bytes.extend_from_slice(&start.to_bytes());
    bytes.extend_from_slice(&[0u8; 64]);

    let err = open(bytes).unwrap_err();
    assert!(matches!(err, Error::SignatureNotFound { .. }));
}

#[test]
fn test_archive_too_small() {
    let start = StartHeader {
        flags: StartFlags(0),
        header_size: 100,
        archive_size: 28,
    };
    let mut bytes = start.to_bytes().to_vec();
    bytes.extend_from_slice(&[0u8; 64]);

    let err = open(bytes).unwrap_err();
    assert!(matches!(err, Error::ArchiveTooSmall { archive_size: 28 }));
    assert!(err.is_corruption());
}

// =============================================================================
// Header stream
// =============================================================================

#[test]
fn test_truncated_stored_header() {
    let builder = one_file();
    let header_size = builder.header_blob().len() as u64;
    let mut bytes = builder.build();
    bytes.truncate(builder.base_offset() as usize + 28 + 4 + 40);

    let err = open(bytes).unwrap_err();
    match err {
        Error::TruncatedHeader { expected, actual } => {
            assert_eq!(expected, header_size);
            assert_eq!(actual, 40);
        }
        other => panic!("Expected TruncatedHeader, got {:?}", other),
    }
}

#[test]
fn test_solid_size_prefix_mismatch() {
    let builder = one_file().header_mode(HeaderMode::LzmaSolid);
    let header_size = builder.header_blob().len() as u32;
    let bytes = builder.solid_prefix(header_size + 1).build();

    let err = open(bytes).unwrap_err();
    match err {
        Error::SolidSizeMismatch { expected, actual } => {
            assert_eq!(expected, header_size);
            assert_eq!(actual, header_size + 1);
        }
        other => panic!("Expected SolidSizeMismatch, got {:?}", other),
    }
}

#[test]
fn test_header_size_limit() {
    let bytes = one_file().build();
    let options = OpenOptions::new().limits(ResourceLimits::new().max_header_size(16));

    let err = Archive::open_with_options(Cursor::new(bytes), options).unwrap_err();
    assert!(matches!(err, Error::ResourceLimitExceeded(_)));
}

#[test]
fn test_corrupt_lzma_header_does_not_panic() {
    let builder = one_file().header_mode(HeaderMode::LzmaNonSolid);
    let mut bytes = builder.build();
    // Keep the size word and properties, scramble the range coder stream
    let start = builder.base_offset() as usize + 28 + 4 + 5 + 2;
    for b in &mut bytes[start..start + 24] {
        *b ^= 0xA5;
    }

    assert!(open(bytes).is_err());
}

// =============================================================================
// Block directory
// =============================================================================

#[test]
fn test_strings_block_out_of_bounds() {
    let bytes = one_file().patch_header(28, &0xFFFFu32.to_le_bytes()).build();

    let err = open(bytes).unwrap_err();
    assert!(matches!(err, Error::BlockOutOfBounds { offset: 0xFFFF, .. }));
    assert!(err.is_corruption());
}

#[test]
fn test_language_tables_before_strings() {
    let bytes = one_file().patch_header(36, &68u32.to_le_bytes()).build();

    let err = open(bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidBlockOrder {
            strings: 96,
            lang_tables: 68
        }
    ));
}

#[test]
fn test_unterminated_string_table() {
    // "\0Se" with no terminating zero
    let bytes = one_file().patch_header(36, &99u32.to_le_bytes()).build();

    let err = open(bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidStringTable { .. }));
}

#[test]
fn test_entries_table_too_large() {
    let bytes = one_file()
        .patch_header(24, &0x0100_0000u32.to_le_bytes())
        .build();

    let err = open(bytes).unwrap_err();
    assert!(matches!(err, Error::EntriesTableTooLarge { .. }));
}

#[test]
fn test_instruction_index_past_table_is_an_error() {
    let archive = open(one_file().build()).unwrap();
    let header = archive.header();

    assert!(header.instruction(0).is_ok());
    for index in [1, usize::MAX / 8, usize::MAX] {
        let err = header.instruction(index).unwrap_err();
        assert!(matches!(err, Error::CorruptHeader { .. }));
    }
}

#[test]
fn test_out_of_range_string_index_is_not_an_error() {
    let archive = open(
        InstallerBuilder::new()
            .instruction(20, &[0, 0xFFFF, 0])
            .build(),
    )
    .unwrap();

    assert_eq!(archive.entries()[0].path, "$_ERROR_STR_65535");
}

// =============================================================================
// File data blocks
// =============================================================================

#[test]
fn test_truncated_file_data() {
    let data = vec![0x42u8; 100];
    let mut bytes = InstallerBuilder::new().file("data.bin", &data).build();
    bytes.truncate(bytes.len() - 10);

    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.len(), 1);

    let entry = archive.entries()[0].clone();
    let err = archive.read_entry(&entry).unwrap_err();
    assert!(matches!(
        err,
        Error::TruncatedFileData {
            expected: 100,
            actual: 90,
            ..
        }
    ));
    assert_eq!(err.path(), Some("data.bin"));
    assert!(err.is_corruption());
}

#[test]
fn test_truncated_size_word() {
    let mut bytes = InstallerBuilder::new().file("data.bin", b"abc").build();
    bytes.truncate(bytes.len() - 5);

    let mut archive = open(bytes).unwrap();
    let err = archive
        .extract_to_sink(&mut MemorySink::new(), &ExtractOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::TruncatedFileData {
            expected: 4,
            actual: 2,
            ..
        }
    ));
}

#[test]
fn test_block_count_below_size_word() {
    let mut archive = open(
        InstallerBuilder::new()
            .file_with_block("bad.bin", &2u32.to_le_bytes())
            .build(),
    )
    .unwrap();

    let entry = archive.entries()[0].clone();
    let err = archive.read_entry(&entry).unwrap_err();
    assert!(matches!(err, Error::CorruptHeader { .. }));
}

#[test]
fn test_stored_file_size_limit() {
    let mut archive = open(InstallerBuilder::new().file("big.bin", &[7u8; 100]).build()).unwrap();

    let options = ExtractOptions::new().limits(ResourceLimits::new().max_file_size(10));
    let err = archive
        .extract_to_sink(&mut MemorySink::new(), &options)
        .unwrap_err();
    assert!(matches!(err, Error::ResourceLimitExceeded(_)));
}

#[test]
fn test_decompressed_file_size_limit() {
    let mut archive = open(
        InstallerBuilder::new()
            .compress_files()
            .file("zeros.bin", &[0u8; 4096])
            .build(),
    )
    .unwrap();

    let options = ExtractOptions::new().limits(ResourceLimits::new().max_file_size(1000));
    let err = archive
        .extract_to_sink(&mut MemorySink::new(), &options)
        .unwrap_err();
    assert!(matches!(err, Error::ResourceLimitExceeded(_)));
}

#[test]
fn test_file_limit_from_open_options_applies_to_read_entry() {
    let bytes = InstallerBuilder::new().file("big.bin", &[7u8; 100]).build();
    let options = OpenOptions::new().limits(ResourceLimits::new().max_file_size(50));
    let mut archive = Archive::open_with_options(Cursor::new(bytes), options).unwrap();

    let entry = archive.entries()[0].clone();
    let err = archive.read_entry(&entry).unwrap_err();
    assert!(matches!(err, Error::ResourceLimitExceeded(_)));
}

#[test]
fn test_corrupt_compressed_file_does_not_panic() {
    let builder = InstallerBuilder::new()
        .compress_files()
        .file("noise.bin", &b"some text to compress ".repeat(50));
    let mut bytes = builder.build();
    let len = bytes.len();
    for b in &mut bytes[len - 30..] {
        *b = !*b;
    }

    let mut archive = open(bytes).unwrap();
    let entry = archive.entries()[0].clone();
    // Either a decode error or garbage output, never a panic
    let _ = archive.read_entry(&entry);
}

#[test]
fn test_extraction_stops_at_first_error() {
    let mut archive = open(
        InstallerBuilder::new()
            .file("good.txt", b"fine")
            .file_with_block("bad.bin", &1u32.to_le_bytes())
            .file("never.txt", b"unreached")
            .build(),
    )
    .unwrap();

    let mut sink = MemorySink::new();
    let err = archive
        .extract_to_sink(&mut sink, &ExtractOptions::default())
        .unwrap_err();
    assert!(err.is_corruption());
    assert_eq!(sink.len(), 1);
    assert!(sink.get("good.txt").is_some());
}
