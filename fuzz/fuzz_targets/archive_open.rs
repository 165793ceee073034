//! Fuzz target for Archive::open with arbitrary byte input.
//!
//! This target exercises signature scanning, compression detection, header
//! decoding and script interpretation with potentially malformed or
//! adversarial input, looking for panics, hangs or runaway allocations.
//!
//! Run with: cargo +nightly fuzz run archive_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use unnsis::{Archive, ExtractOptions, MemorySink, OpenOptions, ResourceLimits};

fuzz_target!(|data: &[u8]| {
    let limits = ResourceLimits::new()
        .max_header_size(1 << 20)
        .max_file_size(1 << 20);
    let options = OpenOptions::new().limits(limits);

    let Ok(mut archive) = Archive::open_with_options(Cursor::new(data), options) else {
        return;
    };

    // Decode the strings near the start of the table and just past its end
    let strings = archive.strings();
    let count = strings.char_count() as i64;
    for i in (-2..count.min(4096)).chain(count..count + 2) {
        let _ = strings.decode(i);
    }
    for instruction in archive.instructions() {
        let _ = instruction.map(|i| i.kind());
    }

    let mut sink = MemorySink::new();
    let _ = archive.extract_to_sink(&mut sink, &ExtractOptions::new().limits(limits));
});
