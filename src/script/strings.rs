//! String table decoding.
//!
//! Strings are stored back to back, zero-terminated, in either one-byte or
//! UTF-16LE code units. A string index is a code-unit offset into the
//! table. Code units 1 to 4 introduce escapes for language strings, shared
//! strings, variables and literal characters; the decoder renders these in
//! the script syntax the installer was written in.

use super::vars::variable_name;
use crate::format::{BlockDirectory, StringEncoding};

/// Escape kinds introduced by code units 1 to 4.
const ESCAPE_LANG: u16 = 1;
const ESCAPE_SHELL: u16 = 2;
const ESCAPE_VAR: u16 = 3;
const ESCAPE_SKIP: u16 = 4;

/// UTF-8 lead bytes for 1 to 5 continuation bytes.
const UTF8_LEAD: [u8; 5] = [0xC0, 0xE0, 0xF0, 0xF8, 0xFC];

/// Read-only view of the header's string table.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    table: &'a [u8],
    encoding: StringEncoding,
}

impl<'a> StringTable<'a> {
    /// Creates a view of the string table of a validated header.
    pub fn new(header: &'a [u8], directory: &BlockDirectory) -> Self {
        let table = header.get(directory.strings_range()).unwrap_or(&[]);
        Self::from_raw(table, directory.encoding())
    }

    /// Creates a view over raw table bytes.
    pub fn from_raw(table: &'a [u8], encoding: StringEncoding) -> Self {
        Self { table, encoding }
    }

    /// Encoding of the table.
    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    /// Number of code units in the table.
    pub fn char_count(&self) -> usize {
        self.table.len() / self.encoding.char_width()
    }

    /// Decodes string `index` into display text.
    ///
    /// Invalid UTF-8 (raw bytes of narrow tables) is replaced lossily.
    pub fn decode(&self, index: i64) -> String {
        String::from_utf8_lossy(&self.decode_bytes(index)).into_owned()
    }

    /// Decodes string `index` into raw output bytes.
    ///
    /// Negative indices are language string references and out-of-range
    /// indices render an error placeholder; neither reads the table.
    pub fn decode_bytes(&self, index: i64) -> Vec<u8> {
        if index < 0 {
            return format!("$(LSTR_{})", -(index + 1)).into_bytes();
        }
        if index as u64 >= self.char_count() as u64 {
            return format!("$_ERROR_STR_{}", index).into_bytes();
        }

        let mut units = Units {
            table: self.table,
            pos: index as usize * self.encoding.char_width(),
            encoding: self.encoding,
        };
        let mut out = Vec::new();

        while let Some(mut c) = units.next_unit() {
            if c == 0 {
                break;
            }

            if (ESCAPE_LANG..=ESCAPE_SKIP).contains(&c) {
                let Some(n) = units.escape_operand(c) else {
                    break;
                };
                match c {
                    ESCAPE_SKIP => c = n,
                    ESCAPE_SHELL => {
                        out.extend(format!("$(SSTR_{}_{})", n & 0xFF, n >> 8).bytes());
                        continue;
                    }
                    ESCAPE_VAR => {
                        out.extend(variable_name(u32::from(decode_index(n))).bytes());
                        continue;
                    }
                    _ => {
                        out.extend(format!("$(LSTR_{})", decode_index(n)).bytes());
                        continue;
                    }
                }
            }

            push_char(&mut out, c, self.encoding);
        }

        out
    }
}

/// Extracts the 14-bit index packed into an escape operand.
fn decode_index(n: u16) -> u16 {
    (n & 0x7F) | ((n >> 8) & 0x7F) << 7
}

/// Appends one code unit, escaping script metacharacters.
fn push_char(out: &mut Vec<u8>, c: u16, encoding: StringEncoding) {
    if c < 0x80 {
        match c as u8 {
            b'\t' => out.extend_from_slice(b"$\\t"),
            b'\n' => out.extend_from_slice(b"$\\n"),
            b'\r' => out.extend_from_slice(b"$\\r"),
            b'"' => out.extend_from_slice(b"$\\\""),
            b'$' => out.extend_from_slice(b"$$"),
            b => out.push(b),
        }
        return;
    }

    match encoding {
        StringEncoding::Narrow => out.push(c as u8),
        StringEncoding::Wide => push_utf8(out, u32::from(c)),
    }
}

/// Appends `c` as UTF-8 using the classic variable-length scheme.
fn push_utf8(out: &mut Vec<u8>, c: u32) {
    let mut adds = 1;
    while adds < UTF8_LEAD.len() && c >= 1 << (adds * 5 + 6) {
        adds += 1;
    }
    out.push(UTF8_LEAD[adds - 1] + (c >> (6 * adds)) as u8);
    for i in (0..adds).rev() {
        out.push(0x80 + ((c >> (6 * i)) & 0x3F) as u8);
    }
}

/// Code-unit cursor that never reads past the table.
struct Units<'a> {
    table: &'a [u8],
    pos: usize,
    encoding: StringEncoding,
}

impl Units<'_> {
    fn next_byte(&mut self) -> Option<u8> {
        let b = *self.table.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn next_unit(&mut self) -> Option<u16> {
        match self.encoding {
            StringEncoding::Narrow => self.next_byte().map(u16::from),
            StringEncoding::Wide => {
                let lo = self.table.get(self.pos)?;
                let hi = self.table.get(self.pos + 1)?;
                self.pos += 2;
                Some(u16::from_le_bytes([*lo, *hi]))
            }
        }
    }

    /// Reads the operand of escape `kind`; `None` ends the string.
    fn escape_operand(&mut self, kind: u16) -> Option<u16> {
        let n = match self.encoding {
            StringEncoding::Wide => self.next_unit()?,
            StringEncoding::Narrow if kind == ESCAPE_SKIP => u16::from(self.next_byte()?),
            StringEncoding::Narrow => {
                let c0 = self.next_byte()?;
                let c1 = self.next_byte()?;
                if c0 == 0 || c1 == 0 {
                    return None;
                }
                u16::from(c0) | u16::from(c1) << 8
            }
        };
        (n != 0).then_some(n)
    }
}
