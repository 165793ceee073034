//! Installer script decoding.
//!
//! The decompressed header carries the compiled installer script: a flat
//! table of fixed-size instructions whose string parameters index into the
//! string table. This module decodes strings and instructions and replays
//! the few instructions that decide where files are written.

pub mod interpreter;
pub mod strings;
pub mod vars;

pub use interpreter::{ExtractionState, Interpreter, Step, normalize_path};
pub use strings::StringTable;
pub use vars::variable_name;

use crate::Result;
use crate::format::opcode;
use crate::format::reader::read_u32_at;

/// Maximum number of parameters of an instruction.
pub const MAX_PARAMS: usize = 8;

/// Instruction opcodes, as far as extraction is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Sets the current output directory.
    SetOutputDir,
    /// Extracts a file into the current output directory.
    ExtractFile,
    /// Any other instruction; carried but not interpreted.
    Other(u32),
}

impl From<u32> for Opcode {
    fn from(value: u32) -> Self {
        match value {
            opcode::SET_OUTPUT_DIR => Opcode::SetOutputDir,
            opcode::EXTRACT_FILE => Opcode::ExtractFile,
            other => Opcode::Other(other),
        }
    }
}

/// One record of the entries table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Raw opcode.
    pub opcode: u32,
    params: [u32; MAX_PARAMS],
    param_count: usize,
}

impl Instruction {
    /// Parses an instruction with `param_count` parameters from `bytes`.
    pub fn parse(bytes: &[u8], param_count: usize) -> Result<Self> {
        let param_count = param_count.min(MAX_PARAMS);
        let mut params = [0u32; MAX_PARAMS];
        for (i, param) in params.iter_mut().take(param_count).enumerate() {
            *param = read_u32_at(bytes, 4 + i * 4)?;
        }
        Ok(Self {
            opcode: read_u32_at(bytes, 0)?,
            params,
            param_count,
        })
    }

    /// Returns the decoded opcode.
    pub fn kind(&self) -> Opcode {
        Opcode::from(self.opcode)
    }

    /// Returns the parameters.
    pub fn params(&self) -> &[u32] {
        &self.params[..self.param_count]
    }

    /// Returns parameter `index`, or 0 if the record has fewer parameters.
    pub fn param(&self, index: usize) -> u32 {
        self.params().get(index).copied().unwrap_or(0)
    }

    /// Returns parameter `index` interpreted as a signed string index.
    pub fn string_param(&self, index: usize) -> i64 {
        i64::from(self.param(index) as i32)
    }
}
