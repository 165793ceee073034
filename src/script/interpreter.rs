//! Replay of the instructions that place files.
//!
//! The interpreter walks the entries table once, front to back, without
//! following jumps or evaluating conditions. It tracks the output directory
//! set by set-output-directory instructions, with `$INSTDIR` and `$OUTDIR`
//! references stripped, and turns every extract-file instruction into a
//! [`FileEntry`] whose path is relative to the install root. A path is reported once; later instructions writing the same path
//! are flagged as duplicates.

use std::collections::HashSet;

use super::{Instruction, Opcode, StringTable};
use crate::Result;
use crate::read::{FileEntry, Header};

/// State evolved over one pass through the instruction stream.
#[derive(Debug, Clone, Default)]
pub struct ExtractionState {
    /// Output directory relative to the install root.
    pub current_output_directory: String,
    /// Paths already reported.
    pub emitted_paths: HashSet<String>,
}

impl ExtractionState {
    /// Creates the initial state: install root, nothing emitted.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Outcome of interpreting one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The output directory changed.
    SetOutputDir(String),
    /// A file to extract.
    File(FileEntry),
    /// A file whose path was already reported.
    Duplicate(FileEntry),
    /// An instruction that does not affect extraction.
    Other(u32),
}

/// Sequential interpreter over a header's entries table.
pub struct Interpreter<'a> {
    header: &'a Header,
    strings: StringTable<'a>,
    next: usize,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter positioned at the first instruction.
    pub fn new(header: &'a Header) -> Self {
        Self {
            header,
            strings: header.strings(),
            next: 0,
        }
    }

    /// Index of the next instruction to interpret.
    pub fn position(&self) -> usize {
        self.next
    }

    /// Interprets the next instruction.
    ///
    /// Returns `Ok(None)` once the entries table is exhausted.
    pub fn step(&mut self, state: &mut ExtractionState) -> Result<Option<Step>> {
        if self.next >= self.header.instruction_count() {
            return Ok(None);
        }
        let index = self.next;
        let instruction = self.header.instruction(index)?;
        self.next += 1;

        Ok(Some(self.apply(index, &instruction, state)))
    }

    fn apply(&self, index: usize, instruction: &Instruction, state: &mut ExtractionState) -> Step {
        match instruction.kind() {
            Opcode::SetOutputDir => {
                let raw = self.strings.decode(instruction.string_param(0));
                let stripped = raw.replace("$OUTDIR", "").replace("$INSTDIR", "");
                state.current_output_directory = normalize_path(&stripped);
                log::trace!(
                    "#{}: output directory '{}'",
                    index,
                    state.current_output_directory
                );
                Step::SetOutputDir(state.current_output_directory.clone())
            }
            Opcode::ExtractFile => {
                let name = self.strings.decode(instruction.string_param(1));
                let path = normalize_path(&format!(
                    "{}/{}",
                    state.current_output_directory, name
                ));
                let entry = FileEntry::new(index, path, instruction.param(2));
                if state.emitted_paths.insert(entry.path.clone()) {
                    Step::File(entry)
                } else {
                    log::debug!("#{}: '{}' already extracted, skipping", index, entry.path);
                    Step::Duplicate(entry)
                }
            }
            Opcode::Other(op) => Step::Other(op),
        }
    }

    /// Runs to the end and returns the files to extract, in order.
    pub fn files(mut self, state: &mut ExtractionState) -> Result<Vec<FileEntry>> {
        let mut files = Vec::new();
        while let Some(step) = self.step(state)? {
            if let Step::File(entry) = step {
                files.push(entry);
            }
        }
        Ok(files)
    }
}

/// Normalizes a script path to `/`-separated form.
///
/// Backslashes become `/`; empty and `.` segments are dropped, which also
/// removes leading and trailing separators.
pub fn normalize_path(path: &str) -> String {
    path.split(['\\', '/'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
