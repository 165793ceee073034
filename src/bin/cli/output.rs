//! Output formatting for CLI operations.

use console::style;
use serde_json::json;
use unnsis::{ArchiveInfo, ExtractResult, FileEntry};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a list of entries
    fn format_list(&self, entries: &[&FileEntry]) -> String;

    /// Formats installer information
    fn format_info(&self, info: &ArchiveInfo) -> String;

    /// Formats extraction results
    fn format_extract_result(&self, result: &ExtractResult) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, entries: &[&FileEntry]) -> String {
        let mut output = String::new();

        output.push_str(&format!("{:>6} {:>10} {}\n", "Instr", "Offset", "Path"));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        for entry in entries {
            output.push_str(&format!(
                "{:>6} {:>10} {}\n",
                entry.index,
                format!("{:#x}", entry.data_offset),
                entry.path
            ));
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!("{} files\n", entries.len()));

        output
    }

    fn format_info(&self, info: &ArchiveInfo) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", style("Installer Information:").bold()));
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("  Kind:           {}\n", info.kind()));
        output.push_str(&format!("  Offset:         {:#x}\n", info.base_offset));
        output.push_str(&format!(
            "  Archive size:   {}\n",
            humanize_bytes(u64::from(info.archive_size))
        ));
        output.push_str(&format!(
            "  Header size:    {}\n",
            humanize_bytes(u64::from(info.header_size))
        ));
        output.push_str(&format!("  Compression:    {}\n", info.compression));
        output.push_str(&format!(
            "  Solid:          {}\n",
            if info.is_solid() { "Yes" } else { "No" }
        ));
        output.push_str(&format!("  Strings:        {}\n", info.encoding));
        output.push_str(&format!(
            "  Instructions:   {} ({} bytes each)\n",
            info.instruction_count, info.instruction_size
        ));
        if info.flags.is_silent() {
            output.push_str("  Silent:         Yes\n");
        }

        output
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let mut output = format!(
            "Extracted {} files ({})\n",
            result.files_extracted,
            humanize_bytes(result.bytes_extracted)
        );
        if result.files_filtered > 0 {
            output.push_str(&format!(
                "Skipped {} files not matching the filter\n",
                result.files_filtered
            ));
        }
        if result.duplicates_skipped > 0 {
            output.push_str(&format!(
                "Skipped {} duplicate paths\n",
                result.duplicates_skipped
            ));
        }
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, entries: &[&FileEntry]) -> String {
        let items: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "path": e.path,
                    "instruction": e.index,
                    "data_offset": e.data_offset,
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_info(&self, info: &ArchiveInfo) -> String {
        let obj = json!({
            "kind": info.kind(),
            "base_offset": info.base_offset,
            "flags": info.flags.0,
            "archive_size": info.archive_size,
            "header_size": info.header_size,
            "codec": info.compression.codec.name(),
            "is_solid": info.is_solid(),
            "header_compressed": info.compression.header_is_compressed,
            "encoding": info.encoding.to_string(),
            "string_char_count": info.string_char_count,
            "instruction_count": info.instruction_count,
            "instruction_size": info.instruction_size,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let obj = json!({
            "files_extracted": result.files_extracted,
            "files_filtered": result.files_filtered,
            "duplicates_skipped": result.duplicates_skipped,
            "bytes_extracted": result.bytes_extracted,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
