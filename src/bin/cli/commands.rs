//! Command implementations for the CLI tool.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use unnsis::{Archive, ExtractOptions, FilesystemSink, OpenOptions, PathFilter, PathSafety};

use crate::OutputFormat;
use crate::exit_codes::ExitCode;
use crate::output::create_formatter;
use crate::progress::{CliProgress, ProgressSink};

/// Configuration for the extract command.
pub struct ExtractConfig<'a> {
    pub archive_path: &'a Path,
    pub output_dir: &'a Path,
    pub regex: Option<&'a str>,
    pub path_safety: PathSafety,
    pub open: OpenOptions,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Extract command implementation
pub fn extract(config: &ExtractConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let mut options = ExtractOptions::new()
        .path_safety(config.path_safety)
        .limits(config.open.limits);
    if let Some(pattern) = config.regex {
        options = match options.filter(pattern) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::BadArgs;
            }
        };
    }

    let mut archive = match open_archive(config.archive_path, &config.open) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let selected = archive
        .entries()
        .iter()
        .filter(|e| options.selects(&e.path))
        .count();
    let progress = CliProgress::new(selected as u64, config.quiet);

    let sink = FilesystemSink::new(config.output_dir).path_safety(options.path_safety);
    let mut sink = ProgressSink::new(sink, &progress);

    let result = match archive.extract_to_sink(&mut sink, &options) {
        Ok(r) => r,
        Err(e) => {
            progress.finish_with_message("Failed");
            eprintln!("Error: {}", e);
            return ExitCode::from(&e);
        }
    };

    progress.finish();

    if !config.quiet || config.format == OutputFormat::Json {
        print!("{}", formatter.format_extract_result(&result));
    }

    ExitCode::Success
}

/// List command implementation
pub fn list(
    archive_path: &Path,
    open: &OpenOptions,
    regex: Option<&str>,
    format: OutputFormat,
) -> ExitCode {
    let formatter = create_formatter(format);

    let filter = match regex.map(PathFilter::new).transpose() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    let archive = match open_archive(archive_path, open) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let entries: Vec<_> = archive
        .entries()
        .iter()
        .filter(|e| filter.as_ref().is_none_or(|f| f.matches(&e.path)))
        .collect();

    print!("{}", formatter.format_list(&entries));

    ExitCode::Success
}

/// Info command implementation
pub fn info(archive_path: &Path, open: &OpenOptions, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let archive = match open_archive(archive_path, open) {
        Ok(a) => a,
        Err(code) => return code,
    };

    print!("{}", formatter.format_info(archive.info()));

    ExitCode::Success
}

/// Helper to open an installer, reporting failures
fn open_archive(
    path: &Path,
    options: &OpenOptions,
) -> Result<Archive<BufReader<File>>, ExitCode> {
    Archive::open_path_with_options(path, options.clone()).map_err(|e| {
        eprintln!("Error opening installer: {}", e);
        ExitCode::from(&e)
    })
}
