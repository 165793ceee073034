//! Progress display for CLI extraction.

use indicatif::{ProgressBar, ProgressStyle};
use unnsis::{FileEntry, FileSink, Result};

/// Progress bar over the number of files to extract
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a new progress display
    pub fn new(total_files: u64, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(total_files);
            let style = ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {wide_msg}",
                )
                .map(|s| s.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb
        };

        Self { bar }
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Finishes with a custom message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.bar.abandon_with_message(msg.into());
    }
}

/// Sink adapter that advances a progress bar for every file written.
pub struct ProgressSink<'a, S> {
    inner: S,
    progress: &'a CliProgress,
}

impl<'a, S: FileSink> ProgressSink<'a, S> {
    /// Wraps `inner`
    pub fn new(inner: S, progress: &'a CliProgress) -> Self {
        Self { inner, progress }
    }
}

impl<S: FileSink> FileSink for ProgressSink<'_, S> {
    fn on_start(&mut self) -> Result<()> {
        self.inner.on_start()
    }

    fn write_file(&mut self, entry: &FileEntry, data: &[u8]) -> Result<()> {
        self.progress.bar.set_message(display_name(&entry.path));
        self.inner.write_file(entry, data)?;
        self.progress.bar.inc(1);
        Ok(())
    }

    fn on_finish(&mut self) -> Result<()> {
        self.inner.on_finish()
    }
}

/// Truncates long paths from the left
fn display_name(path: &str) -> String {
    let chars: Vec<char> = path.chars().collect();
    if chars.len() > 40 {
        let tail: String = chars[chars.len() - 37..].iter().collect();
        format!("...{}", tail)
    } else {
        path.to_string()
    }
}
