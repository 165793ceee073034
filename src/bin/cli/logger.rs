//! Minimal stderr logger for the CLI.

use console::{Style, style};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && metadata.target().starts_with("unnsis")
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let label = match record.level() {
            Level::Error => Style::new().red().bold().apply_to("error"),
            Level::Warn => Style::new().yellow().bold().apply_to("warning"),
            Level::Info => Style::new().green().apply_to("info"),
            Level::Debug => Style::new().cyan().apply_to("debug"),
            Level::Trace => Style::new().dim().apply_to("trace"),
        };
        eprintln!("{}: {}", label, record.args());
    }

    fn flush(&self) {}
}

/// Installs the logger.
///
/// Warnings are shown by default, `-v` adds info and debug output, `-vv`
/// everything. `--quiet` limits output to errors.
pub fn init(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    } else {
        eprintln!("{}", style("logger already initialized").dim());
    }
}
