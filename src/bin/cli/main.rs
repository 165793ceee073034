//! CLI tool for unnsis installer operations.

mod commands;
mod exit_codes;
mod logger;
mod output;
mod progress;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use unnsis::{OpenOptions, PathSafety, ResourceLimits, ScanOptions};

use exit_codes::ExitCode;

/// Pure Rust NSIS installer extractor
#[derive(Parser)]
#[command(name = "unnsis")]
#[command(author, version, about = "Pure Rust NSIS installer extractor", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    open: OpenArgs,
}

/// Options applied while locating and decoding the installer
#[derive(Args)]
struct OpenArgs {
    /// Only look for the installer data in the first N bytes
    #[arg(long, value_name = "BYTES", global = true)]
    search_limit: Option<u64>,

    /// Only consider start headers at multiples of N (512 for unmodified installers)
    #[arg(long, value_name = "N", default_value_t = 1, global = true)]
    alignment: u64,

    /// Largest decompressed header to accept
    #[arg(long, value_name = "BYTES", env = "UNNSIS_MAX_HEADER_SIZE", global = true)]
    max_header_size: Option<u64>,

    /// Largest single file to extract
    #[arg(long, value_name = "BYTES", env = "UNNSIS_MAX_FILE_SIZE", global = true)]
    max_file_size: Option<u64>,
}

impl OpenArgs {
    fn limits(&self) -> ResourceLimits {
        let mut limits = ResourceLimits::new();
        if let Some(size) = self.max_header_size {
            limits = limits.max_header_size(size);
        }
        if let Some(size) = self.max_file_size {
            limits = limits.max_file_size(size);
        }
        limits
    }

    fn options(&self) -> OpenOptions {
        let mut scan = ScanOptions::new().alignment(self.alignment);
        if let Some(limit) = self.search_limit {
            scan = scan.search_limit(limit);
        }
        OpenOptions::new().scan(scan).limits(self.limits())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract files from an installer (alias: x)
    #[command(alias = "x")]
    Extract {
        /// Installer file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Only extract paths matching this regular expression
        #[arg(short = 'r', long)]
        regex: Option<String>,

        /// How strictly output paths are checked against the output directory
        #[arg(long, value_enum, default_value = "strict")]
        path_safety: PathSafetyArg,
    },

    /// List the files an installer places (alias: l)
    #[command(alias = "l")]
    List {
        /// Installer file to list
        archive: PathBuf,

        /// Only list paths matching this regular expression
        #[arg(short = 'r', long)]
        regex: Option<String>,
    },

    /// Show installer information (alias: i)
    #[command(alias = "i")]
    Info {
        /// Installer file to inspect
        archive: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, ValueEnum)]
enum PathSafetyArg {
    /// Reject traversal and resolve symlinks of existing directories
    Strict,
    /// Reject `..` and absolute paths only
    Relaxed,
    /// Write wherever the installer says (dangerous)
    Disabled,
}

impl From<PathSafetyArg> for PathSafety {
    fn from(arg: PathSafetyArg) -> Self {
        match arg {
            PathSafetyArg::Strict => PathSafety::Strict,
            PathSafetyArg::Relaxed => PathSafety::Relaxed,
            PathSafetyArg::Disabled => PathSafety::Disabled,
        }
    }
}

fn main() {
    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    let open_options = cli.open.options();

    let exit_code = match cli.command {
        Commands::Extract {
            archive,
            output,
            regex,
            path_safety,
        } => commands::extract(&commands::ExtractConfig {
            archive_path: &archive,
            output_dir: &output,
            regex: regex.as_deref(),
            path_safety: path_safety.into(),
            open: open_options,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::List { archive, regex } => {
            commands::list(&archive, &open_options, regex.as_deref(), cli.format)
        }

        Commands::Info { archive } => commands::info(&archive, &open_options, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
