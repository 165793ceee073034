//! Process exit codes.

use unnsis::Error;

/// Exit status after Ctrl+C (128 + SIGINT).
pub const USER_INTERRUPT: i32 = 130;

/// Outcome of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The instruction stream was fully traversed.
    Success = 0,
    /// Unsafe output path, exceeded limit or other fatal condition.
    FatalError = 2,
    /// Not an installer, damaged, or uses an unsupported layout.
    BadArchive = 3,
    /// Reading the input or writing output failed.
    IoError = 5,
    /// Invalid command line input, such as a bad regular expression.
    BadArgs = 255,
}

impl ExitCode {
    /// Numeric process exit status.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(error: &Error) -> Self {
        match error {
            Error::Io(_) => Self::IoError,
            Error::InvalidRegex { .. } => Self::BadArgs,
            Error::SignatureNotFound { .. } => Self::BadArchive,
            e if e.is_corruption() || e.is_unsupported() => Self::BadArchive,
            _ => Self::FatalError,
        }
    }
}
