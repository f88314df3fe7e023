/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};

/// lsopentmf — list OpenTMF drivers and the devices they see.
#[derive(Debug, Parser)]
#[command(
    name = "lsopentmf",
    about = "List OpenTMF drivers",
    version = concat!("(opentmf-utils) ", env!("CARGO_PKG_VERSION")),
    args_override_self = true
)]
pub struct Cli {
    /// Show available devices per driver.
    #[arg(short, long)]
    pub devices: bool,

    /// Show more driver details, may be given multiple times.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print one JSON object per driver (newline-delimited) instead of text.
    #[arg(long)]
    pub json: bool,

    /// Path of the OpenTMF shared library. Defaults to the system loader search path.
    #[arg(long, value_name = "PATH", env = "OPENTMF_LIBRARY")]
    pub library: Option<PathBuf>,

    /// Print library call timing to stderr for debugging.
    #[arg(long)]
    pub debug: bool,

    /// Non-option operands; accepted and ignored.
    #[arg(hide = true, action = ArgAction::Append)]
    #[allow(dead_code)]
    pub operands: Vec<String>,
}

impl Cli {
    /// Effective verbosity after clamping repeated `-v` flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_count(self.verbose)
    }
}

/// How much driver/device detail to print in text mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Names (and device paths) only.
    #[default]
    Names,
    /// One tab-separated line per driver or device.
    Summary,
    /// Labelled multi-line blocks.
    Detailed,
}

impl Verbosity {
    /// Map a `-v` occurrence count to a level; counts above 2 stay at `Detailed`.
    #[must_use]
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Names,
            1 => Self::Summary,
            _ => Self::Detailed,
        }
    }
}

/// Report a parse outcome that ends the process and return its exit code.
///
/// Help and version requests print to stdout and succeed. Anything else (an
/// unrecognized flag) prints the error and the usage text to stderr and fails.
#[must_use]
pub fn report_parse_error(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            0
        }
        _ => {
            let _ = err.print();
            eprintln!();
            eprintln!("{}", Cli::command().render_help());
            1
        }
    }
}
