//! Output and logging flags shared by every invocation.
//!
//! Declared here and flattened into [`super::Cli`].

use clap::Args;
use std::path::PathBuf;

/// Flags that shape output, logging and configuration lookup.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Increase logging verbosity.
    ///
    /// Pass once for INFO, twice for DEBUG, three times for TRACE.
    /// Conflicts with `--quiet`. `-v` is the version flag.
    #[arg(
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase verbosity (--verbose, repeat for more)",
        long_help = "Increase logging verbosity:
    (none)            - Only warnings and errors
    --verbose         - Info level (task progress in logs)
    --verbose x2      - Debug level (commands, requests)
    --verbose x3      - Trace level (very verbose)"
    )]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(
        short = 'q',
        long = "quiet",
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Disable ANSI colour codes.
    ///
    /// Automatically honoured when `NO_COLOR` is set in the environment
    /// (see <https://no-color.org>).
    #[arg(
        long = "no-color",
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new(),
        help = "Disable colored output"
    )]
    pub no_color: bool,

    /// Configuration file path.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Configuration file path"
    )]
    pub config: Option<PathBuf>,
}
