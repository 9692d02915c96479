//! # kickstart
//!
//! Bootstraps a JavaScript package or web application in one run.
//!
//! ## Startup sequence
//!
//! 1. Load `.env`, then parse CLI arguments (clap handles `--help` /
//!    `--version` early-exit).
//! 2. Initialise the tracing subscriber (logging).
//! 3. Load configuration (defaults, file, environment).
//! 4. Build the [`OutputManager`].
//! 5. Wire the pipeline and run the selected mode.
//! 6. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                            |
//! |------|------------------------------------|
//! |  0   | Success                            |
//! |  1   | Internal or remote-service failure |
//! |  2   | User / input error                 |
//! |  3   | Resource not found (unknown task)  |
//! |  4   | Configuration error                |

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use crate::{cli::Cli, config::AppConfig, error::CliError, logging::init_logging, output::OutputManager};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod wiring;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Missing .env is normal; real deployments export variables directly.
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version arrive here too, with exit code 0.
            let _ = e.print();
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    if let Err(e) = init_logging(&cli.global) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::from(1);
    }

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        no_color = cli.global.no_color,
        "CLI started"
    );

    let config = match AppConfig::load(cli.global.config.as_ref()) {
        Ok(cfg) => cfg,
        Err(e) => return handle_error(e, cli.global.verbose > 0),
    };

    let output = Arc::new(OutputManager::new(&cli.global, &config));
    let verbose = cli.global.verbose > 0;

    match commands::run::execute(cli, config, output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => handle_error(e, verbose),
    }
}

/// The single place where structured errors become stderr output and OS
/// exit codes.
fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();

    let msg = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}
