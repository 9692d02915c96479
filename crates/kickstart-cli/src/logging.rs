//! Diagnostic logging for a run.
//!
//! Task progress is printed by [`OutputManager`](crate::output::OutputManager)
//! on stdout. Everything here goes to stderr: what the steps and adapters
//! emit through `tracing` while they talk to git, npm and the remote APIs.
//!
//! `--verbose` may be repeated: once shows `info` (one line per remote
//! resource created), twice adds request and poll details and the emitting
//! module, three times is `trace`. `--quiet` keeps errors only. A set
//! `RUST_LOG` replaces the computed filter entirely.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

/// Crates whose events follow the verbosity flags.
const OWN_CRATES: [&str; 3] = ["kickstart", "kickstart_core", "kickstart_adapters"];

/// HTTP plumbing under the API clients; chatty below `warn`.
const HTTP_CRATES: [&str; 3] = ["reqwest", "hyper_util", "rustls"];

pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let level = derive_level(args);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(level)))?;

    let detailed = matches!(level, "debug" | "trace");
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_target(detailed)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already set: {e}"))
}

fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `EnvFilter` directives: our crates at `level`, the HTTP stack at `warn`
/// unless tracing everything.
fn filter_directives(level: &str) -> String {
    let http_level = if level == "trace" { "trace" } else { "warn" };
    OWN_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .chain(HTTP_CRATES.iter().map(|krate| format!("{krate}={http_level}")))
        .collect::<Vec<_>>()
        .join(",")
}
