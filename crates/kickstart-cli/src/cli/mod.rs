//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! and help text. No business logic lives here.

use clap::{ArgAction, Parser};

pub mod global;
pub use global::GlobalArgs;

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name     = "kickstart",
    bin_name = "kickstart",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Bootstrap a JavaScript package or web application in one run",
    long_about = "kickstart creates a project directory, writes the boilerplate, \
                  installs dependencies, initialises git and, when credentials \
                  are available, provisions the remote repository, domain, \
                  cloud identity, database and infrastructure workspace.",
    after_help = "EXAMPLES:\n\
        \x20 kickstart my-lib\n\
        \x20 kickstart @acme/widgets --react\n\
        \x20 kickstart shop.example.com --react\n\
        \x20 kickstart my-lib --task \"Git init\"\n\
        \x20 kickstart shop.example.com --dry-run\n\
        \x20 kickstart --list-tasks",
    disable_version_flag = true,
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Package name, or a domain name for an application.
    #[arg(
        value_name = "NAME",
        required_unless_present = "list_tasks",
        help = "Package name or domain name"
    )]
    pub name: Option<String>,

    /// Add a React component scaffold and its dependencies.
    #[arg(long = "react", help = "Include a React scaffold")]
    pub react: bool,

    /// Force application mode even when the name is not a domain.
    #[arg(long = "app", help = "Treat the project as a web application")]
    pub app: bool,

    /// Run only the task with this exact title.
    #[arg(
        long = "task",
        value_name = "TITLE",
        conflicts_with = "list_tasks",
        help = "Run a single task by title"
    )]
    pub task: Option<String>,

    /// Print task titles in plan order and exit.
    #[arg(long = "list-tasks", help = "List task titles and exit")]
    pub list_tasks: bool,

    /// Show which tasks would run or be skipped, without running any.
    #[arg(
        long = "dry-run",
        conflicts_with_all = ["list_tasks", "task"],
        help = "Show the plan without running it"
    )]
    pub dry_run: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version, help = "Print version")]
    version: Option<bool>,
}

/// What the invocation asks for, after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    ListTasks,
    DryRun,
    Single(String),
    Full,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.list_tasks {
            Mode::ListTasks
        } else if self.dry_run {
            Mode::DryRun
        } else if let Some(title) = &self.task {
            Mode::Single(title.clone())
        } else {
            Mode::Full
        }
    }
}
