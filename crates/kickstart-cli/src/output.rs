//! User-facing output and live task progress.

use std::io;

use console::Term;
use owo_colors::OwoColorize;

use kickstart_core::prelude::{RunObserver, Severity, TaskError};

use crate::cli::GlobalArgs;
use crate::config::AppConfig;

/// Writes progress and results to stdout; errors are never suppressed.
pub struct OutputManager {
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let term = Term::stdout();
        Self {
            quiet: args.quiet,
            no_color: args.no_color || config.output.no_color || !term.is_term(),
            term,
        }
    }

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}")
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Error indicator: `✗ <msg>`. Not suppressed in quiet mode.
    pub fn error(&self, msg: &str) -> io::Result<()> {
        let line = if self.no_color {
            format!("\u{2717} {msg}")
        } else {
            format!("{} {}", "\u{2717}".red().bold(), msg.red())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}")
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Skipped or inactive item: `- <msg>`, dimmed.
    pub fn muted(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = format!("- {msg}");
        if self.no_color {
            self.term.write_line(&line)
        } else {
            self.term.write_line(&line.dimmed().to_string())
        }
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    pub fn supports_color(&self) -> bool {
        !self.no_color
    }
}

// Progress lines are best effort: a closed stdout must not fail the run.
impl RunObserver for OutputManager {
    fn task_started(&self, title: &str) {
        let _ = self.print(&format!("\u{2192} {title}"));
    }

    fn task_skipped(&self, title: &str) {
        let _ = self.muted(&format!("{title} (skipped)"));
    }

    fn task_succeeded(&self, title: &str) {
        let _ = self.success(title);
    }

    fn task_failed(&self, title: &str, error: &TaskError, severity: Severity) {
        let _ = match severity {
            Severity::Fatal => self.error(&format!("{title}: {error}")),
            Severity::Advisory => self.warning(&format!("{title}: {error} (continuing)")),
        };
    }

    fn task_cancelled(&self, title: &str, cause: &str) {
        let _ = self.muted(&format!("{title} (not run, '{cause}' failed)"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_manager(quiet: bool, no_color: bool) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet,
            no_color,
            config: None,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn quiet_suppresses_print() {
        let out = make_manager(true, true);
        assert!(out.print("hello").is_ok());
    }

    #[test]
    fn error_not_suppressed_in_quiet_mode() {
        let out = make_manager(true, true);
        assert!(out.error("something went wrong").is_ok());
    }

    #[test]
    fn no_color_flag_disables_color() {
        assert!(!make_manager(false, true).supports_color());
    }

    #[test]
    fn config_can_disable_color() {
        let mut config = AppConfig::default();
        config.output.no_color = true;
        let out = OutputManager::new(&GlobalArgs::default(), &config);
        assert!(!out.supports_color());
    }

    #[test]
    fn observer_events_do_not_panic_without_a_terminal() {
        let out = make_manager(false, true);
        out.task_started("Git init");
        out.task_skipped("Purchase domain");
        out.task_failed(
            "Set CI secrets",
            &TaskError::http("GitHub", "403"),
            Severity::Advisory,
        );
        out.task_cancelled("Git push", "Git commit");
    }
}
