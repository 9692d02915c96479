// ============================================================================
// domain/error.rs - TASK AND PLAN ERRORS
// ============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single task action.
///
/// All errors are:
/// - Cloneable (the run report keeps a copy, the observer sees another)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaskError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("{message}")]
    Validation { message: String },

    #[error("missing {what}: {hint}")]
    MissingInput { what: String, hint: String },

    #[error("{path} already exists")]
    AlreadyExists { path: PathBuf },

    // ========================================================================
    // External-call Errors
    // ========================================================================
    #[error("command `{command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{service} request failed: {message}")]
    Http { service: String, message: String },

    #[error("{service} returned an unexpected response: {message}")]
    Remote { service: String, message: String },

    // ========================================================================
    // Polling Errors
    // ========================================================================
    #[error("{operation} finished with failure status: {status}")]
    PollFailed { operation: String, status: String },

    #[error("{operation} still at '{last_status}' after {elapsed_secs}s")]
    PollTimeout {
        operation: String,
        last_status: String,
        elapsed_secs: u64,
    },

    // ========================================================================
    // Internal Errors
    // ========================================================================
    #[error("filesystem error at {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("{field} was not produced by an earlier task")]
    MissingContext { field: &'static str },

    #[error("task panicked: {message}")]
    Panicked { message: String },
}

impl TaskError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn http(service: impl Into<String>, message: impl ToString) -> Self {
        Self::Http {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn remote(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Validation { message } => vec![format!("Details: {message}")],
            Self::MissingInput { what, hint } => vec![
                format!("Provide {what}"),
                hint.clone(),
            ],
            Self::AlreadyExists { path } => vec![
                format!("Choose another name or remove {}", path.display()),
                "Re-run a single step with --task \"<title>\"".into(),
            ],
            Self::Command { command, .. } => vec![
                format!("Ensure `{}` is installed and in your PATH", first_word(command)),
                "Check the command output above for details".into(),
            ],
            Self::Http { service, .. } | Self::Remote { service, .. } => vec![
                format!("Check your {service} credentials and network access"),
                "Re-run the failed step with --task \"<title>\"".into(),
            ],
            Self::PollFailed { operation, .. } => vec![
                format!("Inspect {operation} in the provider's console"),
            ],
            Self::PollTimeout { .. } => vec![
                "Raise poll.timeout_secs in the configuration (0 disables the bound)".into(),
                "Re-run the waiting step with --task \"<title>\" once it settles".into(),
            ],
            Self::MissingContext { .. } => vec![
                "Run the full pipeline instead of a single task".into(),
            ],
            _ => vec!["See the error details above".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::MissingInput { .. } | Self::AlreadyExists { .. } => {
                ErrorCategory::Validation
            }
            Self::Command { .. }
            | Self::Http { .. }
            | Self::Remote { .. }
            | Self::PollFailed { .. }
            | Self::PollTimeout { .. } => ErrorCategory::External,
            Self::Io { .. } | Self::MissingContext { .. } | Self::Panicked { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

fn first_word(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or(command)
}

/// Errors raised while ordering tasks into a plan, before anything runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("duplicate task title '{title}'")]
    DuplicateTask { title: String },

    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("dependency cycle between: {}", tasks.join(", "))]
    Cycle { tasks: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    External,
    Internal,
}
