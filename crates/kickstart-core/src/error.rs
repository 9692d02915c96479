//! Unified error handling for kickstart Core.
//!
//! [`KickstartError`] is what the application layer hands back to the CLI:
//! planning failures, an unknown `--task` title, or a failed run.

use thiserror::Error;

use crate::domain::{PlanError, TaskError};

/// Root error type for kickstart Core operations.
#[derive(Debug, Error, Clone)]
pub enum KickstartError {
    /// The task list could not be ordered.
    #[error("Invalid pipeline: {0}")]
    Plan(#[from] PlanError),

    /// Single-task mode was given a title that is not in the plan.
    #[error("Task not found: '{title}'")]
    TaskNotFound { title: String, available: Vec<String> },

    /// A fatal task failed; the run stopped there.
    #[error("Task '{task}' failed: {error}")]
    TaskFailed {
        task: String,
        error: TaskError,
        cancelled: Vec<String>,
    },

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl KickstartError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Plan(e) => vec![
                format!("Pipeline definition is inconsistent: {e}"),
                "This is a bug in kickstart, please report it".into(),
            ],
            Self::TaskNotFound { available, .. } => {
                let mut out = vec!["Task titles are matched exactly. Available tasks:".into()];
                out.extend(available.iter().map(|t| format!("  • {t}")));
                out
            }
            Self::TaskFailed {
                task,
                error,
                cancelled,
            } => {
                let mut out = error.suggestions();
                if !cancelled.is_empty() {
                    out.push(format!(
                        "{} later task(s) did not run; resume with --task \"{task}\" and the ones after it",
                        cancelled.len()
                    ));
                }
                out
            }
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Check your setup and try again".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Plan(_) => ErrorCategory::Internal,
            Self::TaskNotFound { .. } => ErrorCategory::NotFound,
            Self::TaskFailed { error, .. } => match error.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::External => ErrorCategory::External,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    External,
    Internal,
}

/// Convenient result type alias.
pub type KickstartResult<T> = Result<T, KickstartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_keeps_category() {
        let err = KickstartError::TaskFailed {
            task: "Validate package name".into(),
            error: TaskError::validation("bad"),
            cancelled: vec![],
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn not_found_lists_available_tasks() {
        let err = KickstartError::TaskNotFound {
            title: "nope".into(),
            available: vec!["Git init".into()],
        };
        assert!(err.suggestions().iter().any(|s| s.contains("Git init")));
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn cancelled_tasks_are_mentioned() {
        let err = KickstartError::TaskFailed {
            task: "Git push".into(),
            error: TaskError::http("GitHub", "timeout"),
            cancelled: vec!["Await CI run".into()],
        };
        assert!(err.suggestions().iter().any(|s| s.contains("1 later task")));
    }
}
