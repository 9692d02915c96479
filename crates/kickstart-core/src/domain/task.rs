//! The unit of work in a bootstrap run.
//!
//! A [`Task`] pairs a unique title with an asynchronous [`TaskAction`], an
//! optional skip predicate, explicit dependencies and a [`Severity`]. Tasks
//! are immutable once built; the [`Plan`](super::Plan) owns them for the
//! duration of a run.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{context::RunContext, error::TaskError};

/// The body of a task.
///
/// Implementations receive the run context mutably: anything a later task
/// needs (credentials, generated secrets, remote URLs) is written there
/// rather than into the process environment.
#[async_trait]
pub trait TaskAction: Send + Sync {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError>;
}

/// Skip predicate, evaluated synchronously just before the action would run.
pub type SkipPredicate = Box<dyn Fn(&RunContext) -> bool + Send + Sync>;

/// Whether a failing task stops the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    /// Failure stops the run and cancels every remaining task.
    #[default]
    Fatal,
    /// Failure is reported and the run continues.
    Advisory,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => write!(f, "fatal"),
            Self::Advisory => write!(f, "advisory"),
        }
    }
}

/// A named, optionally skippable unit of work.
pub struct Task {
    title: String,
    depends_on: Vec<String>,
    severity: Severity,
    skip: Option<SkipPredicate>,
    action: Box<dyn TaskAction>,
}

impl Task {
    pub fn new(title: impl Into<String>, action: impl TaskAction + 'static) -> Self {
        Self {
            title: title.into(),
            depends_on: Vec::new(),
            severity: Severity::Fatal,
            skip: None,
            action: Box::new(action),
        }
    }

    /// Declare titles of tasks that must be ordered before this one.
    pub fn depends_on<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(titles.into_iter().map(Into::into));
        self
    }

    pub fn skip_when(mut self, predicate: impl Fn(&RunContext) -> bool + Send + Sync + 'static) -> Self {
        self.skip = Some(Box::new(predicate));
        self
    }

    pub fn advisory(mut self) -> Self {
        self.severity = Severity::Advisory;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn should_skip(&self, ctx: &RunContext) -> bool {
        self.skip.as_ref().is_some_and(|skip| skip(ctx))
    }

    pub fn action(&self) -> &dyn TaskAction {
        self.action.as_ref()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("title", &self.title)
            .field("depends_on", &self.depends_on)
            .field("severity", &self.severity)
            .field("skippable", &self.skip.is_some())
            .finish_non_exhaustive()
    }
}

/// What happened to one task during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStatus {
    Succeeded,
    Skipped,
    Failed(TaskError),
    /// Failed, but the task is advisory so the run carried on.
    FailedAdvisory(TaskError),
    /// Never started because an earlier fatal task failed.
    Cancelled,
}

impl TaskStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::FailedAdvisory(_))
    }
}
