//! Task runner - executes a plan in order, fail-fast.
//!
//! For each task the runner announces it, evaluates its skip predicate,
//! awaits its action and reports the result to the [`RunObserver`]. A fatal
//! failure stops the run and every task after it is announced as cancelled
//! without its predicate or action being touched. Panics inside a task are
//! caught here and reported like any other failure.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    application::ports::RunObserver,
    domain::{Plan, RunContext, Severity, Task, TaskError, TaskStatus},
    error::{KickstartError, KickstartResult},
};

/// One visited task and what happened to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub title: String,
    pub status: TaskStatus,
}

/// Overall result of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Success,
    Failed {
        task: String,
        error: TaskError,
        cancelled: Vec<String>,
    },
}

/// Per-task records plus the overall outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    records: Vec<TaskRecord>,
    outcome: RunOutcome,
}

impl RunReport {
    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Success)
    }

    /// Number of tasks that were started (skipped ones included).
    pub fn visited(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status != TaskStatus::Cancelled)
            .count()
    }

    pub fn status_of(&self, title: &str) -> Option<&TaskStatus> {
        self.records
            .iter()
            .find(|r| r.title == title)
            .map(|r| &r.status)
    }

    /// Advisory tasks that failed without stopping the run.
    pub fn advisory_failures(&self) -> impl Iterator<Item = (&str, &TaskError)> {
        self.records.iter().filter_map(|r| match &r.status {
            TaskStatus::FailedAdvisory(e) => Some((r.title.as_str(), e)),
            _ => None,
        })
    }

    /// Turn a failed outcome into [`KickstartError::TaskFailed`].
    pub fn into_result(self) -> KickstartResult<Self> {
        match &self.outcome {
            RunOutcome::Success => Ok(self),
            RunOutcome::Failed {
                task,
                error,
                cancelled,
            } => Err(KickstartError::TaskFailed {
                task: task.clone(),
                error: error.clone(),
                cancelled: cancelled.clone(),
            }),
        }
    }
}

/// A task as it would run, used by `--dry-run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTask {
    pub title: String,
    pub dependencies: Vec<String>,
    pub severity: Severity,
    /// Skip decision against the context as it stands before the run.
    pub skipped: bool,
}

/// Executes a [`Plan`] against a [`RunContext`].
pub struct TaskRunner {
    plan: Plan,
    observer: Arc<dyn RunObserver>,
}

impl TaskRunner {
    pub fn new(plan: Plan, observer: Arc<dyn RunObserver>) -> Self {
        Self { plan, observer }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn titles(&self) -> Vec<&str> {
        self.plan.titles().collect()
    }

    /// Run every task in plan order.
    #[instrument(skip_all, fields(project = %ctx.name(), tasks = self.plan.len()))]
    pub async fn run_all(&self, ctx: &mut RunContext) -> RunReport {
        info!("Starting run");
        let tasks = self.plan.tasks();
        let mut records = Vec::with_capacity(tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            let status = self.execute(task, ctx).await;
            records.push(TaskRecord {
                title: task.title().to_string(),
                status: status.clone(),
            });

            if let TaskStatus::Failed(error) = status {
                let cancelled = self.cancel_remaining(task.title(), &tasks[index + 1..]);
                records.extend(cancelled.iter().map(|title| TaskRecord {
                    title: title.clone(),
                    status: TaskStatus::Cancelled,
                }));
                error!(task = %task.title(), cancelled = cancelled.len(), "Run stopped");
                return RunReport {
                    records,
                    outcome: RunOutcome::Failed {
                        task: task.title().to_string(),
                        error,
                        cancelled,
                    },
                };
            }
        }

        info!(visited = records.len(), "Run completed");
        RunReport {
            records,
            outcome: RunOutcome::Success,
        }
    }

    /// Run exactly one task by exact title; dependencies are not run.
    #[instrument(skip(self, ctx))]
    pub async fn run_one(&self, title: &str, ctx: &mut RunContext) -> KickstartResult<RunReport> {
        let task = self
            .plan
            .find(title)
            .ok_or_else(|| KickstartError::TaskNotFound {
                title: title.to_string(),
                available: self.plan.titles().map(String::from).collect(),
            })?;

        let status = self.execute(task, ctx).await;
        let outcome = match &status {
            TaskStatus::Failed(error) => RunOutcome::Failed {
                task: task.title().to_string(),
                error: error.clone(),
                cancelled: Vec::new(),
            },
            _ => RunOutcome::Success,
        };

        Ok(RunReport {
            records: vec![TaskRecord {
                title: task.title().to_string(),
                status,
            }],
            outcome,
        })
    }

    /// Evaluate skip predicates only; no action runs.
    pub fn preview(&self, ctx: &RunContext) -> Vec<PlannedTask> {
        self.plan
            .tasks()
            .iter()
            .map(|task| PlannedTask {
                title: task.title().to_string(),
                dependencies: task.dependencies().to_vec(),
                severity: task.severity(),
                skipped: evaluate_skip(task, ctx).unwrap_or(false),
            })
            .collect()
    }

    async fn execute(&self, task: &Task, ctx: &mut RunContext) -> TaskStatus {
        let title = task.title();
        self.observer.task_started(title);
        debug!(task = %title, "Task started");

        let skip = match evaluate_skip(task, ctx) {
            Ok(skip) => skip,
            Err(error) => return self.failed(task, error),
        };
        if skip {
            info!(task = %title, "Task skipped");
            self.observer.task_skipped(title);
            return TaskStatus::Skipped;
        }

        let result = AssertUnwindSafe(task.action().run(ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(TaskError::Panicked {
                    message: panic_message(payload.as_ref()),
                })
            });

        match result {
            Ok(()) => {
                info!(task = %title, "Task succeeded");
                self.observer.task_succeeded(title);
                TaskStatus::Succeeded
            }
            Err(error) => self.failed(task, error),
        }
    }

    fn failed(&self, task: &Task, error: TaskError) -> TaskStatus {
        let severity = task.severity();
        self.observer.task_failed(task.title(), &error, severity);

        match severity {
            Severity::Fatal => {
                error!(task = %task.title(), error = %error, "Task failed");
                TaskStatus::Failed(error)
            }
            Severity::Advisory => {
                warn!(task = %task.title(), error = %error, "Advisory task failed, continuing");
                TaskStatus::FailedAdvisory(error)
            }
        }
    }

    fn cancel_remaining(&self, cause: &str, remaining: &[Task]) -> Vec<String> {
        remaining
            .iter()
            .map(|task| {
                debug!(task = %task.title(), cause = %cause, "Task cancelled");
                self.observer.task_cancelled(task.title(), cause);
                task.title().to_string()
            })
            .collect()
    }
}

fn evaluate_skip(task: &Task, ctx: &RunContext) -> Result<bool, TaskError> {
    catch_unwind(AssertUnwindSafe(|| task.should_skip(ctx))).map_err(|payload| {
        TaskError::Panicked {
            message: panic_message(payload.as_ref()),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
