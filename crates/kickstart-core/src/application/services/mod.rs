//! Application services - orchestrate a bootstrap run.
//!
//! [`TaskRunner`] executes a [`Plan`](crate::domain::Plan),
//! [`poll_until_terminal`] waits on remote operations, and [`Pipeline`]
//! assembles the standard task list from a set of [`Services`].

pub mod pipeline;
pub mod poll;
pub mod runner;

pub use pipeline::{Pipeline, PipelineSettings, Services, titles};
pub use poll::{PollPolicy, PollStatus, poll_until_terminal};
pub use runner::{PlannedTask, RunOutcome, RunReport, TaskRecord, TaskRunner};
