//! Application layer for kickstart.
//!
//! This layer contains:
//! - **Services**: the task runner, the long-poll helper and pipeline assembly
//! - **Ports**: interface definitions (traits) for external systems
//! - **Steps**: the task actions the standard pipeline is built from
//!
//! Naming rules and ordering live in `crate::domain`; this layer only
//! sequences them against the ports.

pub mod ports;
pub mod services;
pub mod steps;

pub use services::{
    Pipeline, PipelineSettings, PlannedTask, PollPolicy, PollStatus, RunOutcome, RunReport,
    Services, TaskRecord, TaskRunner, poll_until_terminal, titles,
};

pub use ports::{Filesystem, RunObserver, ScaffoldTemplates, Shell};
