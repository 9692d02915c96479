//! Kickstart Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the kickstart
//! project bootstrap tool, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          kickstart-cli (CLI)            │
//! │   (Builds RunContext, picks run mode)   │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (TaskRunner, Pipeline, poll helper)    │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, Shell, SourceHost, ...)    │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   kickstart-adapters (Infrastructure)   │
//! │ (LocalFilesystem, ProcessShell, ...)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Task, Plan, RunContext, naming)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kickstart_core::prelude::*;
//!
//! # async fn demo(services: Services, observer: std::sync::Arc<dyn RunObserver>, ctx: &mut RunContext) {
//! let plan = Pipeline::new(services).plan().unwrap();
//! let runner = TaskRunner::new(plan, observer);
//! let report = runner.run_all(ctx).await;
//! assert!(report.is_success());
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Pipeline, PollPolicy, PollStatus, RunOutcome, RunReport, Services, TaskRunner,
        poll_until_terminal,
        ports::{
            CloudIdentity, DatabaseProvisioner, DomainRegistrar, Filesystem, InfraWorkspaces,
            RunObserver, ScaffoldTemplates, Shell, SourceHost,
        },
    };
    pub use crate::domain::{
        Credentials, Plan, ProjectSpec, RenderContext, RunContext, Severity, Task, TaskAction,
        TaskError, TaskStatus,
    };
    pub use crate::error::{KickstartError, KickstartResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
