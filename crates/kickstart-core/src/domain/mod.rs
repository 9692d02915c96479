// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for kickstart.
//!
//! Pure logic with no I/O: the task model and its ordering, the run context
//! shared between tasks, naming rules, and the shapes of generated files.
//! Everything that touches the outside world goes through the ports in
//! `crate::application::ports`.

pub mod contact;
pub mod context;
pub mod error;
pub mod naming;
pub mod plan;
pub mod project_structure;
pub mod render;
pub mod task;

pub use contact::ContactDetails;
pub use context::{
    AccessKey, Credentials, DatabaseGrant, Login, Outputs, ProjectSettings, ProjectSpec,
    RunContext,
};
pub use error::{ErrorCategory, PlanError, TaskError};
pub use plan::Plan;
pub use project_structure::{DirectoryToCreate, FileToWrite, FsEntry, ProjectStructure};
pub use render::RenderContext;
pub use task::{Severity, SkipPredicate, Task, TaskAction, TaskStatus};
