//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `kickstart-adapters` implement
//! these.
//!
//! ## Port Types
//!
//! - **Local**: `Filesystem`, `Shell`, `ScaffoldTemplates`
//! - **Remote**: `DomainRegistrar`, `CloudIdentity`, `DatabaseProvisioner`,
//!   `SourceHost`, `InfraWorkspaces`
//! - **Reporting**: `RunObserver` (implemented by the CLI)

pub mod output;

pub use output::{
    Artifact, CloudIdentity, CommandOutput, CommandSpec, DatabaseProvisioner, DatabaseRequest,
    DomainRegistrar, Features, Filesystem, InfraWorkspaces, RunObserver, ScaffoldTemplates, Shell,
    SourceHost, WorkspaceRequest, WorkspaceVariable,
};
