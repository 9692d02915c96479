//! Infrastructure adapters for kickstart.
//!
//! This crate implements the ports defined in
//! `kickstart-core::application::ports`. It contains all external
//! dependencies and I/O operations.

pub mod filesystem;
pub mod remote;
pub mod shell;
pub mod templates;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use remote::{
    AwsCli, AwsSettings, GitHubClient, GitHubSettings, HttpSettings, PostgresCli,
    PostgresSettings, TerraformCloudClient, TerraformSettings,
};
pub use shell::{ProcessShell, ScriptedShell};
pub use templates::BuiltinTemplates;
