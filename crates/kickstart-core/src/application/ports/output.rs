//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the pipeline needs from external systems.
//! The `kickstart-adapters` crate provides implementations; the CLI provides
//! the [`RunObserver`].

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{
    AccessKey, ContactDetails, Login, ProjectStructure, RenderContext, Severity, TaskError,
};

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kickstart_adapters::filesystem::LocalFilesystem` (production)
/// - `kickstart_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> Result<(), TaskError>;

    /// Write content to a file, replacing it.
    fn write_file(&self, path: &Path, content: &str) -> Result<(), TaskError>;

    /// Append content to a file, creating it and its parents if needed.
    fn append_file(&self, path: &Path, content: &str) -> Result<(), TaskError>;

    fn read_file(&self, path: &Path) -> Result<String, TaskError>;

    /// Mark a file executable.
    fn set_executable(&self, path: &Path) -> Result<(), TaskError>;

    fn exists(&self, path: &Path) -> bool;
}

/// A subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// Port for running subprocesses. A non-zero exit is an `Err`.
///
/// Implemented by:
/// - `kickstart_adapters::shell::ProcessShell` (production)
/// - `kickstart_adapters::shell::ScriptedShell` (testing)
#[async_trait]
pub trait Shell: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, TaskError>;
}

/// Which generated file set to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Manifest,
    Readme,
    LinterConfig,
    License,
    CiWorkflow,
    Sources,
    Infrastructure,
    LocalEnv,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manifest => "manifest",
            Self::Readme => "README",
            Self::LinterConfig => "linter config",
            Self::License => "license",
            Self::CiWorkflow => "CI workflow",
            Self::Sources => "source scaffolding",
            Self::Infrastructure => "infrastructure definition",
            Self::LocalEnv => "local environment file",
        };
        f.write_str(name)
    }
}

/// Feature switches that change what gets rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    pub react: bool,
    pub app: bool,
}

/// Port for rendering generated files.
///
/// Implemented by `kickstart_adapters::templates::BuiltinTemplates`.
pub trait ScaffoldTemplates: Send + Sync {
    fn render(
        &self,
        artifact: Artifact,
        ctx: &RenderContext,
        features: Features,
    ) -> Result<ProjectStructure, TaskError>;
}

/// Port for domain registration.
#[async_trait]
pub trait DomainRegistrar: Send + Sync {
    /// Whether the operator's account already holds `domain`.
    async fn is_owned(&self, domain: &str) -> Result<bool, TaskError>;

    /// Submit a registration; returns the operation id to poll.
    async fn register(&self, domain: &str, contact: &ContactDetails) -> Result<String, TaskError>;

    /// Raw status of a submitted operation.
    async fn operation_status(&self, operation_id: &str) -> Result<String, TaskError>;
}

/// Port for cloud identity management.
#[async_trait]
pub trait CloudIdentity: Send + Sync {
    async fn create_user(&self, user: &str) -> Result<(), TaskError>;

    async fn create_access_key(&self, user: &str) -> Result<AccessKey, TaskError>;
}

/// What to create on the database server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRequest {
    pub master: Login,
    pub database: String,
    pub owner: Login,
}

/// Port for database provisioning.
#[async_trait]
pub trait DatabaseProvisioner: Send + Sync {
    /// Create the database and its owner; returns the owner's connection URL.
    async fn create_database(&self, request: &DatabaseRequest) -> Result<String, TaskError>;
}

/// Port for the source-control host (repositories, CI secrets, CI runs).
#[async_trait]
pub trait SourceHost: Send + Sync {
    async fn repository_exists(&self, name: &str) -> Result<bool, TaskError>;

    /// Create a repository; returns its clone URL.
    async fn create_repository(&self, name: &str, private: bool) -> Result<String, TaskError>;

    /// Clone URL of an existing repository.
    async fn repository_url(&self, name: &str) -> Result<String, TaskError>;

    async fn set_secret(&self, repository: &str, name: &str, value: &str) -> Result<(), TaskError>;

    /// Status of the newest CI run for `commit`, `"none"` while there is none.
    async fn commit_run_status(&self, repository: &str, commit: &str) -> Result<String, TaskError>;
}

/// A variable injected into a remote infra-as-code workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceVariable {
    pub key: String,
    pub value: String,
    pub sensitive: bool,
    /// `true` for environment variables, `false` for input variables.
    pub env: bool,
}

/// A workspace to create, sourcing its configuration from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRequest {
    pub name: String,
    /// `owner/name` on the source host.
    pub repository: String,
}

/// Port for the remote infra-as-code host.
#[async_trait]
pub trait InfraWorkspaces: Send + Sync {
    /// Create a workspace linked to its repository; returns its id.
    async fn create_workspace(&self, request: &WorkspaceRequest) -> Result<String, TaskError>;

    async fn set_variable(
        &self,
        workspace_id: &str,
        variable: &WorkspaceVariable,
    ) -> Result<(), TaskError>;

    /// Queue a plan-and-apply run; returns the run id.
    async fn queue_run(&self, workspace_id: &str, message: &str) -> Result<String, TaskError>;

    /// Raw status of a queued run.
    async fn run_status(&self, run_id: &str) -> Result<String, TaskError>;
}

/// Receives the runner's per-task notifications.
///
/// Implemented by the CLI's `OutputManager`.
pub trait RunObserver: Send + Sync {
    fn task_started(&self, title: &str);

    fn task_skipped(&self, title: &str);

    fn task_succeeded(&self, title: &str);

    fn task_failed(&self, title: &str, error: &TaskError, severity: Severity);

    /// `title` never ran because `cause` failed.
    fn task_cancelled(&self, title: &str, cause: &str);
}
