//! Task actions the standard pipeline is assembled from.
//!
//! Each step holds the ports it talks to and reads or writes only the
//! [`RunContext`](crate::domain::RunContext) it is handed.

pub mod cloud;
pub mod domain;
pub mod files;
pub mod git;
pub mod remote;

pub use cloud::{AwaitInfraApply, CreateDatabase, CreateIamUser, CreateInfraWorkspace, apply_status};
pub use domain::{CheckDomainOwnership, PurchaseDomain, registration_status};
pub use files::{CreateProjectDirectory, ValidatePackageName, WriteArtifact};
pub use git::{GitPush, GitRemote, InstallDependencies, RunCommand, VersionTag};
pub use remote::{AwaitCiRun, CreateRemoteRepository, SetCiSecrets, ci_status};
