//! Adapters for the third-party services a run provisions.
//!
//! - [`GitHubClient`]: repositories, Actions secrets, workflow runs
//! - [`TerraformCloudClient`]: workspaces, variables, runs
//! - [`AwsCli`]: domain registration and IAM through the `aws` CLI
//! - [`PostgresCli`]: database and owner through `psql`

mod aws;
mod github;
mod http;
mod postgres;
mod terraform;

pub use aws::{AwsCli, AwsSettings};
pub use github::{GitHubClient, GitHubSettings};
pub use http::HttpSettings;
pub use postgres::{PostgresCli, PostgresSettings};
pub use terraform::{TerraformCloudClient, TerraformSettings, workspace_name};
