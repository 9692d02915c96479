//! Builds the concrete [`Services`] for a run from configuration and
//! credentials.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use kickstart_adapters::{
    AwsCli, BuiltinTemplates, GitHubClient, HttpSettings, LocalFilesystem, PostgresCli,
    ProcessShell, TerraformCloudClient, TerraformSettings,
};
use kickstart_core::application::ports::{
    InfraWorkspaces, Shell, SourceHost, WorkspaceRequest, WorkspaceVariable,
};
use kickstart_core::prelude::{Credentials, Services, TaskError};

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

pub fn services(config: &AppConfig, credentials: &Credentials) -> CliResult<Services> {
    let shell: Arc<dyn Shell> = Arc::new(ProcessShell::new());
    let http = config.http_settings();
    let aws = Arc::new(AwsCli::new(Arc::clone(&shell), config.aws_settings(credentials)));

    let source_host: Arc<dyn SourceHost> = match &credentials.github_token {
        Some(token) => Arc::new(
            GitHubClient::new(
                token.clone(),
                config.github_settings(),
                &http,
                Arc::clone(&shell),
            )
            .map_err(|e| client_error("GitHub", e))?,
        ),
        None => Arc::new(Unconfigured::new("a GitHub token", "set GITHUB_TOKEN")),
    };

    let infra = infra_workspaces(config, credentials, &http)?;
    debug!(
        github = credentials.github_token.is_some(),
        terraform = credentials.has_infra_tokens(),
        "Remote services wired"
    );

    Ok(Services {
        filesystem: Arc::new(LocalFilesystem::new()),
        shell: Arc::clone(&shell),
        templates: Arc::new(BuiltinTemplates::new()),
        registrar: aws.clone(),
        identity: aws,
        database: Arc::new(PostgresCli::new(shell, config.postgres_settings())),
        source_host,
        infra,
        settings: config.pipeline_settings(),
    })
}

fn infra_workspaces(
    config: &AppConfig,
    credentials: &Credentials,
    http: &HttpSettings,
) -> CliResult<Arc<dyn InfraWorkspaces>> {
    let (Some(org_token), Some(user_token)) =
        (&credentials.tf_org_token, &credentials.tf_user_token)
    else {
        return Ok(Arc::new(Unconfigured::new(
            "Terraform Cloud tokens",
            "set TF_ORG_TOKEN and TF_USER_TOKEN",
        )));
    };
    let Some(organization) = &config.terraform.organization else {
        return Ok(Arc::new(Unconfigured::new(
            "a Terraform Cloud organization",
            "set terraform.organization in the config file or KICKSTART__TERRAFORM__ORGANIZATION",
        )));
    };
    let Some(oauth_token_id) = &config.terraform.oauth_token_id else {
        return Ok(Arc::new(Unconfigured::new(
            "a Terraform Cloud VCS connection",
            "set terraform.oauth_token_id in the config file or KICKSTART__TERRAFORM__OAUTH_TOKEN_ID",
        )));
    };

    let client = TerraformCloudClient::new(
        org_token,
        user_token,
        TerraformSettings {
            api_url: config.terraform.api_url.clone(),
            organization: organization.clone(),
            oauth_token_id: oauth_token_id.clone(),
        },
        http,
    )
    .map_err(|e| client_error("Terraform Cloud", e))?;
    Ok(Arc::new(client))
}

fn client_error(service: &str, err: TaskError) -> CliError {
    CliError::ConfigError {
        message: format!("cannot build the {service} client: {err}"),
        source: Some(Box::new(err)),
    }
}

/// Stands in for a remote service whose credentials or settings are
/// missing. Tasks using it are normally skipped; a forced run reports what
/// is missing.
struct Unconfigured {
    what: &'static str,
    hint: &'static str,
}

impl Unconfigured {
    fn new(what: &'static str, hint: &'static str) -> Self {
        Self { what, hint }
    }

    fn error(&self) -> TaskError {
        TaskError::MissingInput {
            what: self.what.into(),
            hint: self.hint.into(),
        }
    }
}

#[async_trait]
impl SourceHost for Unconfigured {
    async fn repository_exists(&self, _name: &str) -> Result<bool, TaskError> {
        Err(self.error())
    }

    async fn create_repository(&self, _name: &str, _private: bool) -> Result<String, TaskError> {
        Err(self.error())
    }

    async fn repository_url(&self, _name: &str) -> Result<String, TaskError> {
        Err(self.error())
    }

    async fn set_secret(&self, _repository: &str, _name: &str, _value: &str) -> Result<(), TaskError> {
        Err(self.error())
    }

    async fn commit_run_status(
        &self,
        _repository: &str,
        _commit: &str,
    ) -> Result<String, TaskError> {
        Err(self.error())
    }
}

#[async_trait]
impl InfraWorkspaces for Unconfigured {
    async fn create_workspace(&self, _request: &WorkspaceRequest) -> Result<String, TaskError> {
        Err(self.error())
    }

    async fn set_variable(
        &self,
        _workspace_id: &str,
        _variable: &WorkspaceVariable,
    ) -> Result<(), TaskError> {
        Err(self.error())
    }

    async fn queue_run(&self, _workspace_id: &str, _message: &str) -> Result<String, TaskError> {
        Err(self.error())
    }

    async fn run_status(&self, _run_id: &str) -> Result<String, TaskError> {
        Err(self.error())
    }
}
