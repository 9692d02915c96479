//! Cloud resources: IAM principal, database, infra-as-code workspace.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ports::{
            CloudIdentity, DatabaseProvisioner, DatabaseRequest, Filesystem, InfraWorkspaces,
            SourceHost, WorkspaceRequest, WorkspaceVariable,
        },
        services::{PollPolicy, PollStatus, poll_until_terminal},
    },
    domain::{
        DatabaseGrant, Login, RunContext, TaskAction, TaskError, naming::repository_slug,
    },
};

/// Creates an IAM user named after the project plus an access key, and
/// appends the key as a named profile to the local credentials file.
pub struct CreateIamUser {
    identity: Arc<dyn CloudIdentity>,
    filesystem: Arc<dyn Filesystem>,
    credentials_file: PathBuf,
}

impl CreateIamUser {
    pub fn new(
        identity: Arc<dyn CloudIdentity>,
        filesystem: Arc<dyn Filesystem>,
        credentials_file: PathBuf,
    ) -> Self {
        Self {
            identity,
            filesystem,
            credentials_file,
        }
    }
}

#[async_trait]
impl TaskAction for CreateIamUser {
    #[instrument(skip_all, fields(user = %ctx.repository_name()))]
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let user = ctx.repository_name();
        self.identity.create_user(&user).await?;
        let key = self.identity.create_access_key(&user).await?;

        let profile = format!(
            "\n[{user}]\naws_access_key_id = {}\naws_secret_access_key = {}\n",
            key.id, key.secret
        );
        self.filesystem.append_file(&self.credentials_file, &profile)?;
        info!(
            profile = %user,
            file = %self.credentials_file.display(),
            "Access key stored"
        );

        ctx.outputs.access_key = Some(key);
        Ok(())
    }
}

/// Creates the application database and an owner with a generated password.
pub struct CreateDatabase {
    provisioner: Arc<dyn DatabaseProvisioner>,
}

impl CreateDatabase {
    pub fn new(provisioner: Arc<dyn DatabaseProvisioner>) -> Self {
        Self { provisioner }
    }
}

#[async_trait]
impl TaskAction for CreateDatabase {
    #[instrument(skip_all, fields(database = %ctx.database_name()))]
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let master = ctx
            .credentials
            .db_master
            .clone()
            .ok_or_else(|| TaskError::MissingInput {
                what: "database master credentials".into(),
                hint: "Set DB_MASTER_USER and DB_MASTER_PASSWORD".into(),
            })?;
        let name = ctx.database_name();
        let owner = Login {
            user: name.clone(),
            password: Uuid::new_v4().simple().to_string(),
        };

        let request = DatabaseRequest {
            master,
            database: name.clone(),
            owner: owner.clone(),
        };
        let url = self.provisioner.create_database(&request).await?;
        info!("Database created");

        ctx.outputs.database = Some(DatabaseGrant { name, owner, url });
        Ok(())
    }
}

/// Creates the remote workspace, linked to the project repository so it
/// plans from the pushed `infra/` directory, and injects the secrets it
/// deploys with.
pub struct CreateInfraWorkspace {
    infra: Arc<dyn InfraWorkspaces>,
    source_host: Arc<dyn SourceHost>,
}

impl CreateInfraWorkspace {
    pub fn new(infra: Arc<dyn InfraWorkspaces>, source_host: Arc<dyn SourceHost>) -> Self {
        Self { infra, source_host }
    }

    /// Repository URL from this run, or from the host when run on its own.
    async fn remote_url(&self, ctx: &mut RunContext) -> Result<String, TaskError> {
        if let Some(url) = &ctx.outputs.remote_url {
            return Ok(url.clone());
        }
        let url = self
            .source_host
            .repository_url(&ctx.repository_name())
            .await?;
        ctx.outputs.remote_url = Some(url.clone());
        Ok(url)
    }
}

#[async_trait]
impl TaskAction for CreateInfraWorkspace {
    #[instrument(skip_all, fields(workspace = %ctx.repository_name()))]
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let url = self.remote_url(ctx).await?;
        let repository = repository_slug(&url).ok_or_else(|| {
            TaskError::remote("source host", format!("no owner/name in remote URL '{url}'"))
        })?;
        let request = WorkspaceRequest {
            name: ctx.repository_name(),
            repository,
        };
        let id = self.infra.create_workspace(&request).await?;

        for variable in workspace_variables(ctx) {
            self.infra.set_variable(&id, &variable).await?;
        }

        info!(workspace_id = %id, repository = %request.repository, "Workspace ready");
        ctx.outputs.workspace_id = Some(id);
        Ok(())
    }
}

fn workspace_variables(ctx: &RunContext) -> Vec<WorkspaceVariable> {
    let input = |key: &str, value: &str, sensitive: bool| WorkspaceVariable {
        key: key.to_string(),
        value: value.to_string(),
        sensitive,
        env: false,
    };
    let env = |key: &str, value: &str, sensitive: bool| WorkspaceVariable {
        env: true,
        ..input(key, value, sensitive)
    };

    let mut vars = vec![input("domain", ctx.name(), false)];
    match &ctx.outputs.access_key {
        Some(key) => {
            vars.push(env("AWS_ACCESS_KEY_ID", &key.id, false));
            vars.push(env("AWS_SECRET_ACCESS_KEY", &key.secret, true));
        }
        None => warn!("No access key from this run; workspace gets no cloud credentials"),
    }
    match &ctx.outputs.database {
        Some(db) => vars.push(input("database_url", &db.url, true)),
        None => warn!("No database from this run; workspace gets no database URL"),
    }
    vars
}

/// Queues the workspace's first run against the pushed commit and waits
/// for it to apply.
pub struct AwaitInfraApply {
    infra: Arc<dyn InfraWorkspaces>,
    poll: PollPolicy,
}

impl AwaitInfraApply {
    pub fn new(infra: Arc<dyn InfraWorkspaces>, poll: PollPolicy) -> Self {
        Self { infra, poll }
    }
}

#[async_trait]
impl TaskAction for AwaitInfraApply {
    #[instrument(skip_all, fields(workspace_id = ctx.outputs.workspace_id.as_deref()))]
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let workspace_id = ctx.require_workspace_id()?;
        let message = format!("Initial apply for {}", ctx.name());
        let run_id = self.infra.queue_run(workspace_id, &message).await?;
        info!(%run_id, "Run queued");

        let infra = Arc::clone(&self.infra);
        let status = poll_until_terminal(
            "infrastructure apply",
            &self.poll,
            move || {
                let infra = Arc::clone(&infra);
                let run_id = run_id.clone();
                async move { infra.run_status(&run_id).await }
            },
            apply_status,
        )
        .await?;

        info!(%status, "Infrastructure applied");
        Ok(())
    }
}

pub fn apply_status(status: &String) -> PollStatus {
    match status.as_str() {
        "applied" | "planned_and_finished" => PollStatus::Succeeded,
        "errored" | "discarded" | "canceled" | "force_canceled" | "policy_soft_failed" => {
            PollStatus::Failed
        }
        _ => PollStatus::Pending,
    }
}
