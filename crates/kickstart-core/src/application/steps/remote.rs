//! Source-host steps: remote repository, CI secrets, first CI run.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ports::{CommandSpec, Shell, SourceHost},
        services::{PollPolicy, PollStatus, poll_until_terminal},
    },
    domain::{RunContext, TaskAction, TaskError},
};

/// Creates the remote repository, or reuses it when it already exists.
pub struct CreateRemoteRepository {
    source_host: Arc<dyn SourceHost>,
    private: bool,
}

impl CreateRemoteRepository {
    pub fn new(source_host: Arc<dyn SourceHost>, private: bool) -> Self {
        Self {
            source_host,
            private,
        }
    }
}

#[async_trait]
impl TaskAction for CreateRemoteRepository {
    #[instrument(skip_all, fields(repository = %ctx.repository_name()))]
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let name = ctx.repository_name();

        let url = if self.source_host.repository_exists(&name).await? {
            warn!("Repository already exists, reusing it");
            self.source_host.repository_url(&name).await?
        } else {
            let url = self.source_host.create_repository(&name, self.private).await?;
            info!(%url, "Repository created");
            url
        };

        ctx.outputs.remote_url = Some(url);
        Ok(())
    }
}

/// Uploads the secrets CI needs. Whatever this run did not produce is left out.
pub struct SetCiSecrets {
    source_host: Arc<dyn SourceHost>,
}

impl SetCiSecrets {
    pub fn new(source_host: Arc<dyn SourceHost>) -> Self {
        Self { source_host }
    }
}

#[async_trait]
impl TaskAction for SetCiSecrets {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let repository = ctx.repository_name();
        let secrets = ci_secrets(ctx);
        if secrets.is_empty() {
            warn!("No secrets available to upload");
        }

        for (name, value) in &secrets {
            self.source_host.set_secret(&repository, name, value).await?;
            info!(secret = %name, "Secret set");
        }
        Ok(())
    }
}

fn ci_secrets(ctx: &RunContext) -> Vec<(&'static str, String)> {
    let mut secrets = Vec::new();
    if let Some(token) = &ctx.credentials.npm_token {
        secrets.push(("NPM_TOKEN", token.clone()));
    }
    if let Some(key) = &ctx.outputs.access_key {
        secrets.push(("AWS_ACCESS_KEY_ID", key.id.clone()));
        secrets.push(("AWS_SECRET_ACCESS_KEY", key.secret.clone()));
    }
    if let Some(db) = &ctx.outputs.database {
        secrets.push(("DATABASE_URL", db.url.clone()));
    }
    secrets
}

/// Waits for the CI run on the pushed commit.
///
/// Runs are matched by commit, so older runs in a reused repository are
/// never mistaken for this one.
pub struct AwaitCiRun {
    source_host: Arc<dyn SourceHost>,
    shell: Arc<dyn Shell>,
    poll: PollPolicy,
}

impl AwaitCiRun {
    pub fn new(source_host: Arc<dyn SourceHost>, shell: Arc<dyn Shell>, poll: PollPolicy) -> Self {
        Self {
            source_host,
            shell,
            poll,
        }
    }

    async fn head_commit(&self, ctx: &RunContext) -> Result<String, TaskError> {
        let command = CommandSpec::new("git", ["rev-parse", "HEAD"]).in_dir(ctx.project_dir());
        let commit = self.shell.run(&command).await?.stdout.trim().to_string();
        if commit.is_empty() {
            return Err(TaskError::MissingContext {
                field: "pushed commit",
            });
        }
        Ok(commit)
    }
}

#[async_trait]
impl TaskAction for AwaitCiRun {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let repository = ctx.repository_name();
        let commit = self.head_commit(ctx).await?;
        let source_host = Arc::clone(&self.source_host);

        let status = poll_until_terminal(
            "CI run",
            &self.poll,
            move || {
                let source_host = Arc::clone(&source_host);
                let repository = repository.clone();
                let commit = commit.clone();
                async move { source_host.commit_run_status(&repository, &commit).await }
            },
            ci_status,
        )
        .await?;

        info!(%status, "CI run finished");
        Ok(())
    }
}

/// Run conclusions once completed, the run status before that, `none`
/// while no run exists yet.
pub fn ci_status(status: &String) -> PollStatus {
    match status.as_str() {
        "success" | "neutral" | "skipped" => PollStatus::Succeeded,
        "failure" | "cancelled" | "timed_out" | "action_required" | "startup_failure" => {
            PollStatus::Failed
        }
        _ => PollStatus::Pending,
    }
}
