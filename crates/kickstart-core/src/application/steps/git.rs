//! Subprocess steps: dependency install and local version control.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::{
    application::ports::{CommandSpec, Shell, SourceHost},
    domain::{RunContext, TaskAction, TaskError},
};

/// Runs a fixed command inside the project directory.
pub struct RunCommand {
    shell: Arc<dyn Shell>,
    program: String,
    args: Vec<String>,
}

impl RunCommand {
    pub fn new<I, S>(shell: Arc<dyn Shell>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shell,
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl TaskAction for RunCommand {
    #[instrument(skip_all, fields(program = %self.program))]
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let command = CommandSpec::new(&self.program, &self.args).in_dir(ctx.project_dir());
        self.shell.run(&command).await?;
        Ok(())
    }
}

/// `npm install`, authenticated with the registry token when one is set.
pub struct InstallDependencies {
    shell: Arc<dyn Shell>,
}

impl InstallDependencies {
    pub fn new(shell: Arc<dyn Shell>) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl TaskAction for InstallDependencies {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let mut command = CommandSpec::new("npm", ["install"]).in_dir(ctx.project_dir());
        if let Some(token) = &ctx.credentials.npm_token {
            command = command.with_env("NPM_TOKEN", token);
        }
        self.shell.run(&command).await?;
        Ok(())
    }
}

/// Annotated `v<version>` tag so `git push --follow-tags` carries it.
pub struct VersionTag {
    shell: Arc<dyn Shell>,
}

impl VersionTag {
    pub fn new(shell: Arc<dyn Shell>) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl TaskAction for VersionTag {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let tag = format!("v{}", ctx.settings.initial_version);
        let command = CommandSpec::new("git", ["tag", "-a", tag.as_str(), "-m", tag.as_str()])
            .in_dir(ctx.project_dir());
        self.shell.run(&command).await?;
        info!(%tag, "Tagged initial version");
        Ok(())
    }
}

/// Points `origin` at the remote repository.
///
/// Uses the URL recorded by an earlier task, or asks the host when run on
/// its own.
pub struct GitRemote {
    shell: Arc<dyn Shell>,
    source_host: Arc<dyn SourceHost>,
}

impl GitRemote {
    pub fn new(shell: Arc<dyn Shell>, source_host: Arc<dyn SourceHost>) -> Self {
        Self { shell, source_host }
    }
}

#[async_trait]
impl TaskAction for GitRemote {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let url = match ctx.outputs.remote_url.clone() {
            Some(url) => url,
            None => {
                let url = self
                    .source_host
                    .repository_url(&ctx.repository_name())
                    .await?;
                ctx.outputs.remote_url = Some(url.clone());
                url
            }
        };

        let command = CommandSpec::new("git", ["remote", "add", "origin", url.as_str()])
            .in_dir(ctx.project_dir());
        self.shell.run(&command).await?;
        Ok(())
    }
}

pub struct GitPush {
    shell: Arc<dyn Shell>,
}

impl GitPush {
    pub fn new(shell: Arc<dyn Shell>) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl TaskAction for GitPush {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let command = CommandSpec::new("git", ["push", "--follow-tags", "-u", "origin", "HEAD"])
            .in_dir(ctx.project_dir());
        self.shell.run(&command).await?;
        Ok(())
    }
}
