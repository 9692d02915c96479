//! Assembly of the standard bootstrap pipeline.
//!
//! [`Pipeline`] wires the steps to the ports in [`Services`], attaches
//! dependencies, skip predicates and severities, and hands the result to
//! [`Plan::new`] for ordering.

use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    application::{
        ports::{
            Artifact, CloudIdentity, DatabaseProvisioner, DomainRegistrar, Filesystem,
            InfraWorkspaces, ScaffoldTemplates, Shell, SourceHost,
        },
        services::PollPolicy,
        steps::{
            AwaitCiRun, AwaitInfraApply, CheckDomainOwnership, CreateDatabase, CreateIamUser,
            CreateInfraWorkspace, CreateProjectDirectory, CreateRemoteRepository, GitPush,
            GitRemote, InstallDependencies, PurchaseDomain, RunCommand, SetCiSecrets,
            ValidatePackageName, VersionTag, WriteArtifact,
        },
    },
    domain::{Plan, RunContext, Task},
    error::KickstartResult,
};

/// Task titles, as accepted by `--task`.
pub mod titles {
    pub const VALIDATE_PACKAGE_NAME: &str = "Validate package name";
    pub const CHECK_DOMAIN_OWNERSHIP: &str = "Check domain ownership";
    pub const PURCHASE_DOMAIN: &str = "Purchase domain";
    pub const CREATE_PROJECT_DIRECTORY: &str = "Create project directory";
    pub const WRITE_MANIFEST: &str = "Write manifest";
    pub const WRITE_README: &str = "Write README";
    pub const WRITE_LINTER_CONFIG: &str = "Write linter config";
    pub const WRITE_LICENSE: &str = "Write license";
    pub const WRITE_CI_WORKFLOW: &str = "Write CI workflow";
    pub const WRITE_SOURCES: &str = "Write source scaffolding";
    pub const WRITE_INFRASTRUCTURE: &str = "Write infrastructure definition";
    pub const INSTALL_DEPENDENCIES: &str = "Install dependencies";
    pub const CREATE_IAM_USER: &str = "Create IAM user";
    pub const CREATE_DATABASE: &str = "Create database";
    pub const WRITE_LOCAL_ENV: &str = "Write local environment file";
    pub const CREATE_INFRA_WORKSPACE: &str = "Create infrastructure workspace";
    pub const GIT_INIT: &str = "Git init";
    pub const CREATE_REMOTE_REPOSITORY: &str = "Create remote repository";
    pub const SET_CI_SECRETS: &str = "Set CI secrets";
    pub const GIT_ADD: &str = "Git add";
    pub const GIT_COMMIT: &str = "Git commit";
    pub const VERSION_TAG: &str = "Version tag";
    pub const GIT_REMOTE: &str = "Git remote";
    pub const GIT_PUSH: &str = "Git push";
    pub const AWAIT_CI_RUN: &str = "Await CI run";
    pub const AWAIT_INFRA_APPLY: &str = "Await infrastructure apply";
}

/// Knobs the pipeline takes from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub poll: PollPolicy,
    pub private_repository: bool,
    /// Shared cloud credentials file new access keys are appended to.
    pub cloud_credentials_file: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            private_repository: true,
            cloud_credentials_file: PathBuf::from(".aws/credentials"),
        }
    }
}

/// Every port the standard pipeline needs.
#[derive(Clone)]
pub struct Services {
    pub filesystem: Arc<dyn Filesystem>,
    pub shell: Arc<dyn Shell>,
    pub templates: Arc<dyn ScaffoldTemplates>,
    pub registrar: Arc<dyn DomainRegistrar>,
    pub identity: Arc<dyn CloudIdentity>,
    pub database: Arc<dyn DatabaseProvisioner>,
    pub source_host: Arc<dyn SourceHost>,
    pub infra: Arc<dyn InfraWorkspaces>,
    pub settings: PipelineSettings,
}

/// Builds the standard task list.
pub struct Pipeline {
    services: Services,
}

impl Pipeline {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// The ordered plan.
    pub fn plan(&self) -> KickstartResult<Plan> {
        Ok(Plan::new(self.tasks())?)
    }

    /// Tasks in declaration order, before planning.
    pub fn tasks(&self) -> Vec<Task> {
        use titles::*;

        let s = &self.services;
        let poll = s.settings.poll;
        let write = |artifact| {
            WriteArtifact::new(artifact, Arc::clone(&s.filesystem), Arc::clone(&s.templates))
        };
        let git = |args: &[&str]| RunCommand::new(Arc::clone(&s.shell), "git", args.to_vec());

        vec![
            Task::new(VALIDATE_PACKAGE_NAME, ValidatePackageName).skip_when(RunContext::is_app),
            Task::new(
                CHECK_DOMAIN_OWNERSHIP,
                CheckDomainOwnership::new(Arc::clone(&s.registrar)),
            )
            .skip_when(not_app),
            Task::new(
                PURCHASE_DOMAIN,
                PurchaseDomain::new(Arc::clone(&s.registrar), poll),
            )
            .depends_on([CHECK_DOMAIN_OWNERSHIP])
            .skip_when(|ctx| !ctx.is_app() || ctx.outputs.domain_owned == Some(true)),
            Task::new(
                CREATE_PROJECT_DIRECTORY,
                CreateProjectDirectory::new(Arc::clone(&s.filesystem)),
            )
            .depends_on([VALIDATE_PACKAGE_NAME]),
            Task::new(WRITE_MANIFEST, write(Artifact::Manifest))
                .depends_on([CREATE_PROJECT_DIRECTORY]),
            Task::new(WRITE_README, write(Artifact::Readme)).depends_on([CREATE_PROJECT_DIRECTORY]),
            Task::new(WRITE_LINTER_CONFIG, write(Artifact::LinterConfig))
                .depends_on([CREATE_PROJECT_DIRECTORY]),
            Task::new(WRITE_LICENSE, write(Artifact::License))
                .depends_on([CREATE_PROJECT_DIRECTORY]),
            Task::new(WRITE_CI_WORKFLOW, write(Artifact::CiWorkflow))
                .depends_on([CREATE_PROJECT_DIRECTORY]),
            Task::new(WRITE_SOURCES, write(Artifact::Sources))
                .depends_on([CREATE_PROJECT_DIRECTORY]),
            Task::new(WRITE_INFRASTRUCTURE, write(Artifact::Infrastructure))
                .depends_on([CREATE_PROJECT_DIRECTORY])
                .skip_when(not_app),
            Task::new(
                INSTALL_DEPENDENCIES,
                InstallDependencies::new(Arc::clone(&s.shell)),
            )
            .depends_on([WRITE_MANIFEST]),
            Task::new(
                CREATE_IAM_USER,
                CreateIamUser::new(
                    Arc::clone(&s.identity),
                    Arc::clone(&s.filesystem),
                    s.settings.cloud_credentials_file.clone(),
                ),
            )
            .depends_on([CREATE_PROJECT_DIRECTORY])
            .skip_when(|ctx| !ctx.is_app() || ctx.credentials.aws_profile.is_none()),
            Task::new(CREATE_DATABASE, CreateDatabase::new(Arc::clone(&s.database)))
                .depends_on([CREATE_PROJECT_DIRECTORY])
                .skip_when(|ctx| !ctx.is_app() || ctx.credentials.db_master.is_none()),
            Task::new(WRITE_LOCAL_ENV, write(Artifact::LocalEnv))
                .depends_on([CREATE_DATABASE])
                .skip_when(not_app),
            Task::new(GIT_INIT, git(&["init"])).depends_on([INSTALL_DEPENDENCIES]),
            Task::new(
                CREATE_REMOTE_REPOSITORY,
                CreateRemoteRepository::new(
                    Arc::clone(&s.source_host),
                    s.settings.private_repository,
                ),
            )
            .depends_on([GIT_INIT])
            .skip_when(without_source_host),
            Task::new(
                CREATE_INFRA_WORKSPACE,
                CreateInfraWorkspace::new(Arc::clone(&s.infra), Arc::clone(&s.source_host)),
            )
            .depends_on([CREATE_IAM_USER, CREATE_DATABASE, CREATE_REMOTE_REPOSITORY])
            .skip_when(without_infra),
            Task::new(SET_CI_SECRETS, SetCiSecrets::new(Arc::clone(&s.source_host)))
                .depends_on([CREATE_REMOTE_REPOSITORY, CREATE_IAM_USER])
                .skip_when(without_source_host)
                .advisory(),
            Task::new(GIT_ADD, git(&["add", "."])).depends_on([GIT_INIT]),
            Task::new(GIT_COMMIT, git(&["commit", "-m", "Initial commit"])).depends_on([GIT_ADD]),
            Task::new(VERSION_TAG, VersionTag::new(Arc::clone(&s.shell))).depends_on([GIT_COMMIT]),
            Task::new(
                GIT_REMOTE,
                GitRemote::new(Arc::clone(&s.shell), Arc::clone(&s.source_host)),
            )
            .depends_on([GIT_INIT, CREATE_REMOTE_REPOSITORY])
            .skip_when(without_source_host),
            Task::new(GIT_PUSH, GitPush::new(Arc::clone(&s.shell)))
                .depends_on([VERSION_TAG, GIT_REMOTE])
                .skip_when(without_source_host),
            Task::new(
                AWAIT_CI_RUN,
                AwaitCiRun::new(Arc::clone(&s.source_host), Arc::clone(&s.shell), poll),
            )
            .depends_on([GIT_PUSH])
            .skip_when(without_source_host),
            Task::new(
                AWAIT_INFRA_APPLY,
                AwaitInfraApply::new(Arc::clone(&s.infra), poll),
            )
            .depends_on([CREATE_INFRA_WORKSPACE, GIT_PUSH])
            .skip_when(without_infra),
        ]
    }
}

fn not_app(ctx: &RunContext) -> bool {
    !ctx.is_app()
}

/// The workspace plans from the remote repository, so it needs one too.
fn without_infra(ctx: &RunContext) -> bool {
    !ctx.is_app() || !ctx.credentials.has_infra_tokens() || without_source_host(ctx)
}

fn without_source_host(ctx: &RunContext) -> bool {
    ctx.credentials.github_token.is_none()
}
