//! State shared between the tasks of one run.
//!
//! [`RunContext`] is the only channel through which a task hands data to a
//! later one. It is borrowed mutably by exactly one action at a time, so no
//! locking is involved. Fields under [`Outputs`] are written by a task and
//! read only by tasks ordered after it.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{
    error::TaskError,
    naming::{database_name, is_domain_name, repository_name},
    render::RenderContext,
};

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    /// Package name or domain name, as typed.
    pub name: String,
    /// Include a UI-framework scaffold.
    pub react: bool,
    /// `--app` was passed explicitly.
    pub app_flag: bool,
    /// Directory the project directory is created in.
    pub parent_dir: PathBuf,
}

impl ProjectSpec {
    pub fn new(name: impl Into<String>, parent_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            react: false,
            app_flag: false,
            parent_dir: parent_dir.into(),
        }
    }

    pub fn with_react(mut self, react: bool) -> Self {
        self.react = react;
        self
    }

    pub fn with_app(mut self, app: bool) -> Self {
        self.app_flag = app;
        self
    }

    /// Application mode: `--app`, or implied by a name that looks like a domain.
    pub fn is_app(&self) -> bool {
        self.app_flag || is_domain_name(&self.name)
    }

    /// `<parent>/<name>`, with a scope flattened so `@acme/widgets` lands
    /// in a single `acme-widgets` directory.
    pub fn project_dir(&self) -> PathBuf {
        self.parent_dir.join(repository_name(&self.name))
    }
}

/// A user name / password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Login {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Secrets read once from the environment at startup.
///
/// Absence of an optional credential makes the dependent task skip itself.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub npm_token: Option<String>,
    pub github_token: Option<String>,
    pub aws_profile: Option<String>,
    pub tf_org_token: Option<String>,
    pub tf_user_token: Option<String>,
    /// JSON contact payload required for domain purchase.
    pub contact_details: Option<String>,
    pub db_master: Option<Login>,
    pub db_local: Option<Login>,
}

impl Credentials {
    /// Environment variable names, in the order they are documented.
    pub const VARIABLES: [&'static str; 10] = [
        "NPM_TOKEN",
        "GITHUB_TOKEN",
        "AWS_PROFILE",
        "TF_ORG_TOKEN",
        "TF_USER_TOKEN",
        "CONTACT_DETAILS",
        "DB_MASTER_USER",
        "DB_MASTER_PASSWORD",
        "DB_LOCAL_USER",
        "DB_LOCAL_PASSWORD",
    ];

    /// Build from any key lookup (the process environment in production).
    ///
    /// Empty values count as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let login = |user: &str, password: &str| match (get(user), get(password)) {
            (Some(user), Some(password)) => Some(Login { user, password }),
            _ => None,
        };

        Self {
            npm_token: get("NPM_TOKEN"),
            github_token: get("GITHUB_TOKEN"),
            aws_profile: get("AWS_PROFILE"),
            tf_org_token: get("TF_ORG_TOKEN"),
            tf_user_token: get("TF_USER_TOKEN"),
            contact_details: get("CONTACT_DETAILS"),
            db_master: login("DB_MASTER_USER", "DB_MASTER_PASSWORD"),
            db_local: login("DB_LOCAL_USER", "DB_LOCAL_PASSWORD"),
        }
    }

    pub fn has_infra_tokens(&self) -> bool {
        self.tf_org_token.is_some() && self.tf_user_token.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("npm_token", &set(&self.npm_token))
            .field("github_token", &set(&self.github_token))
            .field("aws_profile", &self.aws_profile)
            .field("tf_org_token", &set(&self.tf_org_token))
            .field("tf_user_token", &set(&self.tf_user_token))
            .field("contact_details", &set(&self.contact_details))
            .field("db_master", &self.db_master)
            .field("db_local", &self.db_local)
            .finish()
    }
}

/// Values rendered into generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    pub author: String,
    pub license: String,
    pub node_version: String,
    pub initial_version: String,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            author: String::new(),
            license: "MIT".into(),
            node_version: "20".into(),
            initial_version: "0.1.0".into(),
        }
    }
}

/// A cloud access key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    pub id: String,
    pub secret: String,
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A provisioned database and the user that owns it.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseGrant {
    pub name: String,
    pub owner: Login,
    pub url: String,
}

impl fmt::Debug for DatabaseGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseGrant")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Data produced by tasks for later tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
    pub domain_owned: Option<bool>,
    pub access_key: Option<AccessKey>,
    pub database: Option<DatabaseGrant>,
    pub remote_url: Option<String>,
    pub workspace_id: Option<String>,
}

/// Mutable state threaded through every task of a run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub project: ProjectSpec,
    pub settings: ProjectSettings,
    pub credentials: Credentials,
    pub outputs: Outputs,
}

impl RunContext {
    pub fn new(project: ProjectSpec, settings: ProjectSettings, credentials: Credentials) -> Self {
        Self {
            project,
            settings,
            credentials,
            outputs: Outputs::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.project.name
    }

    pub fn is_app(&self) -> bool {
        self.project.is_app()
    }

    pub fn project_dir(&self) -> PathBuf {
        self.project.project_dir()
    }

    pub fn parent_dir(&self) -> &Path {
        &self.project.parent_dir
    }

    pub fn database_name(&self) -> String {
        database_name(&self.project.name)
    }

    pub fn repository_name(&self) -> String {
        repository_name(&self.project.name)
    }

    /// Local connection string built from `DB_LOCAL_*`, if set.
    pub fn local_database_url(&self) -> Option<String> {
        self.credentials.db_local.as_ref().map(|login| {
            format!(
                "postgresql://{}:{}@localhost:5432/{}",
                login.user,
                login.password,
                self.database_name()
            )
        })
    }

    pub fn require_access_key(&self) -> Result<&AccessKey, TaskError> {
        self.outputs
            .access_key
            .as_ref()
            .ok_or(TaskError::MissingContext { field: "access key" })
    }

    pub fn require_database(&self) -> Result<&DatabaseGrant, TaskError> {
        self.outputs
            .database
            .as_ref()
            .ok_or(TaskError::MissingContext { field: "database" })
    }

    pub fn require_remote_url(&self) -> Result<&str, TaskError> {
        self.outputs
            .remote_url
            .as_deref()
            .ok_or(TaskError::MissingContext { field: "remote URL" })
    }

    pub fn require_workspace_id(&self) -> Result<&str, TaskError> {
        self.outputs
            .workspace_id
            .as_deref()
            .ok_or(TaskError::MissingContext { field: "workspace id" })
    }

    /// Variables available to file templates.
    pub fn render_context(&self) -> RenderContext {
        let mut ctx = RenderContext::new(&self.project.name)
            .with_variable("AUTHOR", &self.settings.author)
            .with_variable("LICENSE", &self.settings.license)
            .with_variable("NODE_VERSION", &self.settings.node_version)
            .with_variable("VERSION", &self.settings.initial_version)
            .with_variable("DATABASE_NAME", self.database_name());

        if self.is_app() {
            ctx = ctx.with_variable("DOMAIN", &self.project.name);
        }
        if let Some(url) = self.local_database_url() {
            ctx = ctx.with_variable("LOCAL_DATABASE_URL", url);
        }
        if let Some(db) = &self.outputs.database {
            ctx = ctx.with_variable("DATABASE_URL", &db.url);
        }
        ctx
    }
}
