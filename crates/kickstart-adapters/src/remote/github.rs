//! GitHub adapter: repositories and workflow runs over the REST API,
//! Actions secrets through the `gh` CLI.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use kickstart_core::{
    application::ports::{CommandSpec, Shell, SourceHost},
    domain::TaskError,
};

use super::http::{HttpSettings, bearer_client, expect_success, send, send_json, string_at};

const SERVICE: &str = "GitHub";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Where repositories are created.
#[derive(Debug, Clone, Default)]
pub struct GitHubSettings {
    pub api_url: Option<String>,
    /// Organization to create repositories in; the token's user otherwise.
    pub organization: Option<String>,
}

/// [`SourceHost`] backed by GitHub.
pub struct GitHubClient {
    client: Client,
    api_url: String,
    organization: Option<String>,
    token: String,
    shell: Arc<dyn Shell>,
}

impl GitHubClient {
    pub fn new(
        token: impl Into<String>,
        settings: GitHubSettings,
        http: &HttpSettings,
        shell: Arc<dyn Shell>,
    ) -> Result<Self, TaskError> {
        let token = token.into();
        let client = bearer_client(SERVICE, &token, "application/vnd.github+json", http)?;
        Ok(Self {
            client,
            api_url: settings
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            organization: settings.organization,
            token,
            shell,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    /// Organization if configured, otherwise the authenticated user's login.
    async fn owner(&self) -> Result<String, TaskError> {
        if let Some(org) = &self.organization {
            return Ok(org.clone());
        }
        let user = send_json(SERVICE, self.client.get(self.url("/user"))).await?;
        string_at(SERVICE, &user, "/login")
    }

    async fn repository(&self, name: &str) -> Result<Option<Value>, TaskError> {
        let owner = self.owner().await?;
        let response = send(
            SERVICE,
            self.client.get(self.url(&format!("/repos/{owner}/{name}"))),
        )
        .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        expect_success(SERVICE, response).await.map(Some)
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    #[instrument(skip(self))]
    async fn repository_exists(&self, name: &str) -> Result<bool, TaskError> {
        Ok(self.repository(name).await?.is_some())
    }

    #[instrument(skip(self))]
    async fn create_repository(&self, name: &str, private: bool) -> Result<String, TaskError> {
        let path = match &self.organization {
            Some(org) => format!("/orgs/{org}/repos"),
            None => "/user/repos".to_string(),
        };
        let body = json!({ "name": name, "private": private, "auto_init": false });
        let repo = send_json(SERVICE, self.client.post(self.url(&path)).json(&body)).await?;
        string_at(SERVICE, &repo, "/ssh_url")
    }

    async fn repository_url(&self, name: &str) -> Result<String, TaskError> {
        let repo = self
            .repository(name)
            .await?
            .ok_or_else(|| TaskError::remote(SERVICE, format!("repository '{name}' not found")))?;
        string_at(SERVICE, &repo, "/ssh_url")
    }

    /// Secret values go through the environment and stdin, never argv.
    #[instrument(skip(self, value))]
    async fn set_secret(&self, repository: &str, name: &str, value: &str) -> Result<(), TaskError> {
        let full_name = format!("{}/{repository}", self.owner().await?);
        let command = CommandSpec::new(
            "sh",
            [
                "-c",
                r#"printf %s "$KICKSTART_SECRET" | gh secret set "$0" --repo "$1""#,
                name,
                full_name.as_str(),
            ],
        )
        .with_env("KICKSTART_SECRET", value)
        .with_env("GH_TOKEN", &self.token);
        self.shell.run(&command).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn commit_run_status(&self, repository: &str, commit: &str) -> Result<String, TaskError> {
        let owner = self.owner().await?;
        let runs = send_json(
            SERVICE,
            self.client
                .get(self.url(&format!("/repos/{owner}/{repository}/actions/runs")))
                .query(&[("head_sha", commit), ("per_page", "1")]),
        )
        .await?;

        let status = run_status(&runs);
        debug!(%status, "Workflow run for commit");
        Ok(status)
    }
}

/// `conclusion` once a run completed, its `status` before, `none` without runs.
fn run_status(runs: &Value) -> String {
    let Some(run) = runs.pointer("/workflow_runs/0") else {
        return "none".to_string();
    };
    let field = |key: &str| run.get(key).and_then(Value::as_str).map(str::to_string);
    match field("status").as_deref() {
        Some("completed") => field("conclusion").unwrap_or_else(|| "completed".to_string()),
        Some(status) => status.to_string(),
        None => "none".to_string(),
    }
}
