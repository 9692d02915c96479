//! Terraform Cloud adapter (JSON:API over HTTPS).
//!
//! The organization token creates workspaces; the user token manages
//! variables and runs. Workspaces are linked to their repository through the
//! organization's VCS connection, so every run plans the pushed `infra/`
//! directory.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header::CONTENT_TYPE};
use serde_json::{Value, json};
use tracing::instrument;

use kickstart_core::{
    application::ports::{InfraWorkspaces, WorkspaceRequest, WorkspaceVariable},
    domain::TaskError,
};

use super::http::{HttpSettings, bearer_client, send_json, string_at};

const SERVICE: &str = "Terraform Cloud";
const JSON_API: &str = "application/vnd.api+json";
pub const DEFAULT_API_URL: &str = "https://app.terraform.io/api/v2";

#[derive(Debug, Clone)]
pub struct TerraformSettings {
    pub api_url: Option<String>,
    pub organization: String,
    /// `ot-...` id of the organization's connection to the source host.
    pub oauth_token_id: String,
}

/// [`InfraWorkspaces`] backed by Terraform Cloud.
pub struct TerraformCloudClient {
    org_client: Client,
    user_client: Client,
    api_url: String,
    organization: String,
    oauth_token_id: String,
}

impl TerraformCloudClient {
    pub fn new(
        org_token: &str,
        user_token: &str,
        settings: TerraformSettings,
        http: &HttpSettings,
    ) -> Result<Self, TaskError> {
        Ok(Self {
            org_client: bearer_client(SERVICE, org_token, JSON_API, http)?,
            user_client: bearer_client(SERVICE, user_token, JSON_API, http)?,
            api_url: settings
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            organization: settings.organization,
            oauth_token_id: settings.oauth_token_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }
}

fn with_document(request: RequestBuilder, document: &Value) -> RequestBuilder {
    request
        .header(CONTENT_TYPE, JSON_API)
        .body(document.to_string())
}

/// Workspace names allow letters, digits, `-` and `_` only.
pub fn workspace_name(name: &str) -> String {
    name.trim_start_matches('@')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect()
}

#[async_trait]
impl InfraWorkspaces for TerraformCloudClient {
    #[instrument(skip(self), fields(name = %request.name))]
    async fn create_workspace(&self, request: &WorkspaceRequest) -> Result<String, TaskError> {
        let document = json!({
            "data": {
                "type": "workspaces",
                "attributes": {
                    "name": workspace_name(&request.name),
                    "auto-apply": true,
                    "working-directory": "infra",
                    "vcs-repo": {
                        "identifier": request.repository,
                        "oauth-token-id": self.oauth_token_id,
                    },
                }
            }
        });
        let path = format!("/organizations/{}/workspaces", self.organization);
        let created =
            send_json(SERVICE, with_document(self.org_client.post(self.url(&path)), &document))
                .await?;
        string_at(SERVICE, &created, "/data/id")
    }

    #[instrument(skip(self, variable), fields(key = %variable.key))]
    async fn set_variable(
        &self,
        workspace_id: &str,
        variable: &WorkspaceVariable,
    ) -> Result<(), TaskError> {
        let document = json!({
            "data": {
                "type": "vars",
                "attributes": {
                    "key": variable.key,
                    "value": variable.value,
                    "category": if variable.env { "env" } else { "terraform" },
                    "sensitive": variable.sensitive,
                    "hcl": false,
                }
            }
        });
        let path = format!("/workspaces/{workspace_id}/vars");
        send_json(SERVICE, with_document(self.user_client.post(self.url(&path)), &document))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn queue_run(&self, workspace_id: &str, message: &str) -> Result<String, TaskError> {
        let document = json!({
            "data": {
                "type": "runs",
                "attributes": { "message": message },
                "relationships": {
                    "workspace": {
                        "data": { "type": "workspaces", "id": workspace_id }
                    }
                }
            }
        });
        let queued =
            send_json(SERVICE, with_document(self.user_client.post(self.url("/runs")), &document))
                .await?;
        string_at(SERVICE, &queued, "/data/id")
    }

    async fn run_status(&self, run_id: &str) -> Result<String, TaskError> {
        let run = send_json(
            SERVICE,
            self.user_client.get(self.url(&format!("/runs/{run_id}"))),
        )
        .await?;
        string_at(SERVICE, &run, "/data/attributes/status")
    }
}
