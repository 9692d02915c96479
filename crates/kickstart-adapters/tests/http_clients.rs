//! GitHub and Terraform Cloud clients against a stub HTTP server.

mod common;

use std::sync::Arc;

use common::mock_server;
use kickstart_adapters::{
    GitHubClient, GitHubSettings, HttpSettings, ScriptedShell, TerraformCloudClient,
    TerraformSettings,
};
use kickstart_core::application::ports::{WorkspaceRequest, WorkspaceVariable};
use kickstart_core::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn github(server: &MockServer, organization: Option<&str>, shell: &ScriptedShell) -> GitHubClient {
    GitHubClient::new(
        "gh-token",
        GitHubSettings {
            api_url: Some(server.uri()),
            organization: organization.map(str::to_string),
        },
        &HttpSettings::default(),
        Arc::new(shell.clone()),
    )
    .expect("client builds")
}

fn terraform(server: &MockServer) -> TerraformCloudClient {
    TerraformCloudClient::new(
        "org-token",
        "user-token",
        TerraformSettings {
            api_url: Some(server.uri()),
            organization: "acme".into(),
            oauth_token_id: "ot-abc".into(),
        },
        &HttpSettings::default(),
    )
    .expect("client builds")
}

#[tokio::test]
async fn missing_repository_is_not_an_error() {
    let server = mock_server().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/my-lib"))
        .and(header("authorization", "Bearer gh-token"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = github(&server, Some("acme"), &ScriptedShell::new());

    assert!(!client.repository_exists("my-lib").await.unwrap());
}

#[tokio::test]
async fn owner_defaults_to_the_authenticated_user() {
    let server = mock_server().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "ada"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/ada/my-lib"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "my-lib",
            "ssh_url": "git@github.com:ada/my-lib.git",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = github(&server, None, &ScriptedShell::new());

    assert_eq!(
        client.repository_url("my-lib").await.unwrap(),
        "git@github.com:ada/my-lib.git"
    );
}

#[tokio::test]
async fn organization_repositories_are_created_private() {
    let server = mock_server().await;
    Mock::given(method("POST"))
        .and(path("/orgs/acme/repos"))
        .and(body_partial_json(json!({"name": "my-lib", "private": true})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ssh_url": "git@github.com:acme/my-lib.git",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = github(&server, Some("acme"), &ScriptedShell::new());

    assert_eq!(
        client.create_repository("my-lib", true).await.unwrap(),
        "git@github.com:acme/my-lib.git"
    );
}

#[tokio::test]
async fn rejected_requests_carry_status_and_body() {
    let server = mock_server().await;
    Mock::given(method("POST"))
        .and(path("/orgs/acme/repos"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "name already exists"})),
        )
        .mount(&server)
        .await;

    let client = github(&server, Some("acme"), &ScriptedShell::new());
    let err = client.create_repository("my-lib", true).await.unwrap_err();

    assert!(matches!(err, TaskError::Http { .. }));
    let message = err.to_string();
    assert!(message.contains("422"), "{message}");
    assert!(message.contains("name already exists"), "{message}");
}

#[tokio::test]
async fn workflow_runs_are_looked_up_by_commit() {
    let server = mock_server().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/my-lib/actions/runs"))
        .and(query_param("head_sha", "abc123"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "workflow_runs": [{"status": "completed", "conclusion": "success"}],
        })))
        .mount(&server)
        .await;

    let client = github(&server, Some("acme"), &ScriptedShell::new());

    assert_eq!(
        client.commit_run_status("my-lib", "abc123").await.unwrap(),
        "success"
    );
}

#[tokio::test]
async fn secrets_are_set_through_the_gh_cli() {
    let server = mock_server().await;
    let shell = ScriptedShell::new();
    let client = github(&server, Some("acme"), &shell);

    client
        .set_secret("my-lib", "NPM_TOKEN", "npm-secret")
        .await
        .unwrap();

    let line = &shell.command_lines()[0];
    assert!(line.contains("acme/my-lib"));
    assert!(!line.contains("npm-secret"));
    let env = &shell.commands()[0].env;
    assert!(env.contains(&("KICKSTART_SECRET".to_string(), "npm-secret".to_string())));
}

fn workspace_request() -> WorkspaceRequest {
    WorkspaceRequest {
        name: "shop.example.com".into(),
        repository: "acme/shop.example.com".into(),
    }
}

#[tokio::test]
async fn workspace_is_created_under_the_organization() {
    let server = mock_server().await;
    Mock::given(method("POST"))
        .and(path("/organizations/acme/workspaces"))
        .and(header("authorization", "Bearer org-token"))
        .and(header("content-type", "application/vnd.api+json"))
        .and(body_partial_json(json!({
            "data": {"attributes": {"name": "shop-example-com", "working-directory": "infra"}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "ws-42", "type": "workspaces"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = terraform(&server)
        .create_workspace(&workspace_request())
        .await
        .unwrap();

    assert_eq!(id, "ws-42");
}

#[tokio::test]
async fn workspace_is_linked_to_its_repository() {
    let server = mock_server().await;
    Mock::given(method("POST"))
        .and(path("/organizations/acme/workspaces"))
        .and(body_partial_json(json!({
            "data": {"attributes": {"vcs-repo": {
                "identifier": "acme/shop.example.com",
                "oauth-token-id": "ot-abc",
            }}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "ws-42", "type": "workspaces"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    terraform(&server)
        .create_workspace(&workspace_request())
        .await
        .unwrap();
}

#[tokio::test]
async fn variables_use_the_user_token() {
    let server = mock_server().await;
    Mock::given(method("POST"))
        .and(path("/workspaces/ws-42/vars"))
        .and(header("authorization", "Bearer user-token"))
        .and(body_partial_json(json!({
            "data": {"attributes": {"key": "AWS_ACCESS_KEY_ID", "category": "env"}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "var-1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let variable = WorkspaceVariable {
        key: "AWS_ACCESS_KEY_ID".into(),
        value: "AKIA1".into(),
        sensitive: false,
        env: true,
    };

    terraform(&server)
        .set_variable("ws-42", &variable)
        .await
        .unwrap();
}

#[tokio::test]
async fn run_is_queued_against_the_workspace() {
    let server = mock_server().await;
    Mock::given(method("POST"))
        .and(path("/runs"))
        .and(header("authorization", "Bearer user-token"))
        .and(header("content-type", "application/vnd.api+json"))
        .and(body_partial_json(json!({
            "data": {
                "type": "runs",
                "attributes": {"message": "Initial apply"},
                "relationships": {"workspace": {"data": {"type": "workspaces", "id": "ws-42"}}}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "run-7", "type": "runs", "attributes": {"status": "pending"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let run_id = terraform(&server)
        .queue_run("ws-42", "Initial apply")
        .await
        .unwrap();

    assert_eq!(run_id, "run-7");
}

#[tokio::test]
async fn queued_run_reports_its_status() {
    let server = mock_server().await;
    Mock::given(method("GET"))
        .and(path("/runs/run-7"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "run-7", "attributes": {"status": "applied"}}
        })))
        .mount(&server)
        .await;

    let status = terraform(&server).run_status("run-7").await.unwrap();

    assert_eq!(status, "applied");
}
