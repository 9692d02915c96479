//! Shared fixtures: mocked remote ports and an in-memory pipeline harness.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kickstart_adapters::{BuiltinTemplates, MemoryFilesystem, ScriptedShell};
use kickstart_core::application::ports::{DatabaseRequest, WorkspaceRequest, WorkspaceVariable};
use kickstart_core::application::{PipelineSettings, PollPolicy};
use kickstart_core::domain::{AccessKey, ContactDetails, ProjectSettings};
use kickstart_core::prelude::*;
use mockall::mock;

mock! {
    pub Registrar {}

    #[async_trait]
    impl DomainRegistrar for Registrar {
        async fn is_owned(&self, domain: &str) -> Result<bool, TaskError>;
        async fn register(&self, domain: &str, contact: &ContactDetails) -> Result<String, TaskError>;
        async fn operation_status(&self, operation_id: &str) -> Result<String, TaskError>;
    }
}

mock! {
    pub Identity {}

    #[async_trait]
    impl CloudIdentity for Identity {
        async fn create_user(&self, user: &str) -> Result<(), TaskError>;
        async fn create_access_key(&self, user: &str) -> Result<AccessKey, TaskError>;
    }
}

mock! {
    pub Database {}

    #[async_trait]
    impl DatabaseProvisioner for Database {
        async fn create_database(&self, request: &DatabaseRequest) -> Result<String, TaskError>;
    }
}

mock! {
    pub Host {}

    #[async_trait]
    impl SourceHost for Host {
        async fn repository_exists(&self, name: &str) -> Result<bool, TaskError>;
        async fn create_repository(&self, name: &str, private: bool) -> Result<String, TaskError>;
        async fn repository_url(&self, name: &str) -> Result<String, TaskError>;
        async fn set_secret(&self, repository: &str, name: &str, value: &str) -> Result<(), TaskError>;
        async fn commit_run_status(&self, repository: &str, commit: &str) -> Result<String, TaskError>;
    }
}

mock! {
    pub Infra {}

    #[async_trait]
    impl InfraWorkspaces for Infra {
        async fn create_workspace(&self, request: &WorkspaceRequest) -> Result<String, TaskError>;
        async fn set_variable(&self, workspace_id: &str, variable: &WorkspaceVariable) -> Result<(), TaskError>;
        async fn queue_run(&self, workspace_id: &str, message: &str) -> Result<String, TaskError>;
        async fn run_status(&self, run_id: &str) -> Result<String, TaskError>;
    }
}

/// Records observer notifications as `"<event> <title>"` lines.
#[derive(Default)]
pub struct Events(Mutex<Vec<String>>);

impl Events {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, line: String) {
        self.0.lock().unwrap().push(line);
    }
}

impl RunObserver for Events {
    fn task_started(&self, title: &str) {
        self.push(format!("start {title}"));
    }
    fn task_skipped(&self, title: &str) {
        self.push(format!("skip {title}"));
    }
    fn task_succeeded(&self, title: &str) {
        self.push(format!("ok {title}"));
    }
    fn task_failed(&self, title: &str, error: &TaskError, _severity: Severity) {
        self.push(format!("fail {title}: {error}"));
    }
    fn task_cancelled(&self, title: &str, _cause: &str) {
        self.push(format!("cancel {title}"));
    }
}

pub const PARENT: &str = "/work";

/// Mocks start with no expectations: any unexpected remote call panics
/// inside the task and shows up as a failed run.
pub struct Harness {
    pub fs: MemoryFilesystem,
    pub shell: ScriptedShell,
    pub registrar: MockRegistrar,
    pub identity: MockIdentity,
    pub database: MockDatabase,
    pub source_host: MockHost,
    pub infra: MockInfra,
}

pub struct Wired {
    pub runner: TaskRunner,
    pub fs: MemoryFilesystem,
    pub shell: ScriptedShell,
    pub events: Arc<Events>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            fs: MemoryFilesystem::new(),
            shell: ScriptedShell::new(),
            registrar: MockRegistrar::new(),
            identity: MockIdentity::new(),
            database: MockDatabase::new(),
            source_host: MockHost::new(),
            infra: MockInfra::new(),
        }
    }

    pub fn wire(self) -> Wired {
        let services = Services {
            filesystem: Arc::new(self.fs.clone()),
            shell: Arc::new(self.shell.clone()),
            templates: Arc::new(BuiltinTemplates::new()),
            registrar: Arc::new(self.registrar),
            identity: Arc::new(self.identity),
            database: Arc::new(self.database),
            source_host: Arc::new(self.source_host),
            infra: Arc::new(self.infra),
            settings: PipelineSettings {
                poll: PollPolicy::new(Duration::from_secs(30), Some(Duration::from_secs(600))),
                private_repository: true,
                cloud_credentials_file: PathBuf::from("/home/op/.aws/credentials"),
            },
        };
        let events = Arc::new(Events::default());
        let plan = Pipeline::new(services).plan().expect("standard pipeline plans");

        Wired {
            runner: TaskRunner::new(plan, events.clone()),
            fs: self.fs,
            shell: self.shell,
            events,
        }
    }
}

pub fn context(name: &str, credentials: Credentials) -> RunContext {
    let settings = ProjectSettings {
        author: "Ada Lovelace".into(),
        ..ProjectSettings::default()
    };
    RunContext::new(ProjectSpec::new(name, PARENT), settings, credentials)
}

pub const CONTACT: &str = r#"{
    "first_name": "Ada",
    "last_name": "Lovelace",
    "email": "ada@example.com",
    "phone_number": "+44.2071234567",
    "address_line_1": "12 St James's Square",
    "city": "London",
    "country_code": "GB",
    "zip_code": "SW1Y 4JH"
}"#;

/// A fresh HTTP stub server for the API clients.
pub async fn mock_server() -> wiremock::MockServer {
    wiremock::MockServer::start().await
}
