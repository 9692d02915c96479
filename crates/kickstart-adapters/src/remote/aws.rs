//! AWS adapter driving the `aws` CLI (Route 53 Domains and IAM).
//!
//! Every call runs `aws ... --output json` through the [`Shell`] port and
//! parses stdout with `serde_json`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use kickstart_core::{
    application::ports::{CloudIdentity, CommandSpec, DomainRegistrar, Shell},
    domain::{AccessKey, ContactDetails, TaskError},
};

const SERVICE: &str = "AWS";
/// Route 53 Domains is only served from this region.
const DOMAINS_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub profile: Option<String>,
    pub region: Option<String>,
}

/// [`DomainRegistrar`] and [`CloudIdentity`] over the AWS CLI.
pub struct AwsCli {
    shell: Arc<dyn Shell>,
    settings: AwsSettings,
}

impl AwsCli {
    pub fn new(shell: Arc<dyn Shell>, settings: AwsSettings) -> Self {
        Self { shell, settings }
    }

    fn command<'a>(&self, service: &str, args: impl IntoIterator<Item = &'a str>) -> CommandSpec {
        let mut argv = vec![service.to_string()];
        argv.extend(args.into_iter().map(str::to_string));
        argv.extend(["--output".to_string(), "json".to_string()]);

        let mut command = CommandSpec::new("aws", argv);
        if let Some(profile) = &self.settings.profile {
            command = command.with_env("AWS_PROFILE", profile);
        }
        if let Some(region) = &self.settings.region {
            command = command.with_env("AWS_REGION", region);
        }
        command
    }

    async fn run_json<T: DeserializeOwned + Send>(&self, command: CommandSpec) -> Result<T, TaskError> {
        let output = self.shell.run(&command).await?;
        serde_json::from_str(&output.stdout).map_err(|e| {
            TaskError::remote(SERVICE, format!("unexpected output from `{command}`: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DomainList {
    #[serde(default)]
    domains: Vec<DomainSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DomainSummary {
    domain_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OperationId {
    operation_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OperationDetail {
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreatedAccessKey {
    access_key: AccessKeyBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccessKeyBody {
    access_key_id: String,
    secret_access_key: String,
}

/// Route 53 contact shape.
fn contact_json(contact: &ContactDetails) -> Value {
    let mut value = json!({
        "FirstName": contact.first_name,
        "LastName": contact.last_name,
        "ContactType": if contact.organization_name.is_some() { "COMPANY" } else { "PERSON" },
        "AddressLine1": contact.address_line_1,
        "City": contact.city,
        "CountryCode": contact.country_code,
        "ZipCode": contact.zip_code,
        "PhoneNumber": contact.phone_number,
        "Email": contact.email,
    });
    if let Some(state) = &contact.state {
        value["State"] = json!(state);
    }
    if let Some(org) = &contact.organization_name {
        value["OrganizationName"] = json!(org);
    }
    value
}

#[async_trait]
impl DomainRegistrar for AwsCli {
    #[instrument(skip(self))]
    async fn is_owned(&self, domain: &str) -> Result<bool, TaskError> {
        let command = self.command("route53domains", ["list-domains", "--region", DOMAINS_REGION]);
        let list: DomainList = self.run_json(command).await?;
        debug!(count = list.domains.len(), "Domains in account");
        Ok(list
            .domains
            .iter()
            .any(|d| d.domain_name.eq_ignore_ascii_case(domain)))
    }

    #[instrument(skip(self, contact))]
    async fn register(&self, domain: &str, contact: &ContactDetails) -> Result<String, TaskError> {
        let contact = contact_json(contact).to_string();
        let command = self.command(
            "route53domains",
            [
                "register-domain",
                "--region",
                DOMAINS_REGION,
                "--domain-name",
                domain,
                "--duration-in-years",
                "1",
                "--auto-renew",
                "--admin-contact",
                contact.as_str(),
                "--registrant-contact",
                contact.as_str(),
                "--tech-contact",
                contact.as_str(),
            ],
        );
        let created: OperationId = self.run_json(command).await?;
        Ok(created.operation_id)
    }

    async fn operation_status(&self, operation_id: &str) -> Result<String, TaskError> {
        let command = self.command(
            "route53domains",
            [
                "get-operation-detail",
                "--region",
                DOMAINS_REGION,
                "--operation-id",
                operation_id,
            ],
        );
        let detail: OperationDetail = self.run_json(command).await?;
        Ok(detail.status)
    }
}

#[async_trait]
impl CloudIdentity for AwsCli {
    #[instrument(skip(self))]
    async fn create_user(&self, user: &str) -> Result<(), TaskError> {
        let command = self.command("iam", ["create-user", "--user-name", user]);
        self.shell.run(&command).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_access_key(&self, user: &str) -> Result<AccessKey, TaskError> {
        let command = self.command("iam", ["create-access-key", "--user-name", user]);
        let created: CreatedAccessKey = self.run_json(command).await?;
        Ok(AccessKey {
            id: created.access_key.access_key_id,
            secret: created.access_key.secret_access_key,
        })
    }
}
