//! Domain ownership and purchase.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::{
    application::{
        ports::DomainRegistrar,
        services::{PollPolicy, PollStatus, poll_until_terminal},
    },
    domain::{ContactDetails, RunContext, TaskAction, TaskError},
};

/// Records whether the operator's account already holds the domain.
pub struct CheckDomainOwnership {
    registrar: Arc<dyn DomainRegistrar>,
}

impl CheckDomainOwnership {
    pub fn new(registrar: Arc<dyn DomainRegistrar>) -> Self {
        Self { registrar }
    }
}

#[async_trait]
impl TaskAction for CheckDomainOwnership {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let owned = self.registrar.is_owned(ctx.name()).await?;
        info!(domain = %ctx.name(), owned, "Domain ownership checked");
        ctx.outputs.domain_owned = Some(owned);
        Ok(())
    }
}

/// Registers the domain and waits for the registration to settle.
///
/// The contact payload is validated before any request is sent.
pub struct PurchaseDomain {
    registrar: Arc<dyn DomainRegistrar>,
    poll: PollPolicy,
}

impl PurchaseDomain {
    pub fn new(registrar: Arc<dyn DomainRegistrar>, poll: PollPolicy) -> Self {
        Self { registrar, poll }
    }
}

#[async_trait]
impl TaskAction for PurchaseDomain {
    #[instrument(skip_all, fields(domain = %ctx.name()))]
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let contact = ContactDetails::parse(ctx.credentials.contact_details.as_deref())?;
        let operation_id = self.registrar.register(ctx.name(), &contact).await?;
        info!(%operation_id, "Registration submitted");

        let registrar = Arc::clone(&self.registrar);
        poll_until_terminal(
            "domain registration",
            &self.poll,
            move || {
                let registrar = Arc::clone(&registrar);
                let operation_id = operation_id.clone();
                async move { registrar.operation_status(&operation_id).await }
            },
            registration_status,
        )
        .await?;

        ctx.outputs.domain_owned = Some(true);
        Ok(())
    }
}

/// Registrar operation states: `SUBMITTED`, `IN_PROGRESS`, then one of the
/// terminal ones.
pub fn registration_status(status: &String) -> PollStatus {
    match status.as_str() {
        "SUCCESSFUL" => PollStatus::Succeeded,
        "ERROR" | "FAILED" => PollStatus::Failed,
        _ => PollStatus::Pending,
    }
}
