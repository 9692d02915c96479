//! Full and single-task runs.

use std::sync::Arc;

use tracing::{info, instrument};

use kickstart_core::prelude::{
    Credentials, Pipeline, ProjectSpec, RunContext, TaskRunner, TaskStatus,
};

use crate::{
    cli::{Cli, Mode},
    commands::list,
    config::{self, AppConfig},
    error::{CliError, CliResult},
    output::OutputManager,
    wiring,
};

#[instrument(skip_all, fields(mode = ?cli.mode()))]
pub async fn execute(cli: Cli, config: AppConfig, output: Arc<OutputManager>) -> CliResult<()> {
    let credentials = config::read_credentials();
    let services = wiring::services(&config, &credentials)?;
    let plan = Pipeline::new(services).plan()?;
    let runner = TaskRunner::new(plan, output.clone());

    match cli.mode() {
        Mode::ListTasks => list::titles(&runner),
        Mode::DryRun => {
            let ctx = context(&cli, &config, credentials)?;
            list::preview(&runner, &ctx, &output)
        }
        Mode::Single(title) => {
            let mut ctx = context(&cli, &config, credentials)?;
            let report = runner.run_one(&title, &mut ctx).await?.into_result()?;
            single_summary(&title, report.status_of(&title), &output)
        }
        Mode::Full => {
            let mut ctx = context(&cli, &config, credentials)?;
            full_run(&runner, &mut ctx, &output).await
        }
    }
}

fn context(cli: &Cli, config: &AppConfig, credentials: Credentials) -> CliResult<RunContext> {
    let name = cli.name.clone().ok_or_else(|| CliError::InvalidInput {
        message: "a package or domain name is required".into(),
        source: None,
    })?;
    let project = ProjectSpec::new(name, config::parent_dir()?)
        .with_react(cli.react)
        .with_app(cli.app);
    Ok(RunContext::new(project, config.project_settings(), credentials))
}

/// The closing line of a `--task` run. A skipped task did nothing and says so.
fn single_summary(
    title: &str,
    status: Option<&TaskStatus>,
    output: &OutputManager,
) -> CliResult<()> {
    match status {
        Some(TaskStatus::Skipped) => {
            output.warning(&format!("{title} skipped: its preconditions are not met"))?
        }
        Some(TaskStatus::FailedAdvisory(error)) => {
            output.warning(&format!("{title} failed (advisory): {error}"))?
        }
        _ => output.success(&format!("{title} done"))?,
    }
    Ok(())
}

async fn full_run(
    runner: &TaskRunner,
    ctx: &mut RunContext,
    output: &OutputManager,
) -> CliResult<()> {
    output.header(&format!(
        "Bootstrapping {} ({})",
        ctx.name(),
        if ctx.is_app() { "application" } else { "package" }
    ))?;

    let report = runner.run_all(ctx).await.into_result()?;

    let advisory = report.advisory_failures().count();
    if advisory > 0 {
        output.warning(&format!(
            "{advisory} advisory task(s) failed; re-run them with --task \"<title>\""
        ))?;
    }
    info!(project = %ctx.project_dir().display(), visited = report.visited(), "Run complete");
    output.success(&format!("Project ready at {}", ctx.project_dir().display()))?;
    Ok(())
}
