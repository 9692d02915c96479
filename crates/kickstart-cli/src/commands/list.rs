//! `--list-tasks` and `--dry-run`.

use kickstart_core::prelude::{RunContext, Severity, TaskRunner};

use crate::{error::CliResult, output::OutputManager};

/// Print task titles in plan order, one per line.
///
/// Written with `println!` so the list stays parseable in quiet mode.
pub fn titles(runner: &TaskRunner) -> CliResult<()> {
    for title in runner.titles() {
        println!("{title}");
    }
    Ok(())
}

/// Print the plan with the skip decision each task would get right now.
pub fn preview(runner: &TaskRunner, ctx: &RunContext, output: &OutputManager) -> CliResult<()> {
    output.header(&format!("Plan for {}", ctx.name()))?;

    let planned = runner.preview(ctx);
    let width = planned.iter().map(|t| t.title.len()).max().unwrap_or(0);
    for (index, task) in planned.iter().enumerate() {
        let mut line = format!("{:>2}. {:<width$}", index + 1, task.title);
        if task.severity == Severity::Advisory {
            line.push_str("  [advisory]");
        }
        if task.skipped {
            output.muted(&format!("{line}  skip"))?;
        } else {
            output.print(&format!("  {line}  run"))?;
        }
    }

    let runs = planned.iter().filter(|t| !t.skipped).count();
    output.print("")?;
    output.print(&format!(
        "{runs} of {} tasks would run. Skip decisions that depend on earlier \
         results (domain ownership) may change during a real run.",
        planned.len()
    ))?;
    Ok(())
}
