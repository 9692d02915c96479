//! Subprocess shell backed by `tokio::process`.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use kickstart_core::{
    application::ports::{CommandOutput, CommandSpec, Shell},
    domain::TaskError,
};

/// Runs commands as real child processes.
///
/// Stdin is closed; stdout and stderr are captured. A non-zero exit status
/// becomes [`TaskError::Command`] carrying the captured stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessShell;

impl ProcessShell {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Shell for ProcessShell {
    #[instrument(skip_all, fields(command = %command))]
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, TaskError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| TaskError::Command {
            command: command.to_string(),
            status: "failed to start".into(),
            stderr: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(TaskError::Command {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        debug!(bytes = stdout.len(), "Command finished");
        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_in_the_working_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();

        let out = ProcessShell::new()
            .run(&CommandSpec::new("ls", Vec::<String>::new()).in_dir(dir.path()))
            .await
            .unwrap();

        assert!(out.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error_with_stderr() {
        let err = ProcessShell::new()
            .run(&CommandSpec::new("sh", ["-c", "echo nope >&2; exit 3"]))
            .await
            .unwrap_err();

        match err {
            TaskError::Command { stderr, status, .. } => {
                assert_eq!(stderr, "nope");
                assert!(status.contains('3'));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_fails_to_start() {
        let err = ProcessShell::new()
            .run(&CommandSpec::new("definitely-not-a-real-binary-kickstart", ["x"]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TaskError::Command { ref status, .. } if status == "failed to start"
        ));
    }

    #[tokio::test]
    async fn environment_is_passed_through() {
        let command = CommandSpec::new("sh", ["-c", "printf %s \"$KICKSTART_MARKER\""])
            .with_env("KICKSTART_MARKER", "on");

        let out = ProcessShell::new().run(&command).await.unwrap();

        assert_eq!(out.stdout, "on");
    }
}
