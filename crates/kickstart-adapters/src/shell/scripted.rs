//! Scripted shell for tests: records commands, replays canned results.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use kickstart_core::{
    application::ports::{CommandOutput, CommandSpec, Shell},
    domain::TaskError,
};

#[derive(Debug, Clone)]
enum Reply {
    Output(String),
    Failure(String),
}

#[derive(Debug, Default)]
struct Script {
    /// First matching prefix wins.
    replies: Vec<(String, Reply)>,
    log: Vec<CommandSpec>,
}

/// A [`Shell`] that never spawns anything.
///
/// Every command is recorded. Commands whose rendered line starts with a
/// scripted prefix get that reply; all others succeed with empty output.
#[derive(Debug, Clone, Default)]
pub struct ScriptedShell {
    script: Arc<Mutex<Script>>,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `stdout` to commands starting with `prefix`.
    pub fn respond(self, prefix: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.push(prefix.into(), Reply::Output(stdout.into()));
        self
    }

    /// Fail commands starting with `prefix`, with `stderr` as the message.
    pub fn fail(self, prefix: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.push(prefix.into(), Reply::Failure(stderr.into()));
        self
    }

    /// Every command run so far.
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.script
            .lock()
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    /// Every command run so far, rendered as a single line.
    pub fn command_lines(&self) -> Vec<String> {
        self.commands().iter().map(ToString::to_string).collect()
    }

    fn push(&self, prefix: String, reply: Reply) {
        if let Ok(mut script) = self.script.lock() {
            script.replies.push((prefix, reply));
        }
    }
}

#[async_trait]
impl Shell for ScriptedShell {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, TaskError> {
        let line = command.to_string();
        let reply = {
            let mut script = self.script.lock().map_err(|_| TaskError::Command {
                command: line.clone(),
                status: "script lock poisoned".into(),
                stderr: String::new(),
            })?;
            script.log.push(command.clone());
            script
                .replies
                .iter()
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, reply)| reply.clone())
        };

        match reply {
            None => Ok(CommandOutput::default()),
            Some(Reply::Output(stdout)) => Ok(CommandOutput::stdout(stdout)),
            Some(Reply::Failure(stderr)) => Err(TaskError::Command {
                command: line,
                status: "exit status: 1".into(),
                stderr,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_and_replays() {
        let shell = ScriptedShell::new()
            .respond("git rev-parse", "abc123")
            .fail("npm install", "ENOTFOUND");

        let out = shell
            .run(&CommandSpec::new("git", ["rev-parse", "HEAD"]))
            .await
            .unwrap();
        let err = shell
            .run(&CommandSpec::new("npm", ["install"]))
            .await
            .unwrap_err();
        shell.run(&CommandSpec::new("git", ["init"])).await.unwrap();

        assert_eq!(out.stdout, "abc123");
        assert!(err.to_string().contains("ENOTFOUND"));
        assert_eq!(
            shell.command_lines(),
            vec!["git rev-parse HEAD", "npm install", "git init"]
        );
    }
}
