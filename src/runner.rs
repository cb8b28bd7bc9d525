//! Shell command execution.
//!
//! Every external command goes through [`CommandRunner`] so the manager can
//! be exercised without touching the host.

use std::collections::BTreeMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// A single shell command line and how to run it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellCommand {
    pub line: String,
    /// Extra variables for the child process only.
    pub env: BTreeMap<String, String>,
    /// Capture stdout/stderr instead of inheriting the terminal.
    pub capture: bool,
}

impl ShellCommand {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            ..Default::default()
        }
    }

    pub fn envs(mut self, env: BTreeMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ShellCommand) -> std::io::Result<CommandOutput>;
}

/// Runs commands through the platform shell (`sh -c` / `cmd /C`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &ShellCommand) -> std::io::Result<CommandOutput> {
        let mut cmd = shell(&command.line);
        cmd.envs(&command.env);

        if command.capture {
            let output = cmd.stdin(Stdio::null()).output().await?;
            Ok(CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        } else {
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await?;
            Ok(CommandOutput {
                code: status.code(),
                ..Default::default()
            })
        }
    }
}

#[cfg(windows)]
fn shell(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

#[cfg(not(windows))]
fn shell(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

/// Run `command` and treat anything but exit code 0 as failure.
///
/// Failures are logged with the command line and, when captured, stderr.
pub async fn run_checked(
    runner: &dyn CommandRunner,
    command: &ShellCommand,
) -> Result<CommandOutput, String> {
    tracing::debug!("Running: {}", command.line);

    match runner.run(command).await {
        Ok(output) if output.success() => Ok(output),
        Ok(output) => {
            tracing::error!("Command failed: {}", command.line);
            let reason = match output.code {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            };
            tracing::error!("Error: {}", reason);
            let stderr = output.stderr.trim();
            if !stderr.is_empty() {
                tracing::error!("Stderr: {}", stderr);
            }
            Err(reason)
        }
        Err(e) => {
            tracing::error!("Unexpected error executing command: {}", e);
            Err(e.to_string())
        }
    }
}
