//! run_command tool - Execute shell commands in the context root
//!
//! Unsandboxed: the caller is trusted to supply safe command strings.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use super::{ParameterSpec, Tool, ToolArgs, ToolContext, ToolOutput};
use crate::error::{Result, ToolbeltError};

/// Captured result of one shell command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// None when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Run `command` through the host shell in `cwd`
///
/// A nonzero exit status is reported through `exit_code`, never as an error.
pub async fn run_command(command: &str, cwd: &Path) -> Result<CommandOutput> {
    log::debug!("run_command: {} (cwd={})", command, cwd.display());

    let output = shell(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ToolbeltError::io(format!("spawn `{}`", command), cwd, e))?;

    let result = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    };

    if !result.success() {
        log::info!("Command exited with {:?}: {}", result.exit_code, command);
    }
    Ok(result)
}

pub struct RunCommandTool;

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &'static str {
        "run_command"
    }

    fn description(&self) -> &'static str {
        "Run a shell command and return its standard output, standard error and exit code."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required("command", "The shell command to execute.")]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let command = args.str("command")?;
        Ok(ToolOutput::Command(run_command(command, &ctx.root).await?))
    }
}
