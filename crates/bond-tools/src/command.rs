//! Subprocess runner shared by the command-backed tools.

use std::process::Stdio;
use std::time::Duration;

use bond_core::ToolError;
use tokio::process::Command;
use tracing::debug;

/// Default ceiling for commands that do not name their own
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout followed by stderr
    pub text: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run `program` with `args`, merging stderr into the returned text.
///
/// A non-zero exit is not an error: the merged output usually explains
/// the failure and goes back to the model as is. Spawn failures and
/// timeouts are tool faults.
pub async fn run(program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput, ToolError> {
    debug!(program, ?args, timeout_secs = timeout.as_secs(), "running command");

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| ToolError::Timeout(timeout.as_secs()))?
        .map_err(|e| ToolError::failed(format!("failed to run '{program}': {e}")))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    let exit_code = output.status.code();
    debug!(program, ?exit_code, bytes = text.len(), "command finished");

    Ok(CommandOutput { text, exit_code })
}

/// Merged output text of a command run
pub async fn output_text(program: &str, args: &[String], timeout: Duration) -> Result<String, ToolError> {
    run(program, args, timeout).await.map(|out| out.text)
}

/// Split a free-form option string on whitespace
pub fn split_options(options: Option<&str>) -> Vec<String> {
    options
        .map(|o| o.split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}
