//! Shell Tools
//!
//! bash, gh and tree. `bash` runs arbitrary commands and is registered like
//! every other tool; callers who do not want it should build their own list.

use std::time::Duration;

use async_trait::async_trait;
use bond_core::{ParameterSchema, Tool, ToolArguments, ToolDefinition, ToolError, ToolOutput};

use super::{opt_str_arg, opt_u64_arg, str_arg};
use crate::command;

/// Run a command through `bash -c`
pub struct BashTool;

impl BashTool {
    const TIMEOUT: Duration = Duration::from_secs(60);
}

#[async_trait]
impl Tool for BashTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("bash", "Execute arbitrary bash command. Use with caution.")
            .param(ParameterSchema::required("command", "string", "Bash command to execute"))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let script = str_arg(args, "command")?;
        tracing::info!(command = script, "executing bash command");
        let argv = vec!["-c".to_string(), script.to_string()];
        Ok(command::output_text("bash", &argv, Self::TIMEOUT).await?.into())
    }
}

/// GitHub CLI passthrough
pub struct GhTool;

impl GhTool {
    const TIMEOUT: Duration = Duration::from_secs(60);
}

#[async_trait]
impl Tool for GhTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "gh",
            "Execute GitHub CLI commands to interact with repositories, issues, PRs, releases, etc. Common commands: 'repo view', 'issue list', 'pr list', 'pr status', 'release list', 'status'",
        )
        .param(ParameterSchema::required(
            "command",
            "string",
            "GitHub CLI command (without 'gh' prefix). Examples: 'repo view', 'issue list', 'pr status'",
        ))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let argv = command::split_options(Some(str_arg(args, "command")?));
        Ok(command::output_text("gh", &argv, Self::TIMEOUT).await?.into())
    }
}

/// Directory tree view
pub struct TreeTool;

impl TreeTool {
    const TIMEOUT: Duration = Duration::from_secs(30);

    fn argv(args: &ToolArguments) -> Result<Vec<String>, ToolError> {
        let mut argv = Vec::new();
        if let Some(level) = opt_u64_arg(args, "level")? {
            argv.push("-L".to_string());
            argv.push(level.to_string());
        }
        argv.extend(command::split_options(opt_str_arg(args, "options")?));
        argv.push(opt_str_arg(args, "path")?.unwrap_or(".").to_string());
        Ok(argv)
    }
}

#[async_trait]
impl Tool for TreeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "tree",
            "Display directory tree structure. Useful for visualizing project layout.",
        )
        .param(ParameterSchema::optional(
            "path",
            "string",
            "Directory path to display (default: current directory)",
        ))
        .param(ParameterSchema::optional(
            "level",
            "integer",
            "Maximum depth to descend (e.g., 2 for 2 levels)",
        ))
        .param(ParameterSchema::optional(
            "options",
            "string",
            "Additional options: -a (all files), -d (dirs only), --gitignore, -I pattern",
        ))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let argv = Self::argv(args)?;
        Ok(command::output_text("tree", &argv, Self::TIMEOUT).await?.into())
    }
}
