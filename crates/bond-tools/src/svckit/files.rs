//! File Tools
//!
//! Read-only inspection of the local filesystem: ls, cat, grep, find, head,
//! tail and wc.

use std::time::Duration;

use async_trait::async_trait;
use bond_core::{ParameterSchema, Tool, ToolArguments, ToolDefinition, ToolError, ToolOutput};

use super::{opt_str_arg, opt_u64_arg, str_arg};
use crate::command;

const FILE_TIMEOUT: Duration = Duration::from_secs(10);
const FIND_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_LINES: u64 = 10;

/// List directory contents with details
pub struct LsTool;

#[async_trait]
impl Tool for LsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("ls", "List directory contents with details").param(ParameterSchema::optional(
            "path",
            "string",
            "Directory path to list (default: current directory)",
        ))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let path = opt_str_arg(args, "path")?.unwrap_or(".");
        let argv = vec!["-lah".to_string(), path.to_string()];
        Ok(command::output_text("ls", &argv, FILE_TIMEOUT).await?.into())
    }
}

/// Display the contents of a file
pub struct CatTool;

#[async_trait]
impl Tool for CatTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("cat", "Display the contents of a file")
            .param(ParameterSchema::required("filepath", "string", "Path to the file to display"))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let filepath = str_arg(args, "filepath")?;
        Ok(command::output_text("cat", &[filepath.to_string()], FILE_TIMEOUT).await?.into())
    }
}

/// Search for a pattern in a file, with line numbers
pub struct GrepTool;

impl GrepTool {
    pub const NO_MATCHES: &'static str = "No matches found";
}

#[async_trait]
impl Tool for GrepTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("grep", "Search for a pattern in a file")
            .param(ParameterSchema::required("pattern", "string", "Pattern to search for"))
            .param(ParameterSchema::required("filepath", "string", "File to search in"))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let pattern = str_arg(args, "pattern")?;
        let filepath = str_arg(args, "filepath")?;
        let argv = vec!["-n".to_string(), pattern.to_string(), filepath.to_string()];

        let text = command::output_text("grep", &argv, FILE_TIMEOUT).await?;
        if text.is_empty() {
            return Ok(Self::NO_MATCHES.into());
        }
        Ok(text.into())
    }
}

/// Find files by name under a directory
pub struct FindTool;

#[async_trait]
impl Tool for FindTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("find", "Find files matching a pattern in a directory")
            .param(ParameterSchema::required("path", "string", "Directory to search in"))
            .param(ParameterSchema::optional(
                "name_pattern",
                "string",
                "Filename pattern to match (e.g., '*.rs')",
            ))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let path = str_arg(args, "path")?;
        let pattern = opt_str_arg(args, "name_pattern")?.unwrap_or("*");
        let argv = vec![path.to_string(), "-name".to_string(), pattern.to_string()];
        Ok(command::output_text("find", &argv, FIND_TIMEOUT).await?.into())
    }
}

/// First or last N lines of a file
async fn slice_lines(program: &str, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
    let filepath = str_arg(args, "filepath")?;
    let lines = opt_u64_arg(args, "lines")?.unwrap_or(DEFAULT_LINES);
    let argv = vec![format!("-n{lines}"), filepath.to_string()];
    Ok(command::output_text(program, &argv, FILE_TIMEOUT).await?.into())
}

fn lines_definition(name: &str, description: &str) -> ToolDefinition {
    ToolDefinition::new(name, description)
        .param(ParameterSchema::required("filepath", "string", "Path to the file"))
        .param(ParameterSchema::optional(
            "lines",
            "integer",
            "Number of lines to show (default: 10)",
        ))
}

pub struct HeadTool;

#[async_trait]
impl Tool for HeadTool {
    fn definition(&self) -> ToolDefinition {
        lines_definition("head", "Display first N lines of a file")
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        slice_lines("head", args).await
    }
}

pub struct TailTool;

#[async_trait]
impl Tool for TailTool {
    fn definition(&self) -> ToolDefinition {
        lines_definition("tail", "Display last N lines of a file")
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        slice_lines("tail", args).await
    }
}

/// Count lines, words and bytes
pub struct WcTool;

#[async_trait]
impl Tool for WcTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("wc", "Count lines, words, and characters in a file")
            .param(ParameterSchema::required("filepath", "string", "Path to the file"))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let filepath = str_arg(args, "filepath")?;
        Ok(command::output_text("wc", &[filepath.to_string()], FILE_TIMEOUT).await?.into())
    }
}
