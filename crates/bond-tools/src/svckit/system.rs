//! System Tools
//!
//! Fixed, argument-free commands (pwd, whoami, uname, df, ps, env) share one
//! implementation; `which` takes the command to locate.

use std::time::Duration;

use async_trait::async_trait;
use bond_core::{ParameterSchema, Tool, ToolArguments, ToolDefinition, ToolError, ToolOutput};

use super::str_arg;
use crate::command;

/// A tool that always runs the same command line
pub struct SystemCommandTool {
    name: &'static str,
    description: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    timeout: Duration,
    trim: bool,
}

impl SystemCommandTool {
    const SHORT: Duration = Duration::from_secs(5);
    const LONG: Duration = Duration::from_secs(10);

    pub const fn pwd() -> Self {
        Self {
            name: "pwd",
            description: "Print current working directory path",
            program: "pwd",
            args: &[],
            timeout: Self::SHORT,
            trim: true,
        }
    }

    pub const fn whoami() -> Self {
        Self {
            name: "whoami",
            description: "Display current user name",
            program: "whoami",
            args: &[],
            timeout: Self::SHORT,
            trim: true,
        }
    }

    pub const fn uname() -> Self {
        Self {
            name: "uname",
            description: "Display system information (OS, kernel, etc.)",
            program: "uname",
            args: &["-a"],
            timeout: Self::SHORT,
            trim: true,
        }
    }

    pub const fn df() -> Self {
        Self {
            name: "df",
            description: "Display disk space usage for all filesystems",
            program: "df",
            args: &["-h"],
            timeout: Self::LONG,
            trim: false,
        }
    }

    pub const fn ps() -> Self {
        Self {
            name: "ps",
            description: "Display currently running processes",
            program: "ps",
            args: &["aux"],
            timeout: Self::LONG,
            trim: false,
        }
    }

    pub const fn env() -> Self {
        Self {
            name: "env",
            description: "Display environment variables",
            program: "env",
            args: &[],
            timeout: Self::SHORT,
            trim: false,
        }
    }
}

#[async_trait]
impl Tool for SystemCommandTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name, self.description)
    }

    async fn call(&self, _args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let argv: Vec<String> = self.args.iter().map(|a| (*a).to_string()).collect();
        let text = command::output_text(self.program, &argv, self.timeout).await?;
        if self.trim {
            return Ok(text.trim().into());
        }
        Ok(text.into())
    }
}

/// Locate a command in PATH
pub struct WhichTool;

#[async_trait]
impl Tool for WhichTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("which", "Locate a command in the system PATH")
            .param(ParameterSchema::required("command", "string", "Command name to locate"))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let name = str_arg(args, "command")?;
        let out = command::run("which", &[name.to_string()], Duration::from_secs(5)).await?;
        if !out.success() || out.text.trim().is_empty() {
            return Ok(format!("command not found: {name}").into());
        }
        Ok(out.text.trim().into())
    }
}
