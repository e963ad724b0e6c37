//! Basic Tools
//!
//! echo, calculate, get_system_info and ping.

use std::time::Duration;

use async_trait::async_trait;
use bond_core::{ParameterSchema, Tool, ToolArguments, ToolDefinition, ToolError, ToolOutput};
use serde_json::json;

use super::{f64_arg, str_arg};
use crate::command;

/// Echo back a message
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("echo", "Echo back a message")
            .param(ParameterSchema::required("message", "string", "The message to echo"))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let message = str_arg(args, "message")?;
        Ok(format!("Echo: {message}").into())
    }
}

/// Two-operand arithmetic
pub struct CalculateTool;

#[async_trait]
impl Tool for CalculateTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("calculate", "Perform a basic mathematical calculation")
            .param(ParameterSchema::required(
                "operation",
                "string",
                "Operation to perform (add, subtract, multiply, divide)",
            ))
            .param(ParameterSchema::required("a", "number", "First number"))
            .param(ParameterSchema::required("b", "number", "Second number"))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let operation = str_arg(args, "operation")?;
        let a = f64_arg(args, "a")?;
        let b = f64_arg(args, "b")?;

        let value = match operation {
            "add" => a + b,
            "subtract" => a - b,
            "multiply" => a * b,
            "divide" if b == 0.0 => f64::INFINITY,
            "divide" => a / b,
            other => return Err(ToolError::failed(format!("Unsupported operation: {other}"))),
        };
        Ok(ToolOutput::Float(value))
    }
}

/// Host platform details, returned as a structured value
pub struct SystemInfoTool;

#[async_trait]
impl Tool for SystemInfoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "get_system_info",
            "Get basic system information including platform, architecture, CPU count, etc.",
        )
    }

    async fn call(&self, _args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let cpus = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);

        Ok(ToolOutput::Structured(json!({
            "platform": std::env::consts::OS,
            "family": std::env::consts::FAMILY,
            "architecture": std::env::consts::ARCH,
            "cpus": cpus,
            "agent_version": env!("CARGO_PKG_VERSION"),
        })))
    }
}

/// Ping a host five times
pub struct PingTool;

impl PingTool {
    const TIMEOUT: Duration = Duration::from_secs(30);
}

#[async_trait]
impl Tool for PingTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("ping", "Ping some host on the internet to test connectivity")
            .param(ParameterSchema::required("host", "string", "hostname or IP address to ping"))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let host = str_arg(args, "host")?;
        let argv = vec!["-c".to_string(), "5".to_string(), host.to_string()];
        Ok(command::output_text("ping", &argv, Self::TIMEOUT).await?.into())
    }
}
