//! Service Kit - Agent Tools
//!
//! Local tools that implement `bond_core::Tool`. Most wrap a single command
//! run through [`crate::command`]; `web_search` talks HTTP directly.

mod basic;
mod files;
mod network;
mod shell;
mod system;

pub use basic::{CalculateTool, EchoTool, PingTool, SystemInfoTool};
pub use files::{CatTool, FindTool, GrepTool, HeadTool, LsTool, TailTool, WcTool};
pub use network::{CurlTool, SERPAPI_ENDPOINT, WebSearchTool};
pub use shell::{BashTool, GhTool, TreeTool};
pub use system::{SystemCommandTool, WhichTool};

use bond_core::{ToolArguments, ToolError};

/// Required string argument
pub(crate) fn str_arg<'a>(args: &'a ToolArguments, name: &str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        None | Some(serde_json::Value::Null) => Err(ToolError::MissingArgument(name.into())),
        Some(value) => value
            .as_str()
            .ok_or_else(|| ToolError::invalid(name, "expected a string")),
    }
}

/// Optional string argument; `null` counts as absent
pub(crate) fn opt_str_arg<'a>(args: &'a ToolArguments, name: &str) -> Result<Option<&'a str>, ToolError> {
    match args.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| ToolError::invalid(name, "expected a string")),
    }
}

/// Required number argument
pub(crate) fn f64_arg(args: &ToolArguments, name: &str) -> Result<f64, ToolError> {
    match args.get(name) {
        None | Some(serde_json::Value::Null) => Err(ToolError::MissingArgument(name.into())),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| ToolError::invalid(name, "expected a number")),
    }
}

/// Optional non-negative integer argument. Models sometimes send numbers as
/// strings, so `"20"` is accepted too.
pub(crate) fn opt_u64_arg(args: &ToolArguments, name: &str) -> Result<Option<u64>, ToolError> {
    match args.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ToolError::invalid(name, "expected a non-negative integer")),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| ToolError::invalid(name, "expected a non-negative integer")),
    }
}

#[cfg(test)]
pub(crate) fn args(value: serde_json::Value) -> ToolArguments {
    match value {
        serde_json::Value::Object(map) => map,
        _ => ToolArguments::new(),
    }
}
