//! # bond-tools
//!
//! The local tool set for the bond agent plus workspace isolation.
//!
//! ## Tool categories
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Basic     ping, get_system_info, echo, calculate           │
//! │  Files     ls, pwd, cat, grep, find, head, tail, wc         │
//! │  System    whoami, uname, df, ps, env, which                │
//! │  Network   curl, gh, web_search                             │
//! │  Advanced  tree, bash                                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Command-backed tools merge stderr into their output and run under a
//! per-tool timeout. A command that exits non-zero still returns its output;
//! failing to spawn or timing out is a tool fault.

use std::sync::Arc;

use bond_core::{Result as CoreResult, Tool, ToolRegistry};

pub mod command;
pub mod error;
pub mod svckit;
pub mod workspace;

pub use error::{Result, WorkspaceError};
pub use workspace::WorkspaceManager;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        BashTool, CalculateTool, CatTool, CurlTool, EchoTool, FindTool, GhTool, GrepTool, HeadTool,
        LsTool, PingTool, SystemCommandTool, SystemInfoTool, TailTool, TreeTool, WcTool,
        WebSearchTool, WhichTool,
    };
}

/// Every built-in tool, in canonical registration order
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    use svckit::*;

    vec![
        Arc::new(PingTool),
        Arc::new(SystemInfoTool),
        Arc::new(EchoTool),
        Arc::new(CalculateTool),
        Arc::new(LsTool),
        Arc::new(SystemCommandTool::pwd()),
        Arc::new(CatTool),
        Arc::new(GrepTool),
        Arc::new(FindTool),
        Arc::new(HeadTool),
        Arc::new(TailTool),
        Arc::new(WcTool),
        Arc::new(SystemCommandTool::whoami()),
        Arc::new(SystemCommandTool::uname()),
        Arc::new(SystemCommandTool::df()),
        Arc::new(SystemCommandTool::ps()),
        Arc::new(SystemCommandTool::env()),
        Arc::new(WhichTool),
        Arc::new(CurlTool),
        Arc::new(GhTool),
        Arc::new(WebSearchTool::new()),
        Arc::new(TreeTool),
        Arc::new(BashTool),
    ]
}

/// Register every built-in tool
pub fn register_all(registry: &mut ToolRegistry) -> CoreResult<()> {
    for tool in all_tools() {
        registry.register_arc(tool)?;
    }
    Ok(())
}

/// Default system prompt for the interactive agent
pub const BOND_SYSTEM_PROMPT: &str = "You are Bond, a helpful assistant running in the user's terminal. \
You can call local tools to inspect files, run commands, query the system, fetch URLs and search the web. \
Prefer a tool call over guessing when the answer depends on the local machine, \
and keep answers short and concrete.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry).unwrap();

        assert_eq!(
            registry.names(),
            vec![
                "ping", "get_system_info", "echo", "calculate", "ls", "pwd", "cat", "grep", "find",
                "head", "tail", "wc", "whoami", "uname", "df", "ps", "env", "which", "curl", "gh",
                "web_search", "tree", "bash",
            ]
        );
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry).unwrap();
        assert!(register_all(&mut registry).is_err());
    }
}
