//! # bond-core
//!
//! Tool-calling orchestration: conversation context, protocol translation,
//! tool registry and executor, and the reasoning loop tying them together.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              Agent                               │
//! │  ┌───────────┐  ┌──────────────┐  ┌───────────┐  ┌────────────┐  │
//! │  │  Context  │──│   Protocol   │──│ Reasoning │──│ LlmProvider│  │
//! │  │  (append) │  │   Adapter    │  │   Loop    │  │ (Strategy) │  │
//! │  └───────────┘  └──────────────┘  └─────┬─────┘  └────────────┘  │
//! │                                   ┌─────┴─────┐  ┌────────────┐  │
//! │                                   │  Executor │──│  Registry  │  │
//! │                                   └───────────┘  └────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait keeps the HTTP transport out of this crate; tests
//! drive the loop with scripted providers.

pub mod error;
pub mod executor;
pub mod message;
pub mod protocol;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use error::{AgentError, Result, ToolError};
pub use executor::ToolExecutor;
pub use message::{Context, Message, MessageContent, Role};
pub use protocol::{MessagesRequest, MessagesResponse, ResponseBlock, Usage};
pub use provider::{GenerationOptions, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, NO_RESPONSE};
pub use tool::{
    ParameterSchema, Tool, ToolArguments, ToolCallRequest, ToolDefinition, ToolOutput,
    ToolRegistry, ToolResult,
};
