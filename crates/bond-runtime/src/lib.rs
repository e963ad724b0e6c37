//! # bond-runtime
//!
//! Runtime provider for the bond agent: the Anthropic Messages API over HTTP,
//! its configuration, and transport-level retry.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bond_runtime::{AnthropicConfig, AnthropicProvider};
//!
//! let config = AnthropicConfig::load(None)?;
//! let provider = AnthropicProvider::from_config(config.clone())?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .max_iterations(config.max_iterations)
//!     .build()?;
//! ```

pub mod anthropic;
pub mod config;
pub mod retry;

pub use anthropic::AnthropicProvider;
pub use config::AnthropicConfig;
pub use retry::RetryPolicy;

// Re-export core types for convenience
pub use bond_core::{Agent, AgentError, LlmProvider, Message, Result, Role, Tool, ToolRegistry};
