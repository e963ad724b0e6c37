//! LLM Provider Strategy Pattern
//!
//! Defines the one call the agent makes to a model endpoint. The agent works
//! exclusively through [`LlmProvider`], so the HTTP transport, a gateway, or a
//! scripted test double can stand behind it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bond_core::provider::LlmProvider;
//!
//! let provider = AnthropicProvider::from_config(config)?;
//! let response = provider.create_message(&request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::{MessagesRequest, MessagesResponse};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "claude-3-5-sonnet-20241022")
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for sampling; provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// System prompt, sent outside the message list
    #[serde(default)]
    pub system_prompt: Option<String>,
}

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

const fn default_max_tokens() -> u32 {
    1000
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            max_tokens: default_max_tokens(),
            temperature: None,
            system_prompt: None,
        }
    }
}

/// Strategy trait for LLM providers
///
/// Implementations own transport concerns (HTTP, auth, retries). Any error
/// they return aborts the current `process` call.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Send one message-creation request
    async fn create_message(&self, request: &MessagesRequest) -> Result<MessagesResponse>;

    /// Check if the provider is reachable and configured correctly
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
