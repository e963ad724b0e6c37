//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
///
/// Only transport, protocol and loop-control errors ever escape
/// [`Agent::process`](crate::reasoning::Agent::process). Tool failures are
/// folded into the conversation as error results instead.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider returned an error response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Network failure or timeout reaching the endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response could not be interpreted
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Tool name registered twice
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// Context append would break message ordering invariants
    #[error("Context error: {0}")]
    Context(String),

    /// Maximum iterations reached in reasoning loop
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// Request was cancelled by the caller
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl AgentError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::Transport(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) | Self::Transport(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::Protocol(_) => "The AI service returned a response that could not be read.".into(),
            Self::MaxIterations(_) => {
                "The request took too many tool calls to finish. Please try a simpler query.".into()
            }
            Self::Cancelled => "Request cancelled.".into(),
            Self::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            Self::Auth(_) => "Authentication failed. Please check your credentials.".into(),
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

/// Failure raised by a tool handler.
///
/// The executor turns every variant into an error result with the text
/// `Error executing tool '<name>': <display>`.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("missing required parameter '{0}'")]
    MissingArgument(String),

    #[error("invalid value for '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("timed out after {0} seconds")]
    Timeout(u64),

    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ToolError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(AgentError::RateLimited("slow down".into()).is_retryable());
        assert!(AgentError::Transport("reset".into()).is_retryable());
        assert!(!AgentError::Protocol("bad json".into()).is_retryable());
        assert!(!AgentError::MaxIterations(3).is_retryable());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            AgentError::Transport("reset".into()).user_message(),
            "The AI service is currently unavailable. Please try again."
        );
        assert_eq!(AgentError::Cancelled.user_message(), "Request cancelled.");
        assert_eq!(
            AgentError::Context("dangling".into()).user_message(),
            "An unexpected error occurred."
        );
    }

    #[test]
    fn test_tool_error_display() {
        assert_eq!(
            ToolError::MissingArgument("host".into()).to_string(),
            "missing required parameter 'host'"
        );
        assert_eq!(ToolError::Timeout(10).to_string(), "timed out after 10 seconds");
    }
}
