//! Conversation Messages
//!
//! The internal message model and the append-only [`Context`] that holds one
//! session's history. Nothing here knows about the provider wire format; see
//! [`crate::protocol`] for that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::tool::{ToolCallRequest, ToolResult};

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input
    User,
    /// Assistant (LLM) response or tool request
    Assistant,
    /// Tool result
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// Payload of a message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MessageContent {
    Text(String),
    ToolCalls(Vec<ToolCallRequest>),
    ToolResult(ToolResult),
}

/// A single message in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text, tool calls, or a tool result
    pub content: MessageContent,

    /// Correlates a tool message with the call that produced it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: MessageContent, tool_call_id: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_call_id,
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Text(content.into()), None)
    }

    /// Create an assistant text message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageContent::Text(content.into()), None)
    }

    /// Create an assistant message requesting tool calls
    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self::new(Role::Assistant, MessageContent::ToolCalls(calls), None)
    }

    /// Create a tool result message
    pub fn tool(result: ToolResult) -> Self {
        let id = result.tool_call_id.clone();
        Self::new(Role::Tool, MessageContent::ToolResult(result), Some(id))
    }

    /// Text content, if this is a plain text message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Tool calls carried by an assistant message (empty otherwise)
    pub fn calls(&self) -> &[ToolCallRequest] {
        match &self.content {
            MessageContent::ToolCalls(calls) => calls,
            _ => &[],
        }
    }

    /// One-line rendering for display
    pub fn summary(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::ToolCalls(calls) => calls
                .iter()
                .map(|c| format!("{}({})", c.name, serde_json::Value::Object(c.arguments.clone())))
                .collect::<Vec<_>>()
                .join(", "),
            MessageContent::ToolResult(result) => {
                if result.is_error {
                    format!("error: {}", result.content)
                } else {
                    result.content.clone()
                }
            }
        }
    }
}

/// Conversation history for one session.
///
/// Append-only: messages are never reordered or removed, except by
/// [`Context::clear`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Context {
    messages: Vec<Message>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    ///
    /// Tool messages must carry a `tool_call_id` that matches exactly one
    /// tool call in an earlier assistant message.
    pub fn push(&mut self, message: Message) -> Result<()> {
        match (message.role, &message.content) {
            (Role::Tool, MessageContent::ToolResult(result)) => {
                if message.tool_call_id.as_deref() != Some(result.tool_call_id.as_str()) {
                    return Err(AgentError::Context(format!(
                        "tool message id does not match its result ({})",
                        result.tool_call_id
                    )));
                }
                let matches = self.count_calls(&result.tool_call_id);
                if matches != 1 {
                    return Err(AgentError::Context(format!(
                        "tool result '{}' matches {} preceding tool calls",
                        result.tool_call_id, matches
                    )));
                }
            }
            (Role::Tool, _) => {
                return Err(AgentError::Context("tool message without a tool result".into()));
            }
            (_, MessageContent::ToolResult(_)) => {
                return Err(AgentError::Context(format!(
                    "tool result attached to a {} message",
                    message.role
                )));
            }
            (Role::User, MessageContent::ToolCalls(_)) => {
                return Err(AgentError::Context("user message carrying tool calls".into()));
            }
            _ => {
                if message.tool_call_id.is_some() {
                    return Err(AgentError::Context(format!(
                        "{} message must not carry a tool_call_id",
                        message.role
                    )));
                }
            }
        }

        self.messages.push(message);
        Ok(())
    }

    /// Append an assistant tool call and its result together.
    ///
    /// Nothing is appended unless the pair is valid as a whole, so a
    /// rejected exchange never leaves a call without its result.
    pub fn push_tool_exchange(&mut self, call: ToolCallRequest, result: ToolResult) -> Result<()> {
        if result.tool_call_id != call.id {
            return Err(AgentError::Context(format!(
                "tool result '{}' does not answer call '{}'",
                result.tool_call_id, call.id
            )));
        }
        if self.has_call(&call.id) {
            return Err(AgentError::Context(format!(
                "tool call '{}' already present in the context",
                call.id
            )));
        }

        self.messages.push(Message::tool_calls(vec![call]));
        self.messages.push(Message::tool(result));
        Ok(())
    }

    /// Whether an earlier assistant message already issued this call id
    pub fn has_call(&self, id: &str) -> bool {
        self.count_calls(id) > 0
    }

    fn count_calls(&self, id: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .flat_map(Message::calls)
            .filter(|c| c.id == id)
            .count()
    }

    /// Get all messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Owned copy of the history
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Drop the whole history
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str) -> ToolCallRequest {
        ToolCallRequest::new(id, "echo", json!({"message": "hi"}))
    }

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), Some("Hello"));
        assert!(msg.tool_call_id.is_none());
    }

    #[test]
    fn test_tool_message_carries_call_id() {
        let msg = Message::tool(ToolResult::success("toolu_1", "Echo: hi"));
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("toolu_1"));
    }

    #[test]
    fn test_context_accepts_paired_tool_result() {
        let mut ctx = Context::new();
        ctx.push(Message::user("Hi")).unwrap();
        ctx.push(Message::tool_calls(vec![call("toolu_1")])).unwrap();
        ctx.push(Message::tool(ToolResult::success("toolu_1", "Echo: hi"))).unwrap();
        ctx.push(Message::assistant("done")).unwrap();

        assert_eq!(ctx.len(), 4);
        assert_eq!(ctx.last().unwrap().role, Role::Assistant);
    }

    #[test]
    fn test_context_rejects_orphan_tool_result() {
        let mut ctx = Context::new();
        ctx.push(Message::user("Hi")).unwrap();

        let err = ctx
            .push(Message::tool(ToolResult::success("toolu_9", "nope")))
            .unwrap_err();
        assert!(matches!(err, AgentError::Context(_)));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_context_rejects_ambiguous_tool_result() {
        let mut ctx = Context::new();
        ctx.push(Message::tool_calls(vec![call("dup")])).unwrap();
        ctx.push(Message::tool_calls(vec![call("dup")])).unwrap();

        assert!(ctx.push(Message::tool(ToolResult::success("dup", "x"))).is_err());
    }

    #[test]
    fn test_tool_exchange_is_all_or_nothing() {
        let mut ctx = Context::new();
        ctx.push(Message::user("Hi")).unwrap();
        ctx.push_tool_exchange(call("toolu_1"), ToolResult::success("toolu_1", "Echo: hi"))
            .unwrap();
        assert_eq!(ctx.len(), 3);
        assert!(ctx.has_call("toolu_1"));

        let reused = ctx.push_tool_exchange(call("toolu_1"), ToolResult::success("toolu_1", "again"));
        assert!(matches!(reused, Err(AgentError::Context(_))));

        let mismatched = ctx.push_tool_exchange(call("toolu_2"), ToolResult::success("toolu_3", "x"));
        assert!(matches!(mismatched, Err(AgentError::Context(_))));

        assert_eq!(ctx.len(), 3);
        assert!(!ctx.has_call("toolu_2"));
    }

    #[test]
    fn test_clear_empties_context() {
        let mut ctx = Context::new();
        ctx.push(Message::user("Hi")).unwrap();
        ctx.clear();
        assert!(ctx.is_empty());
        assert!(ctx.snapshot().is_empty());
    }
}
