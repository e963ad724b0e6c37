//! Protocol Adapter
//!
//! Translation between the internal [`Message`] sequence and the Anthropic
//! Messages API wire format.
//!
//! ## Mapping
//!
//! ```text
//! user text            → {"role":"user","content":"..."}
//! assistant text       → {"role":"assistant","content":"..."}
//! assistant tool calls → {"role":"assistant","content":[{"type":"tool_use",...}, ...]}
//! tool result          → {"role":"user","content":[{"type":"tool_result","tool_use_id":...}]}
//! ```
//!
//! Tool results ride on the user side of the exchange; that is how this
//! provider models them and is not universal across providers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{Message, MessageContent, Role};
use crate::tool::{ToolCallRequest, ToolDefinition};

/// Wire role. The API has no tool role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Assistant,
}

/// Content block inside a request message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

/// Message content: either a bare string or a list of blocks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireContent {
    Text(String),
    Blocks(Vec<WireBlock>),
}

/// One turn in the request's `messages` array
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: WireContent,
}

/// Tool declaration sent with the request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl From<&ToolDefinition> for WireTool {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            input_schema: def.input_schema(),
        }
    }
}

/// Body of `POST /v1/messages`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
}

/// Content block in a response
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    /// Thinking blocks and anything newer than this client
    #[serde(other)]
    Unsupported,
}

/// Token usage reported by the endpoint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens = self.input_tokens.saturating_add(rhs.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(rhs.output_tokens);
    }
}

/// Body of a successful `POST /v1/messages` response
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Required: a body without it is not a message response
    pub content: Vec<ResponseBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl MessagesResponse {
    /// Response made of the given blocks
    pub fn from_blocks(content: Vec<ResponseBlock>) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Every tool-use block, in emission order
    pub fn tool_calls(&self) -> Vec<ToolCallRequest> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ResponseBlock::ToolUse { id, name, input } => {
                    Some(ToolCallRequest::new(id.clone(), name.clone(), input.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Text of the first text block
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ResponseBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Convert one internal message to its wire turn
pub fn to_wire(message: &Message) -> WireMessage {
    match (&message.role, &message.content) {
        (Role::User | Role::Tool, MessageContent::Text(text)) => WireMessage {
            role: WireRole::User,
            content: WireContent::Text(text.clone()),
        },
        (Role::Assistant, MessageContent::Text(text)) => WireMessage {
            role: WireRole::Assistant,
            content: WireContent::Text(text.clone()),
        },
        (_, MessageContent::ToolCalls(calls)) => WireMessage {
            role: WireRole::Assistant,
            content: WireContent::Blocks(
                calls
                    .iter()
                    .map(|call| WireBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: Value::Object(call.arguments.clone()),
                    })
                    .collect(),
            ),
        },
        (_, MessageContent::ToolResult(result)) => WireMessage {
            role: WireRole::User,
            content: WireContent::Blocks(vec![WireBlock::ToolResult {
                tool_use_id: result.tool_call_id.clone(),
                content: result.content.clone(),
                is_error: result.is_error,
            }]),
        },
    }
}

/// Convert the whole history, preserving order
pub fn to_wire_messages(messages: &[Message]) -> Vec<WireMessage> {
    messages.iter().map(to_wire).collect()
}

/// Tool declarations in registration order; `None` when there are none
pub fn to_wire_tools<'a>(definitions: impl IntoIterator<Item = &'a ToolDefinition>) -> Option<Vec<WireTool>> {
    let tools: Vec<WireTool> = definitions.into_iter().map(WireTool::from).collect();
    (!tools.is_empty()).then_some(tools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ParameterSchema, ToolResult};
    use serde_json::json;

    #[test]
    fn test_user_and_assistant_text() {
        let wire = to_wire_messages(&[Message::user("hi"), Message::assistant("hello")]);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            json,
            json!([
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ])
        );
    }

    #[test]
    fn test_tool_call_becomes_tool_use_blocks() {
        let msg = Message::tool_calls(vec![
            ToolCallRequest::new("toolu_1", "echo", json!({"message": "hello"})),
            ToolCallRequest::new("toolu_2", "pwd", json!({})),
        ]);
        let json = serde_json::to_value(to_wire(&msg)).unwrap();
        assert_eq!(
            json,
            json!({
                "role": "assistant",
                "content": [
                    {"type": "tool_use", "id": "toolu_1", "name": "echo", "input": {"message": "hello"}},
                    {"type": "tool_use", "id": "toolu_2", "name": "pwd", "input": {}}
                ]
            })
        );
    }

    #[test]
    fn test_tool_result_rides_on_user_turn() {
        let ok = serde_json::to_value(to_wire(&Message::tool(ToolResult::success("toolu_1", "Echo: hello")))).unwrap();
        assert_eq!(
            ok,
            json!({
                "role": "user",
                "content": [{"type": "tool_result", "tool_use_id": "toolu_1", "content": "Echo: hello"}]
            })
        );

        let failed = serde_json::to_value(to_wire(&Message::tool(ToolResult::error("toolu_2", "boom")))).unwrap();
        assert_eq!(failed["content"][0]["is_error"], json!(true));
    }

    #[test]
    fn test_response_preserves_block_order() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "a", "name": "ls", "input": {"path": "/tmp"}},
                {"type": "thinking", "thinking": "hmm", "signature": "x"},
                {"type": "tool_use", "id": "b", "name": "pwd", "input": {}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 12, "output_tokens": 7}
        }))
        .unwrap();

        let calls = response.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "a");
        assert_eq!(calls[0].arguments["path"], "/tmp");
        assert_eq!(calls[1].id, "b");
        assert_eq!(response.first_text(), Some("Let me check."));
        assert_eq!(response.content[2], ResponseBlock::Unsupported);
        assert_eq!(response.usage.unwrap().input_tokens, 12);
    }

    #[test]
    fn test_empty_response_has_neither_calls_nor_text() {
        let response: MessagesResponse = serde_json::from_value(json!({"content": []})).unwrap();
        assert!(response.tool_calls().is_empty());
        assert!(response.first_text().is_none());
    }

    #[test]
    fn test_body_without_content_is_rejected() {
        assert!(serde_json::from_value::<MessagesResponse>(json!({})).is_err());
        assert!(serde_json::from_value::<MessagesResponse>(json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        }))
        .is_err());
    }

    #[test]
    fn test_usage_addition_saturates() {
        let mut total = Usage { input_tokens: u32::MAX - 1, output_tokens: 1 };
        total += Usage { input_tokens: 10, output_tokens: 2 };
        assert_eq!(total, Usage { input_tokens: u32::MAX, output_tokens: 3 });
    }

    #[test]
    fn test_request_omits_absent_fields() {
        let request = MessagesRequest {
            model: "m".into(),
            max_tokens: 1000,
            messages: to_wire_messages(&[Message::user("hi")]),
            system: None,
            temperature: None,
            tools: to_wire_tools(Vec::<&ToolDefinition>::new()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("system").is_none());
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn test_tool_declarations_keep_order() {
        let defs = [
            ToolDefinition::new("ping", "ping a host")
                .param(ParameterSchema::required("host", "string", "hostname")),
            ToolDefinition::new("echo", "echo a message"),
        ];
        let tools = to_wire_tools(&defs).unwrap();
        assert_eq!(tools[0].name, "ping");
        assert_eq!(tools[0].input_schema["required"], json!(["host"]));
        assert_eq!(tools[1].name, "echo");
    }
}
