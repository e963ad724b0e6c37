//! Tool System
//!
//! Tools are registered once at startup and invoked by the executor on
//! behalf of the reasoning loop. Every tool implements the same contract:
//! an argument map in, a [`ToolOutput`] or a [`ToolError`] out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result, ToolError};

/// Named arguments passed to a tool
pub type ToolArguments = Map<String, Value>;

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation id issued by the endpoint
    pub id: String,

    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: ToolArguments,
}

impl ToolCallRequest {
    /// Build a request from a raw `input` value. Anything that is not a
    /// JSON object (including `null`) becomes an empty argument map.
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        let arguments = match input {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Result from tool execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the call this answers
    pub tool_call_id: String,

    /// Normalized output or error text
    pub content: String,

    /// Whether execution failed
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// Value returned by a tool handler.
///
/// Primitives render as plain text; structured values render as JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolOutput {
    /// No value
    Unit,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Arrays, objects and nested combinations
    Structured(Value),
}

impl ToolOutput {
    /// Text handed back to the model.
    ///
    /// A bare string stays unquoted; only structured values go through
    /// JSON encoding.
    pub fn render(&self) -> std::result::Result<String, serde_json::Error> {
        Ok(match self {
            Self::Unit => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Float(x) => render_float(*x),
            Self::Text(s) => s.clone(),
            Self::Structured(value) => serde_json::to_string(value)?,
        })
    }
}

/// Whole numbers keep a trailing `.0` so `3.0` does not read as an integer
fn render_float(x: f64) -> String {
    if x.is_nan() {
        "nan".into()
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        x.to_string()
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Unit,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::Text(n.to_string())),
            Value::String(s) => Self::Text(s),
            structured @ (Value::Array(_) | Value::Object(_)) => Self::Structured(structured),
        }
    }
}

impl From<String> for ToolOutput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ToolOutput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for ToolOutput {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for ToolOutput {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for ToolOutput {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<()> for ToolOutput {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, integer, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// Static description of a tool, as shown to the LLM
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParameterSchema) -> Self {
        self.parameters.push(param);
        self
    }

    /// JSON-schema object describing the parameters
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    serde_json::json!({
                        "type": p.param_type,
                        "description": p.description,
                    }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's definition for LLM function calling
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with the given named arguments
    async fn call(&self, args: &ToolArguments) -> std::result::Result<ToolOutput, ToolError>;

    /// Validate arguments before execution
    fn validate(&self, args: &ToolArguments) -> std::result::Result<(), ToolError> {
        for param in &self.definition().parameters {
            if param.required && args.get(&param.name).is_none_or(Value::is_null) {
                return Err(ToolError::MissingArgument(param.name.clone()));
            }
        }
        Ok(())
    }
}

/// Registry for available tools
///
/// Keeps registration order so the tool list sent to the model is
/// reproducible.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<(ToolDefinition, Arc<dyn Tool>)>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let definition = tool.definition();
        if self.index.contains_key(&definition.name) {
            return Err(AgentError::DuplicateTool(definition.name));
        }
        self.index.insert(definition.name.clone(), self.tools.len());
        self.tools.push((definition, tool));
        Ok(())
    }

    /// Get a tool by name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i].1))
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    /// All definitions, in registration order
    pub fn list_all(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|(def, _)| def).collect()
    }

    /// Tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|(def, _)| def.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new(self.0, "test tool")
                .param(ParameterSchema::required("message", "string", "text"))
        }

        async fn call(&self, _args: &ToolArguments) -> std::result::Result<ToolOutput, ToolError> {
            Ok(ToolOutput::Unit)
        }
    }

    #[test]
    fn test_tool_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Named("zeta")).unwrap();
        registry.register(Named("alpha")).unwrap();
        registry.register(Named("mid")).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        assert!(registry.lookup("alpha").is_ok());
        assert!(matches!(
            registry.lookup("unknown"),
            Err(AgentError::UnknownTool(name)) if name == "unknown"
        ));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ToolRegistry::new();
        registry.register(Named("echo")).unwrap();
        let err = registry.register(Named("echo")).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_primitive_rendering_is_unquoted() {
        assert_eq!(ToolOutput::from(42_i64).render().unwrap(), "42");
        assert_eq!(ToolOutput::from("hello").render().unwrap(), "hello");
        assert_eq!(ToolOutput::from(true).render().unwrap(), "true");
        assert_eq!(ToolOutput::from(2.5).render().unwrap(), "2.5");
        assert_eq!(ToolOutput::Float(3.0).render().unwrap(), "3.0");
        assert_eq!(ToolOutput::Float(-1.0).render().unwrap(), "-1.0");
        assert_eq!(ToolOutput::Float(f64::INFINITY).render().unwrap(), "inf");
        assert_eq!(ToolOutput::from(()).render().unwrap(), "");
        assert_eq!(ToolOutput::from(json!("bare")).render().unwrap(), "bare");
        assert_eq!(ToolOutput::from(json!(7)).render().unwrap(), "7");
    }

    #[test]
    fn test_structured_rendering_round_trips() {
        let value = json!({"platform": "linux", "cores": [1, 2], "nested": {"ok": true}});
        let text = ToolOutput::from(value.clone()).render().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_validate_reports_missing_argument() {
        let tool = Named("echo");
        let err = tool.validate(&Map::new()).unwrap_err();
        assert!(matches!(err, ToolError::MissingArgument(name) if name == "message"));

        let args = json!({"message": "hi"}).as_object().cloned().unwrap();
        assert!(tool.validate(&args).is_ok());
    }

    #[test]
    fn test_input_schema_shape() {
        let def = ToolDefinition::new("head", "first lines")
            .param(ParameterSchema::required("filepath", "string", "file"))
            .param(ParameterSchema::optional("lines", "integer", "count"));
        let schema = def.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["lines"]["type"], "integer");
        assert_eq!(schema["required"], json!(["filepath"]));
    }

    #[test]
    fn test_non_object_input_becomes_empty_arguments() {
        let call = ToolCallRequest::new("t1", "pwd", Value::Null);
        assert!(call.arguments.is_empty());
    }
}
