//! Reasoning Loop
//!
//! Call the model, run every tool it asks for, feed the results back, and
//! repeat until it answers with text. The loop is bounded by
//! `max_iterations` model calls per request and can be cancelled.
//!
//! ```text
//! AwaitingUserInput ──process()──▶ CallingModel ──tool_use──▶ ExecutingTools
//!         ▲                            │   ▲                       │
//!         └──────── text / empty ──────┘   └───────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::executor::ToolExecutor;
use crate::message::{Context, Message};
use crate::protocol::{self, MessagesRequest, Usage};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCallRequest, ToolRegistry};

/// Returned when the model answers with neither text nor tool calls
pub const NO_RESPONSE: &str = "No response generated";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Generation options
    pub generation: GenerationOptions,

    /// Maximum model calls per `process` before giving up
    pub max_iterations: usize,

    /// Whether to send tool declarations with each request
    pub use_tools: bool,

    /// Upper bound on a single tool call
    pub tool_timeout: Option<Duration>,

    /// Reply used when the model returns no content
    pub fallback_response: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            generation: GenerationOptions::default(),
            max_iterations: 25,
            use_tools: true,
            tool_timeout: None,
            fallback_response: NO_RESPONSE.into(),
        }
    }
}

/// One conversation session
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    executor: ToolExecutor,
    config: AgentConfig,
    context: Context,
    usage: Usage,
    session_id: Uuid,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        let mut executor = ToolExecutor::new(tools);
        if let Some(limit) = config.tool_timeout {
            executor = executor.with_timeout(limit);
        }

        Self {
            provider,
            executor,
            config,
            context: Context::new(),
            usage: Usage::default(),
            session_id: Uuid::new_v4(),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Run one user turn to completion
    pub async fn process(&mut self, user_input: &str) -> Result<String> {
        self.process_with_cancel(user_input, &CancellationToken::new())
            .await
    }

    /// Run one user turn, aborting the in-flight model or tool call when
    /// `cancel` fires.
    ///
    /// Messages appended before a failure stay in the context.
    #[tracing::instrument(skip_all, fields(session = %self.session_id))]
    pub async fn process_with_cancel(
        &mut self,
        user_input: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.context.push(Message::user(user_input))?;

        let mut iterations = 0;

        loop {
            if cancel.is_cancelled() {
                info!(iterations, "request cancelled");
                return Err(AgentError::Cancelled);
            }

            if iterations >= self.config.max_iterations {
                warn!(
                    iterations,
                    max = self.config.max_iterations,
                    "tool loop hit iteration limit"
                );
                return Err(AgentError::MaxIterations(self.config.max_iterations));
            }
            iterations += 1;

            let request = self.build_request();
            debug!(
                iteration = iterations,
                messages = request.messages.len(),
                provider = self.provider.name(),
                "calling model"
            );

            let response = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(iterations, "request cancelled while waiting for model");
                    return Err(AgentError::Cancelled);
                }
                response = self.provider.create_message(&request) => response?,
            };

            if let Some(usage) = response.usage {
                self.usage += usage;
            }

            let calls = response.tool_calls();
            if calls.is_empty() {
                let Some(text) = response.first_text() else {
                    debug!(stop_reason = ?response.stop_reason, "model returned no content");
                    return Ok(self.config.fallback_response.clone());
                };
                self.context.push(Message::assistant(text))?;
                return Ok(text.to_string());
            }

            self.check_call_ids(&calls)?;
            info!(count = calls.len(), iteration = iterations, "executing tool calls");

            for call in calls {
                let result = self.executor.execute_with_cancel(&call, cancel).await;
                debug!(tool = %call.name, id = %call.id, is_error = result.is_error, "tool finished");
                self.context.push_tool_exchange(call, result)?;
            }
        }
    }

    /// Reject a response whose tool_use ids collide with each other or with
    /// an earlier call, before any of them runs.
    fn check_call_ids(&self, calls: &[ToolCallRequest]) -> Result<()> {
        for (i, call) in calls.iter().enumerate() {
            let repeated = calls[..i].iter().any(|earlier| earlier.id == call.id);
            if repeated || self.context.has_call(&call.id) {
                warn!(id = %call.id, tool = %call.name, "model reused a tool_use id");
                return Err(AgentError::Protocol(format!(
                    "tool_use id '{}' was already used in this conversation",
                    call.id
                )));
            }
        }
        Ok(())
    }

    /// Serialize the current context into a request
    fn build_request(&self) -> MessagesRequest {
        let generation = &self.config.generation;
        let tools = if self.config.use_tools {
            protocol::to_wire_tools(self.executor.registry().list_all())
        } else {
            None
        };

        MessagesRequest {
            model: generation.model.clone(),
            max_tokens: generation.max_tokens,
            messages: protocol::to_wire_messages(self.context.messages()),
            system: generation.system_prompt.clone(),
            temperature: generation.temperature,
            tools,
        }
    }

    /// Clear the conversation
    pub fn reset_context(&mut self) {
        debug!(session = %self.session_id, dropped = self.context.len(), "context reset");
        self.context.clear();
    }

    /// Snapshot of the conversation
    pub fn context(&self) -> Vec<Message> {
        self.context.snapshot()
    }

    /// Borrowed view of the conversation
    pub fn messages(&self) -> &[Message] {
        self.context.messages()
    }

    /// Tokens used so far in this session
    pub const fn usage(&self) -> Usage {
        self.usage
    }

    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
    error: Option<AgentError>,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
            error: None,
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Register one tool; a duplicate name surfaces from `build`
    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        if let Err(e) = self.tools.register(tool) {
            self.error.get_or_insert(e);
        }
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.generation.system_prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn max_tokens(mut self, max: u32) -> Self {
        self.config.generation.max_tokens = max;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Stop declaring tools to the model
    #[must_use]
    pub const fn use_tools(mut self, enabled: bool) -> Self {
        self.config.use_tools = enabled;
        self
    }

    #[must_use]
    pub const fn tool_timeout(mut self, limit: Duration) -> Self {
        self.config.tool_timeout = Some(limit);
        self
    }

    pub fn build(self) -> Result<Agent> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;
        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
