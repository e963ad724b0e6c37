//! Tool Invocation Executor
//!
//! Dispatches a [`ToolCallRequest`] to its registered tool and always comes
//! back with a [`ToolResult`]. Unknown tools, argument problems, handler
//! errors, panics, timeouts and cancellation all end up as error results
//! the model can read.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArguments, ToolCallRequest, ToolOutput, ToolRegistry, ToolResult};

/// Executes tool calls against a shared registry
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Option<Duration>,
}

impl ToolExecutor {
    pub const fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Upper bound on any single tool call, on top of the tool's own limits
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute a call. Never fails.
    pub async fn execute(&self, call: &ToolCallRequest) -> ToolResult {
        self.execute_with_cancel(call, &CancellationToken::new()).await
    }

    /// Execute a call, giving up early if `cancel` fires.
    pub async fn execute_with_cancel(
        &self,
        call: &ToolCallRequest,
        cancel: &CancellationToken,
    ) -> ToolResult {
        let Ok(tool) = self.registry.lookup(&call.name) else {
            warn!(tool = %call.name, id = %call.id, "model requested unknown tool");
            return ToolResult::error(&call.id, format!("Error: Tool '{}' not found", call.name));
        };

        let outcome = self
            .invoke(tool.as_ref(), &call.arguments, cancel)
            .await
            .and_then(|output| output.render().map_err(|e| ToolError::failed(e.to_string())));

        match outcome {
            Ok(content) => {
                debug!(tool = %call.name, id = %call.id, len = content.len(), "tool succeeded");
                ToolResult::success(&call.id, content)
            }
            Err(e) => {
                warn!(tool = %call.name, id = %call.id, error = %e, "tool failed");
                ToolResult::error(
                    &call.id,
                    format!("Error executing tool '{}': {}", call.name, e),
                )
            }
        }
    }

    async fn invoke(
        &self,
        tool: &dyn Tool,
        args: &ToolArguments,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ToolError> {
        tool.validate(args)?;

        let guarded = AssertUnwindSafe(tool.call(args))
            .catch_unwind()
            .map(|caught| caught.unwrap_or_else(|panic| Err(ToolError::failed(panic_message(&*panic)))));

        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, guarded)
                    .await
                    .unwrap_or_else(|_| Err(ToolError::Timeout(limit.as_secs()))),
                None => guarded.await,
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ToolError::Cancelled),
            result = bounded => result,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "tool panicked".to_string())
}
