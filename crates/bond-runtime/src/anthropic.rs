//! Anthropic Messages API provider
//!
//! Implementation of `LlmProvider` over plain HTTP with `reqwest`. Works with
//! the Anthropic API and with gateways exposing the same endpoint.

use async_trait::async_trait;
use bond_core::{
    error::{AgentError, Result},
    protocol::{MessagesRequest, MessagesResponse},
    provider::LlmProvider,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::AnthropicConfig;
use crate::retry::{RetryPolicy, error_for_status, with_retry};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic LLM provider
pub struct AnthropicProvider {
    client: reqwest::Client,
    config: AnthropicConfig,
    retry: RetryPolicy,
}

impl AnthropicProvider {
    /// Create from configuration with the default retry policy
    pub fn from_config(config: AnthropicConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            retry: RetryPolicy::default(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(AnthropicConfig::from_env()?)
    }

    /// Replace the transport retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub const fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    async fn send_once(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.config.auth_token)
            .bearer_auth(&self.config.auth_token)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(error_for_status(status.as_u16(), &body));
        }

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            if envelope.kind == "error" {
                return Err(envelope.into_error());
            }
        }

        serde_json::from_str(&body)
            .map_err(|e| AgentError::Protocol(format!("undecodable response body: {e}")))
    }
}

/// `{"type": "error", "error": {...}}`, which some gateways send with a 200
#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Default, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

impl ErrorEnvelope {
    fn into_error(self) -> AgentError {
        let ErrorDetail { kind, message } = self.error;
        let detail = format!("{kind}: {message}");
        match kind.as_str() {
            "rate_limit_error" => AgentError::RateLimited(detail),
            "authentication_error" | "permission_error" => AgentError::Auth(detail),
            "overloaded_error" | "api_error" => AgentError::ProviderUnavailable(detail),
            _ => AgentError::Provider(detail),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip_all, fields(model = %request.model, messages = request.messages.len()))]
    async fn create_message(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let response = with_retry(&self.retry, "create_message", || self.send_once(request)).await?;

        debug!(
            id = response.id.as_deref().unwrap_or_default(),
            stop_reason = response.stop_reason.as_deref().unwrap_or_default(),
            blocks = response.content.len(),
            "message created"
        );
        Ok(response)
    }

    async fn health_check(&self) -> Result<bool> {
        if self.config.auth_token.is_empty() {
            return Err(AgentError::Config("auth token is empty".into()));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bond_core::message::Message;
    use bond_core::protocol::{ResponseBlock, to_wire_messages};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> AnthropicConfig {
        AnthropicConfig {
            auth_token: "test-token".into(),
            base_url: base_url.into(),
            model: "claude-test".into(),
            timeout: Duration::from_secs(5),
            max_tokens: 1000,
            max_iterations: 25,
        }
    }

    fn provider(server: &MockServer) -> AnthropicProvider {
        AnthropicProvider::from_config(config(&server.uri()))
            .unwrap()
            .with_retry_policy(RetryPolicy::none())
    }

    fn request() -> MessagesRequest {
        MessagesRequest {
            model: "claude-test".into(),
            max_tokens: 1000,
            messages: to_wire_messages(&[Message::user("hello")]),
            system: None,
            temperature: None,
            tools: None,
        }
    }

    #[tokio::test]
    async fn test_sends_headers_and_decodes_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-token"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "model": "claude-test",
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "content": [
                    {"type": "text", "text": "Hi!"},
                    {"type": "tool_use", "id": "toolu_1", "name": "pwd", "input": {}}
                ],
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 5, "output_tokens": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server).create_message(&request()).await.unwrap();
        assert_eq!(response.first_text(), Some("Hi!"));
        assert_eq!(response.tool_calls()[0].name, "pwd");
        assert!(matches!(response.content[1], ResponseBlock::ToolUse { .. }));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        for (status, expected) in [
            (429_u16, "rate_limited"),
            (401, "auth"),
            (403, "auth"),
            (503, "unavailable"),
            (400, "provider"),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status).set_body_string("invalid_request"))
                .mount(&server)
                .await;

            let err = provider(&server).create_message(&request()).await.unwrap_err();
            let kind = match &err {
                AgentError::RateLimited(_) => "rate_limited",
                AgentError::Auth(_) => "auth",
                AgentError::ProviderUnavailable(_) => "unavailable",
                AgentError::Provider(_) => "provider",
                _ => "other",
            };
            assert_eq!(kind, expected, "status {status} mapped to {err:?}");
            assert!(err.to_string().contains("invalid_request"));
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = provider(&server).create_message(&request()).await.unwrap_err();
        assert!(matches!(err, AgentError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_body_without_content_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = provider(&server).create_message(&request()).await.unwrap_err();
        assert!(matches!(err, AgentError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_error_envelope_with_200_is_surfaced() {
        for (kind, expected) in [
            ("overloaded_error", "unavailable"),
            ("rate_limit_error", "rate_limited"),
            ("authentication_error", "auth"),
            ("invalid_request_error", "provider"),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "type": "error",
                    "error": {"type": kind, "message": "Overloaded"}
                })))
                .mount(&server)
                .await;

            let err = provider(&server).create_message(&request()).await.unwrap_err();
            let got = match &err {
                AgentError::RateLimited(_) => "rate_limited",
                AgentError::Auth(_) => "auth",
                AgentError::ProviderUnavailable(_) => "unavailable",
                AgentError::Provider(_) => "provider",
                _ => "other",
            };
            assert_eq!(got, expected, "{kind} mapped to {err:?}");
            assert!(err.to_string().contains("Overloaded"));
        }
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "recovered"}]
            })))
            .mount(&server)
            .await;

        let policy = RetryPolicy {
            max_retries: 1,
            base_delay_ms: 1,
            max_delay_ms: 1,
            backoff_multiplier: 1.0,
        };
        let provider = AnthropicProvider::from_config(config(&server.uri()))
            .unwrap()
            .with_retry_policy(policy);

        let response = provider.create_message(&request()).await.unwrap();
        assert_eq!(response.first_text(), Some("recovered"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let provider = AnthropicProvider::from_config(config("http://127.0.0.1:1"))
            .unwrap()
            .with_retry_policy(RetryPolicy::none());

        let err = provider.create_message(&request()).await.unwrap_err();
        assert!(matches!(err, AgentError::Transport(_)));
    }
}
