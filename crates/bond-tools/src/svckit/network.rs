//! Network Tools
//!
//! `curl` shells out; `web_search` queries SerpAPI's Google engine over HTTP.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use bond_core::{ParameterSchema, Tool, ToolArguments, ToolDefinition, ToolError, ToolOutput};
use serde::Deserialize;
use tracing::debug;

use super::{opt_str_arg, opt_u64_arg, str_arg};
use crate::command;

pub const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";

/// Fetch a URL with curl
pub struct CurlTool;

impl CurlTool {
    const TIMEOUT: Duration = Duration::from_secs(30);
}

#[async_trait]
impl Tool for CurlTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("curl", "Fetch content from a URL")
            .param(ParameterSchema::required("url", "string", "URL to fetch"))
            .param(ParameterSchema::optional(
                "options",
                "string",
                "Additional curl options (e.g., '-I' for headers)",
            ))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let url = str_arg(args, "url")?;
        let mut argv = vec!["-sS".to_string()];
        argv.extend(command::split_options(opt_str_arg(args, "options")?));
        argv.push(url.to_string());
        Ok(command::output_text("curl", &argv, Self::TIMEOUT).await?.into())
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer_box: Option<AnswerBox>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AnswerBox {
    answer: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

/// Google search through SerpAPI
///
/// The API key comes from `SERPAPI_KEY` at call time unless one was given
/// explicitly.
pub struct WebSearchTool {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl WebSearchTool {
    const TIMEOUT: Duration = Duration::from_secs(15);
    const DEFAULT_RESULTS: u64 = 3;

    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: SERPAPI_ENDPOINT.into(),
            api_key: None,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn api_key(&self) -> Result<String, ToolError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("SERPAPI_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ToolError::failed(
                    "SERPAPI_KEY environment variable not set. Get a free key from https://serpapi.com/",
                )
            })
    }

    async fn search(&self, query: &str, num_results: u64, api_key: &str) -> Result<SearchResponse, ToolError> {
        let num = num_results.saturating_add(5).to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", api_key),
                ("num", num.as_str()),
                ("hl", "en"),
                ("gl", "us"),
            ])
            .timeout(Self::TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::Timeout(Self::TIMEOUT.as_secs())
                } else {
                    ToolError::failed(format!("Search failed - {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::failed(format!("Search failed - HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::failed(format!("Search failed - unreadable response: {e}")))
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

fn format_results(response: &SearchResponse, num_results: usize) -> String {
    let mut output = String::new();

    let overview = response
        .answer_box
        .as_ref()
        .and_then(|b| b.answer.as_deref().or(b.snippet.as_deref()));
    if let Some(overview) = overview {
        let _ = writeln!(output, "GOOGLE AI OVERVIEW:\n{overview}\n");
    }

    let shown = num_results.min(response.organic_results.len());
    let _ = writeln!(output, "TOP {shown} RESULTS:\n");

    for (i, result) in response.organic_results.iter().take(shown).enumerate() {
        let _ = writeln!(output, "{}. {}", i + 1, result.title.as_deref().unwrap_or("No title"));
        let _ = writeln!(output, "{}", result.snippet.as_deref().unwrap_or("No snippet"));
        let _ = writeln!(output, "Link: {}\n", result.link.as_deref().unwrap_or_default());
    }

    output.trim_end().to_string()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "web_search",
            "Search the web using Google, including the answer box when present. Useful for finding commands, frameworks, and solutions.",
        )
        .param(ParameterSchema::required(
            "query",
            "string",
            "Search query to find solutions, commands, or documentation",
        ))
        .param(ParameterSchema::optional(
            "num_results",
            "integer",
            "Number of top results to return (default: 3)",
        ))
    }

    async fn call(&self, args: &ToolArguments) -> Result<ToolOutput, ToolError> {
        let query = str_arg(args, "query")?;
        let num_results = opt_u64_arg(args, "num_results")?.unwrap_or(Self::DEFAULT_RESULTS);
        let api_key = self.api_key()?;

        let response = self.search(query, num_results, &api_key).await?;
        if let Some(error) = response.error.as_deref() {
            return Err(ToolError::failed(format!("Search failed - {error}")));
        }
        if response.organic_results.is_empty() {
            return Err(ToolError::failed("No search results found"));
        }

        debug!(query, results = response.organic_results.len(), "web search finished");
        let shown = usize::try_from(num_results).unwrap_or(usize::MAX);
        Ok(format_results(&response, shown).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svckit::args;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_web_search_formats_answer_box_and_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "rust async"))
            .and(query_param("api_key", "k"))
            .and(query_param("num", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer_box": {"snippet": "Rust has async/await."},
                "organic_results": [
                    {"title": "Async Book", "snippet": "Intro", "link": "https://a.example"},
                    {"title": "Tokio", "snippet": "Runtime", "link": "https://b.example"},
                    {"title": "Extra", "snippet": "More", "link": "https://c.example"}
                ]
            })))
            .mount(&server)
            .await;

        let tool = WebSearchTool::new().with_endpoint(server.uri()).with_api_key("k");
        let out = tool
            .call(&args(json!({"query": "rust async", "num_results": 2})))
            .await
            .unwrap();
        let text = out.render().unwrap();

        assert!(text.starts_with("GOOGLE AI OVERVIEW:\nRust has async/await."));
        assert!(text.contains("TOP 2 RESULTS:"));
        assert!(text.contains("1. Async Book"));
        assert!(text.contains("Link: https://b.example"));
        assert!(!text.contains("Extra"));
    }

    #[tokio::test]
    async fn test_web_search_huge_result_count_saturates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("num", u64::MAX.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [{"title": "Only", "snippet": "One", "link": "https://a.example"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = WebSearchTool::new().with_endpoint(server.uri()).with_api_key("k");
        let out = tool
            .call(&args(json!({"query": "q", "num_results": u64::MAX})))
            .await
            .unwrap();
        assert!(out.render().unwrap().contains("TOP 1 RESULTS:"));
    }

    #[tokio::test]
    async fn test_web_search_without_results_is_fault() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"organic_results": []})))
            .mount(&server)
            .await;

        let tool = WebSearchTool::new().with_endpoint(server.uri()).with_api_key("k");
        let err = tool.call(&args(json!({"query": "nothing"}))).await.unwrap_err();
        assert_eq!(err.to_string(), "No search results found");
    }

    #[tokio::test]
    async fn test_web_search_http_error_is_fault() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let tool = WebSearchTool::new().with_endpoint(server.uri()).with_api_key("bad");
        let err = tool.call(&args(json!({"query": "x"}))).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_curl_definition() {
        let def = CurlTool.definition();
        assert_eq!(def.name, "curl");
        assert_eq!(def.input_schema()["required"], json!(["url"]));
    }
}
