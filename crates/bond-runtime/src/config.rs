//! Runtime configuration
//!
//! Values come from a `settings.json` file (its `env` object), overridden by
//! process environment variables. Loading `.env` is left to the binary.
//!
//! ```json
//! { "env": { "ANTHROPIC_AUTH_TOKEN": "...", "ANTHROPIC_MODEL": "..." } }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use bond_core::error::{AgentError, Result};
use bond_core::provider::{DEFAULT_MODEL, GenerationOptions};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.z.ai/api/anthropic";
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000_000;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_MAX_ITERATIONS: usize = 25;

/// Anthropic endpoint configuration
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API key / bearer token
    pub auth_token: String,

    /// Endpoint root, without `/v1/messages`
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Whole-request HTTP timeout
    pub timeout: Duration,

    /// Output token cap per model call
    pub max_tokens: u32,

    /// Model calls allowed per user turn
    pub max_iterations: usize,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    env: HashMap<String, Value>,
}

impl AnthropicConfig {
    /// Build from process environment variables only
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a settings file, with environment variables taking precedence
    pub fn from_settings_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_settings_and_lookup(path, |key| std::env::var(key).ok())
    }

    /// Build from a settings file overlaid by `env`; a blank `env` value
    /// does not hide the file's
    pub fn from_settings_and_lookup(
        path: impl AsRef<Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let settings = read_settings(path.as_ref())?;
        Self::from_lookup(|key| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| settings.get(key).cloned())
        })
    }

    /// Use the settings file when given, the environment otherwise
    pub fn load(settings: Option<&Path>) -> Result<Self> {
        match settings {
            Some(path) => Self::from_settings_file(path),
            None => Self::from_env(),
        }
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let auth_token = get("ANTHROPIC_AUTH_TOKEN")
            .or_else(|| get("ANTHROPIC_API_KEY"))
            .ok_or_else(|| {
                AgentError::Config("ANTHROPIC_AUTH_TOKEN (or ANTHROPIC_API_KEY) is required".into())
            })?;

        let base_url = get("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let timeout_ms = parse_or(get("API_TIMEOUT_MS"), "API_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        let max_tokens = parse_or(get("BOND_MAX_TOKENS"), "BOND_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        let max_iterations = parse_or(
            get("BOND_MAX_ITERATIONS"),
            "BOND_MAX_ITERATIONS",
            DEFAULT_MAX_ITERATIONS,
        )?;

        let config = Self {
            auth_token,
            base_url,
            model: get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            timeout: Duration::from_millis(timeout_ms),
            max_tokens,
            max_iterations,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the endpoint would refuse
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AgentError::Config(format!(
                "ANTHROPIC_BASE_URL must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.max_tokens == 0 {
            return Err(AgentError::Config("BOND_MAX_TOKENS must be positive".into()));
        }
        if self.max_iterations == 0 {
            return Err(AgentError::Config("BOND_MAX_ITERATIONS must be positive".into()));
        }
        Ok(())
    }

    /// Generation options for the agent
    pub fn generation(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            ..GenerationOptions::default()
        }
    }
}

fn read_settings(path: &Path) -> Result<HashMap<String, String>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AgentError::Config(format!("cannot read settings file {}: {e}", path.display()))
    })?;
    let settings: SettingsFile = serde_json::from_str(&raw).map_err(|e| {
        AgentError::Config(format!("invalid JSON in {}: {e}", path.display()))
    })?;

    Ok(settings
        .env
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T> {
    raw.map_or(Ok(default), |v| {
        v.parse()
            .map_err(|_| AgentError::Config(format!("{key} must be a positive number, got '{v}'")))
    })
}
