//! bond - terminal agent with tool calling
//!
//! Loads configuration, registers the built-in tools and runs the REPL.

mod repl;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bond_core::{AgentBuilder, LlmProvider, ToolRegistry};
use bond_runtime::{AnthropicConfig, AnthropicProvider};

use crate::repl::Repl;

const DEFAULT_SETTINGS: &str = "settings.json";

#[derive(Parser, Debug)]
#[command(name = "bond", version, about = "LLM agent with local tool calling")]
struct Args {
    /// settings.json with an `env` object (default: ./settings.json if present)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Model identifier, overrides ANTHROPIC_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Model calls allowed per request
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Output token cap per model call
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Replace the default system prompt
    #[arg(long)]
    system_prompt: Option<String>,

    /// Chat without tools
    #[arg(long)]
    no_tools: bool,
}

impl Args {
    fn settings_path(&self) -> Option<PathBuf> {
        self.settings
            .clone()
            .or_else(|| Path::new(DEFAULT_SETTINGS).is_file().then(|| DEFAULT_SETTINGS.into()))
    }

    /// Flags win over the settings file and environment
    fn apply(&self, config: &mut AnthropicConfig) -> bond_core::Result<()> {
        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
        if let Some(max) = self.max_tokens {
            config.max_tokens = max;
        }
        config.validate()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let settings = args.settings_path();
    let mut config = AnthropicConfig::load(settings.as_deref()).context("failed to load configuration")?;
    args.apply(&mut config).context("invalid command-line option")?;

    println!("Initializing Bond agent...");
    let provider = Arc::new(AnthropicProvider::from_config(config.clone())?);
    if let Err(e) = provider.health_check().await {
        tracing::warn!("provider health check failed: {e}");
    }

    let mut tools = ToolRegistry::new();
    if !args.no_tools {
        bond_tools::register_all(&mut tools)?;
    }
    tracing::info!(count = tools.len(), "registered tools");

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .model(config.model.clone())
        .max_tokens(config.max_tokens)
        .max_iterations(config.max_iterations)
        .use_tools(!args.no_tools)
        .system_prompt(
            args.system_prompt
                .clone()
                .unwrap_or_else(|| bond_tools::BOND_SYSTEM_PROMPT.to_string()),
        )
        .build()?;

    tracing::info!(
        session = %agent.session_id(),
        model = %config.model,
        base_url = %config.base_url,
        "agent ready"
    );

    Repl::new(agent).run().await
}
