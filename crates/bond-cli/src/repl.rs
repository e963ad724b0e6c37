//! Interactive read-eval-print loop

use std::fmt::Write as _;

use bond_core::{Agent, Message};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

const RULE_WIDTH: usize = 60;

/// One line of user input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Reset,
    Context,
    Empty,
    Prompt(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => Self::Empty,
            "/help" => Self::Help,
            "/exit" | "/quit" => Self::Exit,
            "/reset" => Self::Reset,
            "/context" => Self::Context,
            _ => Self::Prompt(line.to_string()),
        }
    }
}

pub fn banner() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Bond - LLM Agent with Tool Calling");
    let _ = writeln!(out, "{}\n", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Available tool categories:");
    let _ = writeln!(out, "  • Basic: ping, echo, calculate, get_system_info");
    let _ = writeln!(out, "  • Files: ls, pwd, cat, grep, find, head, tail, wc, tree");
    let _ = writeln!(out, "  • System: whoami, uname, df, ps, env, which");
    let _ = writeln!(out, "  • Network: curl, web_search");
    let _ = writeln!(out, "  • GitHub: gh (repos, issues, PRs, releases)");
    let _ = writeln!(out, "  • Advanced: bash (execute arbitrary commands)\n");
    let _ = writeln!(out, "Type '/help' for commands, '/exit' to quit");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    out
}

pub fn help() -> String {
    let mut out = String::from("\nCommands:\n");
    let _ = writeln!(out, "  /help      - Show this help message");
    let _ = writeln!(out, "  /exit      - Exit the agent (also /quit)");
    let _ = writeln!(out, "  /reset     - Clear conversation context");
    let _ = writeln!(out, "  /context   - Show conversation history");
    let _ = writeln!(out, "\nExamples:");
    let _ = writeln!(out, "  > ping 8.8.8.8");
    let _ = writeln!(out, "  > what's my system info?");
    let _ = writeln!(out, "  > calculate 10 * 5");
    let _ = writeln!(out, "\nCtrl-C cancels a running request; at the prompt it exits.");
    out
}

/// Numbered `[role] content` listing of the conversation
pub fn format_context(messages: &[Message]) -> String {
    let mut out = String::from("\nConversation Context:\n");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for (i, message) in messages.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}] {}", i + 1, message.role, message.summary());
    }
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    out
}

pub struct Repl {
    agent: Agent,
}

impl Repl {
    pub const fn new(agent: Agent) -> Self {
        Self { agent }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        stdout.write_all(banner().as_bytes()).await?;

        loop {
            stdout.write_all(b"\n> ").await?;
            stdout.flush().await?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                println!("\nGoodbye!");
                return Ok(());
            };

            match Command::parse(&line) {
                Command::Empty => {}
                Command::Help => print!("{}", help()),
                Command::Exit => {
                    println!("Goodbye!");
                    return Ok(());
                }
                Command::Reset => {
                    self.agent.reset_context();
                    println!("Context cleared.");
                }
                Command::Context => print!("{}", format_context(&self.agent.context())),
                Command::Prompt(input) => self.ask(&input).await,
            }
        }
    }

    /// Run one request; Ctrl-C cancels it and returns to the prompt
    async fn ask(&mut self, input: &str) {
        let cancel = CancellationToken::new();
        let request = self.agent.process_with_cancel(input, &cancel);
        tokio::pin!(request);

        let result = loop {
            tokio::select! {
                result = &mut request => break result,
                _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                    tracing::info!("cancelling in-flight request");
                    cancel.cancel();
                }
            }
        };

        match result {
            Ok(reply) => println!("{reply}"),
            Err(e) => {
                tracing::warn!(error = %e, "request failed");
                println!("Error: {}", e.user_message());
            }
        }
    }
}
