//! hello-agent terminal chat
//!
//! One session, one user, one turn at a time. Logs go to stderr so stdout
//! carries only the conversation.

mod config;
mod display;
mod repl;

use std::io;
use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, AgentConfig, LlmProvider, Runner, SessionRegistry, ToolRegistry};
use agent_runtime::OllamaProvider;

use crate::config::CliConfig;
use crate::display::elapsed_secs;
use crate::repl::run_prompt;

const RULE: &str = "------------------------------------";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = CliConfig::from_env();

    let provider = Arc::new(OllamaProvider::from_env());
    if !provider.health_check().await.unwrap_or(false) {
        tracing::warn!("Ollama not available - make sure it is running: ollama serve");
    }

    let mut tools = ToolRegistry::new();
    hello_tools::register_all(&mut tools);

    let provider: Arc<dyn LlmProvider> = provider;
    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .config(AgentConfig::from_env())
        .instructions(hello_tools::HELLO_AGENT_PROMPT)
        .build()?;

    let runner = Runner::new(agent, Arc::new(SessionRegistry::new()));
    let session = runner.sessions().create(&config.user_id).await?;
    let mut stdout = io::stdout();

    let start = Utc::now();
    println!("Start time: {}", start.to_rfc3339());
    println!("{RULE}");

    if let Some(greeting) = &config.greeting {
        run_prompt(&runner, &session, greeting, &mut stdout).await?;
    }

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("User: ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(input) {
                    tracing::debug!(error = %e, "Could not record history entry");
                }
                run_prompt(&runner, &session, input, &mut stdout).await?;
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "Exiting at user request (Ctrl+C).".yellow());
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "End of input. Exiting.".bright_green());
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let end = Utc::now();
    println!("{RULE}");
    println!("End time: {}", end.to_rfc3339());
    println!("Total time: {:.3}s", elapsed_secs(start, end));

    Ok(())
}
