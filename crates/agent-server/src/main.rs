//! hello-agent HTTP Server
//!
//! Axum-based chat API in front of the hello agent. Each chat request is
//! dispatched as one turn against a server-side session.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, AgentConfig, LlmProvider, Runner, SessionRegistry, ToolRegistry};
use agent_runtime::OllamaProvider;

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before anything reads it
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // Initialize LLM provider
    let provider = Arc::new(OllamaProvider::from_env());

    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Ollama");
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - chat requests will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    let mut tools = ToolRegistry::new();
    hello_tools::register_all(&mut tools);

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let provider: Arc<dyn LlmProvider> = provider;
    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .config(AgentConfig::from_env())
        .instructions(hello_tools::HELLO_AGENT_PROMPT)
        .build()?;

    let sessions = config
        .max_sessions
        .map_or_else(SessionRegistry::new, SessionRegistry::with_max_sessions);

    let state = AppState {
        runner: Arc::new(Runner::new(agent, Arc::new(sessions))),
        config: Arc::new(config),
    };

    let addr = state.config.bind_addr.clone();
    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 hello-agent server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /               - Liveness");
    tracing::info!("  GET    /health         - Health check");
    tracing::info!("  POST   /create_session - Create a session");
    tracing::info!("  POST   /chat           - Send message");
    tracing::info!("  GET    /sessions/{{id}}  - Inspect a session");
    tracing::info!("  DELETE /sessions/{{id}}  - Delete a session");

    axum::serve(listener, app).await?;

    Ok(())
}
