//! # agent-runtime
//!
//! Model backends for the hello agent.
//!
//! ## Providers
//!
//! - **Ollama** (default feature): local inference via Ollama
//! - **Scripted**: replays canned completions, no model required
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::OllamaProvider;
//!
//! let provider = Arc::new(OllamaProvider::from_env());
//! let agent = AgentBuilder::new().provider(provider).build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;
pub mod scripted;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};
pub use scripted::ScriptedProvider;

// Re-export core types for convenience
pub use agent_core::{AgentError, LlmProvider, Result};
