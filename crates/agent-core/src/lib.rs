//! # agent-core
//!
//! Tool contract, session registry and turn runner for a small tool-using
//! chat agent.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Runner                                                      │
//! │  ┌────────────────┐  ┌─────────────┐  ┌──────────────────┐   │
//! │  │ SessionRegistry│  │    Agent    │──│   LlmProvider    │   │
//! │  │ (per-session   │──│  reasoning  │  │   (Strategy)     │   │
//! │  │  mutex)        │  │    loop     │──│   ToolRegistry   │   │
//! │  └────────────────┘  └─────────────┘  └──────────────────┘   │
//! │            │                │                                │
//! │            └──── EventStream ──► fold_events ──► TurnReply   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entry points resolve a session, call [`Runner::run`] (or
//! [`Runner::dispatch`]) and render the folded [`TurnReply`].

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod runner;
pub mod session;
pub mod tool;

pub use error::{AgentError, Result};
pub use event::{Event, EventStream, Part, TurnReply, fold_events};
pub use message::{Message, Role};
pub use provider::LlmProvider;
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use runner::Runner;
pub use session::{Session, SessionId, SessionRef, SessionRegistry, SessionResolution, SessionState};
pub use tool::{Tool, ToolCall, ToolContext, ToolRegistry, ToolResult, ToolSchema};
