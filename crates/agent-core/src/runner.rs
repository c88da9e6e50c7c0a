//! Turn Runner
//!
//! Bridges entry points (CLI, HTTP) to the agent: takes a session and a
//! user utterance, runs the turn on its own task and hands back the event
//! stream.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{AgentError, Result};
use crate::event::{EventStream, TurnReply, fold_events};
use crate::message::Message;
use crate::reasoning::Agent;
use crate::session::{SessionRef, SessionRegistry};

const EVENT_BUFFER: usize = 32;

/// Runs agent turns against sessions from a shared registry
pub struct Runner {
    agent: Arc<Agent>,
    sessions: Arc<SessionRegistry>,
}

impl Runner {
    pub fn new(agent: Agent, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            agent: Arc::new(agent),
            sessions,
        }
    }

    pub const fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Start a turn. The session stays locked until the turn ends, so
    /// concurrent turns on one session run one after another.
    pub fn run(&self, session: &SessionRef, message: impl Into<String>) -> EventStream {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let agent = Arc::clone(&self.agent);
        let session = session.clone();
        let message = Message::user(message);

        let turn_tx = tx.clone();
        let turn_session = session.clone();
        let turn = tokio::spawn(async move {
            let mut guard = turn_session.lock_owned().await;
            agent.run_turn(&mut guard, message, &turn_tx).await
        });

        // The stream closes only after this task, so a turn that dies
        // without reporting still ends in an `Err` item.
        tokio::spawn(async move {
            let failure = match turn.await {
                Ok(Ok(())) => return,
                Ok(Err(e)) => e,
                Err(join) => AgentError::Other(format!("turn task aborted: {join}")),
            };
            tracing::error!(session_id = %session.id, error = %failure, "Turn failed");
            let _ = tx.send(Err(failure)).await;
        });

        Box::pin(ReceiverStream::new(rx))
    }

    /// Run a turn and fold it into a single reply
    pub async fn dispatch(&self, session: &SessionRef, message: impl Into<String>) -> Result<TurnReply> {
        fold_events(self.run(session, message)).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::reasoning::AgentBuilder;
    use crate::reasoning::tests::{CannedProvider, RecordTool};
    use crate::tool::{Tool, ToolCall, ToolContext, ToolResult, ToolSchema};

    struct PanicTool;

    #[async_trait]
    impl Tool for PanicTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "explode".into(),
                description: "Always panics".into(),
                parameters: Vec::new(),
                has_side_effects: false,
            }
        }

        async fn execute(&self, _call: &ToolCall, _ctx: &mut ToolContext<'_>) -> Result<ToolResult> {
            panic!("tool blew up");
        }
    }

    fn runner(replies: &[&str]) -> Runner {
        let agent = AgentBuilder::new()
            .provider(Arc::new(CannedProvider::new(replies)))
            .tool(RecordTool)
            .build()
            .unwrap();
        Runner::new(agent, Arc::new(SessionRegistry::new()))
    }

    fn record(value: i64) -> String {
        format!("```tool\n{{\"tool\": \"record\", \"arguments\": {{\"value\": {value}}}}}\n```")
    }

    #[tokio::test]
    async fn test_dispatch_folds_reply() {
        let first = record(4);
        let runner = runner(&[first.as_str(), "  You got 4.  "]);
        let session = runner.sessions().create("user1").await.unwrap();

        let reply = runner.dispatch(&session, "roll").await.unwrap();
        assert_eq!(reply.text, "You got 4.");
        assert_eq!(reply.tool_calls, vec![r#"Tool call: record({"value":4})"#]);
        assert_eq!(reply.author.as_deref(), Some("hello_world_agent"));
        assert_eq!(session.lock().await.state.rolls(), &[4]);
    }

    #[tokio::test]
    async fn test_dispatch_surfaces_runtime_error() {
        let looping = record(1);
        let agent = AgentBuilder::new()
            .provider(Arc::new(CannedProvider::new(&[looping.as_str(), looping.as_str()])))
            .tool(RecordTool)
            .max_iterations(1)
            .build()
            .unwrap();
        let runner = Runner::new(agent, Arc::new(SessionRegistry::new()));
        let session = runner.sessions().create("user1").await.unwrap();

        let err = runner.dispatch(&session, "loop").await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterations(1)));
    }

    #[tokio::test]
    async fn test_panicking_turn_is_an_error() {
        let explode = "```tool\n{\"tool\": \"explode\", \"arguments\": {}}\n```";
        let agent = AgentBuilder::new()
            .provider(Arc::new(CannedProvider::new(&[explode])))
            .tool(PanicTool)
            .build()
            .unwrap();
        let runner = Runner::new(agent, Arc::new(SessionRegistry::new()));
        let session = runner.sessions().create("user1").await.unwrap();

        let err = runner.dispatch(&session, "go").await.unwrap_err();
        assert!(matches!(err, AgentError::Other(msg) if msg.contains("aborted")));

        // The session is usable again once the failed turn is gone.
        let guard = session.lock().await;
        assert!(guard.state.rolls().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_turns_keep_every_roll() {
        // Each turn records one value then answers.
        let mut replies = Vec::new();
        for i in 0..8 {
            replies.push(record(i));
            replies.push("ok".to_string());
        }
        let refs: Vec<&str> = replies.iter().map(String::as_str).collect();
        let runner = Arc::new(runner(&refs));
        let session = runner.sessions().create("user1").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let runner = Arc::clone(&runner);
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                runner.dispatch(&session, "roll").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let guard = session.lock().await;
        assert_eq!(guard.state.rolls().len(), 8);
        let mut rolls = guard.state.rolls().to_vec();
        rolls.sort_unstable();
        assert_eq!(rolls, (0..8).collect::<Vec<i64>>());
    }
}
