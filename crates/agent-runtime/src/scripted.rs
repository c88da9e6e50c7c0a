//! Scripted Provider
//!
//! Replays a fixed list of completions in order. Used to drive the agent
//! without a model server, in tests and offline demos.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use agent_core::{
    error::{AgentError, Result},
    message::Message,
    provider::{Completion, GenerationOptions, LlmProvider, ModelInfo},
};
use async_trait::async_trait;

/// Provider that answers from a script
pub struct ScriptedProvider {
    script: Mutex<VecDeque<String>>,
    fallback: String,
    failure: Option<String>,
}

impl ScriptedProvider {
    /// Replay `replies` in order, then repeat the fallback
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fallback: "I have nothing more to say.".into(),
            failure: None,
        }
    }

    /// A provider whose every completion fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: String::new(),
            failure: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.failure.is_none())
    }

    async fn complete(
        &self,
        _messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        if let Some(reason) = &self.failure {
            return Err(AgentError::Provider(reason.clone()));
        }

        let reply = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        Ok(Completion::text(reply, options.model.clone()))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "scripted".into(),
        }])
    }
}
