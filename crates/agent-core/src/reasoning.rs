//! Reasoning Loop
//!
//! ReAct-style loop: ask the model, run any tools it requested against the
//! session, feed the results back, repeat until the model answers in prose.
//! Everything the model says or calls is emitted as an [`Event`].

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{AgentError, Result};
use crate::event::{Event, Part};
use crate::message::Message;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::session::Session;
use crate::tool::{ToolCall, ToolContext, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Author name on emitted events
    pub name: String,

    /// Instructions placed at the head of every conversation
    pub instructions: String,

    /// Maximum reasoning iterations per turn
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to the instructions
    pub inject_tool_descriptions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "hello_world_agent".into(),
            instructions: DEFAULT_INSTRUCTIONS.into(),
            max_iterations: 10,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
        }
    }
}

impl AgentConfig {
    /// Read `AGENT_NAME`, `AGENT_MODEL` and `AGENT_MAX_ITERATIONS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup("AGENT_NAME").filter(|v| !v.is_empty()) {
            config.name = name;
        }
        if let Some(model) = lookup("AGENT_MODEL").filter(|v| !v.is_empty()) {
            config.generation.model = model;
        }
        if let Some(max) = lookup("AGENT_MAX_ITERATIONS").and_then(|v| v.parse().ok()) {
            config.max_iterations = max;
        }

        config
    }
}

const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant. Use the available tools when they help.";

/// Model output split into prose and tool calls
#[derive(Debug, Default, PartialEq)]
pub struct ParsedResponse {
    pub prose: String,
    pub calls: Vec<ToolCall>,
}

const TOOL_FENCE: &str = "```tool";
const FENCE_END: &str = "```";

/// Pull every fenced ```` ```tool ```` block out of a completion.
///
/// Blocks that fail to parse stay in the prose. When there are no fenced
/// blocks, a bare JSON object carrying a `"tool"` key is accepted instead.
pub fn parse_response(content: &str) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();
    let mut rest = content;

    while let Some(start) = rest.find(TOOL_FENCE) {
        let after_marker = &rest[start + TOOL_FENCE.len()..];
        let Some(end) = after_marker.find(FENCE_END) else {
            break;
        };

        let block = &rest[..start + TOOL_FENCE.len() + end + FENCE_END.len()];
        match serde_json::from_str::<ToolCall>(after_marker[..end].trim()) {
            Ok(call) => {
                parsed.prose.push_str(&rest[..start]);
                parsed.calls.push(call);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed tool block");
                parsed.prose.push_str(block);
            }
        }
        rest = &after_marker[end + FENCE_END.len()..];
    }
    parsed.prose.push_str(rest);

    if parsed.calls.is_empty() {
        if let Some((prose, call)) = parse_inline_tool_call(content) {
            parsed.prose = prose;
            parsed.calls.push(call);
        }
    }

    for call in &mut parsed.calls {
        if call.id.is_none() {
            call.id = Some(uuid::Uuid::new_v4().to_string());
        }
    }

    parsed
}

fn parse_inline_tool_call(content: &str) -> Option<(String, ToolCall)> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    let call = serde_json::from_str::<ToolCall>(&content[start..=end]).ok()?;
    let prose = format!("{}{}", &content[..start], &content[end + 1..]);
    Some((prose, call))
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.instructions.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Run one user turn against `session`, sending events to `events`.
    ///
    /// Returns early without error if the receiving side goes away.
    pub async fn run_turn(
        &self,
        session: &mut Session,
        input: Message,
        events: &mpsc::Sender<Result<Event>>,
    ) -> Result<()> {
        if !session.conversation.has_system_prompt() {
            session
                .conversation
                .set_system_prompt(self.build_system_prompt());
        }
        session.conversation.push(input);
        session.touch();

        for iteration in 1..=self.config.max_iterations {
            let completion = self
                .provider
                .complete(session.conversation.messages(), &self.config.generation)
                .await?;

            session
                .conversation
                .push(Message::assistant(&completion.content));

            let parsed = parse_response(&completion.content);
            tracing::debug!(
                session_id = %session.id,
                iteration,
                tool_calls = parsed.calls.len(),
                total_tokens = completion.usage.as_ref().map(|u| u.total_tokens),
                "Model responded"
            );

            let mut parts = Vec::with_capacity(parsed.calls.len() + 1);
            if !parsed.prose.trim().is_empty() {
                parts.push(Part::text(parsed.prose.clone()));
            }
            parts.extend(parsed.calls.iter().cloned().map(Part::tool_call));

            if !parts.is_empty() && events.send(Ok(Event::new(&self.config.name, parts))).await.is_err() {
                tracing::debug!(session_id = %session.id, "Event receiver dropped, ending turn");
                return Ok(());
            }

            if parsed.calls.is_empty() {
                session.touch();
                return Ok(());
            }

            for call in &parsed.calls {
                let result = self.execute_tool(call, session).await;
                session.conversation.push(Message::tool(
                    Self::format_tool_result(&result),
                    call.id.clone(),
                ));
            }
            session.touch();
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Execute a tool call; failures become failed results for the model
    async fn execute_tool(&self, call: &ToolCall, session: &mut Session) -> ToolResult {
        tracing::info!(session_id = %session.id, tool = %call.name, "Executing tool");

        let mut ctx = ToolContext {
            session_id: &session.id,
            user_id: &session.user_id,
            state: &mut session.state,
        };

        match self.tools.execute(call, &mut ctx).await {
            Ok(mut result) => {
                result.id.clone_from(&call.id);
                result
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                let mut result = ToolResult::failure(&call.name, format!("Error: {e}"));
                result.id.clone_from(&call.id);
                result
            }
        }
    }

    /// Format tool result for conversation
    fn format_tool_result(result: &ToolResult) -> String {
        if result.success {
            format!("[Tool '{}' returned]\n{}", result.name, result.output)
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.config.instructions = instructions.into();
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::message::Role;
    use crate::provider::{Completion, ModelInfo};
    use crate::tool::{ParameterSchema, Tool, ToolSchema};

    /// Replays canned completions, then answers "done"
    pub struct CannedProvider {
        replies: Mutex<VecDeque<String>>,
        pub seen: Mutex<Vec<Vec<Message>>>,
    }

    impl CannedProvider {
        pub fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| (*r).to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "done".into());
            Ok(Completion::text(reply, options.model.clone()))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    /// Appends its `value` argument to the session's rolls
    pub struct RecordTool;

    #[async_trait]
    impl Tool for RecordTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "record".into(),
                description: "Record a number".into(),
                parameters: vec![ParameterSchema::required("value", "integer", "Number")],
                has_side_effects: true,
            }
        }

        async fn execute(&self, call: &ToolCall, ctx: &mut ToolContext<'_>) -> Result<ToolResult> {
            let value = call.arg("value").and_then(Value::as_i64).unwrap_or_default();
            ctx.state.record_roll(value);
            Ok(ToolResult::success("record", value.to_string()))
        }
    }

    fn agent(provider: Arc<CannedProvider>, max_iterations: usize) -> Agent {
        AgentBuilder::new()
            .provider(provider)
            .tool(RecordTool)
            .name("tester")
            .max_iterations(max_iterations)
            .build()
            .unwrap()
    }

    async fn run(agent: &Agent, session: &mut Session, text: &str) -> (Result<()>, Vec<Event>) {
        let (tx, mut rx) = mpsc::channel(64);
        let result = agent.run_turn(session, Message::user(text), &tx).await;
        drop(tx);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event.unwrap());
        }
        (result, events)
    }

    #[test]
    fn test_parse_fenced_tool_calls() {
        let content = r#"Let me roll.
```tool
{"tool": "roll_die", "arguments": {"sides": 6}}
```
And check.
```tool
{"tool": "check_prime", "arguments": {"nums": [7]}}
```"#;

        let parsed = parse_response(content);
        assert_eq!(parsed.calls.len(), 2);
        assert_eq!(parsed.calls[0].name, "roll_die");
        assert_eq!(parsed.calls[1].name, "check_prime");
        assert!(parsed.calls.iter().all(|c| c.id.is_some()));
        assert_eq!(parsed.prose, "Let me roll.\n\nAnd check.\n");
    }

    #[test]
    fn test_parse_inline_and_plain() {
        let parsed = parse_response(r#"{"tool": "roll_die", "arguments": {"sides": 20}}"#);
        assert_eq!(parsed.calls.len(), 1);
        assert!(parsed.prose.is_empty());

        let plain = parse_response("You rolled a 3.");
        assert!(plain.calls.is_empty());
        assert_eq!(plain.prose, "You rolled a 3.");
    }

    #[test]
    fn test_malformed_block_stays_prose() {
        let content = "```tool\nnot json\n```";
        let parsed = parse_response(content);
        assert!(parsed.calls.is_empty());
        assert_eq!(parsed.prose, content);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = AgentConfig::from_lookup(|key| match key {
            "AGENT_MODEL" => Some("qwen3".into()),
            "AGENT_MAX_ITERATIONS" => Some("4".into()),
            _ => None,
        });
        assert_eq!(config.generation.model, "qwen3");
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.name, "hello_world_agent");
    }

    #[tokio::test]
    async fn test_turn_runs_tool_and_answers() {
        let provider = Arc::new(CannedProvider::new(&[
            "```tool\n{\"tool\": \"record\", \"arguments\": {\"value\": 5}}\n```",
            "Recorded 5.",
        ]));
        let agent = agent(provider.clone(), 5);
        let mut session = Session::new("user1");

        let (result, events) = run(&agent, &mut session, "record five").await;
        result.unwrap();

        assert_eq!(session.state.rolls(), &[5]);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0].parts[0], Part::ToolCall { call } if call.name == "record"));
        assert_eq!(events[1].parts, vec![Part::text("Recorded 5.")]);
        assert_eq!(events[1].author, "tester");

        // system, user, assistant(tool), tool result, assistant(answer)
        let roles: Vec<Role> = session.conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::Assistant]
        );
        assert!(session.conversation.messages()[0].content.contains("### record"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let provider = Arc::new(CannedProvider::new(&[
            "```tool\n{\"tool\": \"teleport\", \"arguments\": {}}\n```",
            "Sorry, I cannot do that.",
        ]));
        let agent = agent(provider.clone(), 5);
        let mut session = Session::new("user1");

        let (result, _) = run(&agent, &mut session, "teleport me").await;
        result.unwrap();

        let tool_msg = &session.conversation.messages()[3];
        assert_eq!(tool_msg.role, Role::Tool);
        assert!(tool_msg.content.starts_with("[Tool 'teleport' failed]"));
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let looping = "```tool\n{\"tool\": \"record\", \"arguments\": {\"value\": 1}}\n```";
        let provider = Arc::new(CannedProvider::new(&[looping, looping, looping]));
        let agent = agent(provider, 2);
        let mut session = Session::new("user1");

        let (result, _) = run(&agent, &mut session, "loop").await;
        assert!(matches!(result, Err(AgentError::MaxIterations(2))));
        assert_eq!(session.state.rolls(), &[1, 1]);
    }

    #[tokio::test]
    async fn test_history_carries_across_turns() {
        let provider = Arc::new(CannedProvider::new(&["first", "second"]));
        let agent = agent(provider.clone(), 3);
        let mut session = Session::new("user1");

        run(&agent, &mut session, "one").await.0.unwrap();
        run(&agent, &mut session, "two").await.0.unwrap();

        let seen = provider.seen.lock().unwrap();
        let second_call = &seen[1];
        assert_eq!(second_call.iter().filter(|m| m.role == Role::System).count(), 1);
        assert_eq!(second_call.last().unwrap().content, "two");
        assert!(second_call.iter().any(|m| m.content == "first"));
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(matches!(
            AgentBuilder::new().build(),
            Err(AgentError::Config(_))
        ));
    }
}
