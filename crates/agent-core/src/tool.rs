//! Tool System
//!
//! Tools are registered once at startup and invoked by the reasoning loop
//! on behalf of the model. Every invocation gets a [`ToolContext`] carrying
//! the calling session's state, so a tool can read and append to it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AgentError, Result};
use crate::session::{SessionId, SessionState};

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    #[serde(alias = "tool")]
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: Map<String, Value>,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: None,
        }
    }

    /// Fetch an argument by name
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// One-line rendering used in tool-call traces
    pub fn summary(&self) -> String {
        format!("{}({})", self.name, Value::Object(self.arguments.clone()))
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub output: String,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, integer, number, array, ...)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

impl ParameterSchema {
    /// A required parameter with no value restrictions
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            enum_values: None,
        }
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Whether tool writes to session state
    #[serde(default)]
    pub has_side_effects: bool,
}

/// What a tool sees of the session it runs in
pub struct ToolContext<'a> {
    pub session_id: &'a SessionId,
    pub user_id: &'a str,
    pub state: &'a mut SessionState,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall, ctx: &mut ToolContext<'_>) -> Result<ToolResult>;

    /// Validate arguments before execution (optional)
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !call.arguments.contains_key(&param.name) {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Registry for available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let schema = tool.schema();
        self.tools.insert(schema.name, Arc::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall, ctx: &mut ToolContext<'_>) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.validate(call)?;
        tool.execute(call, ctx).await
    }

    /// All tool schemas, sorted by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<_> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate system prompt section describing available tools
    pub fn generate_prompt_section(&self) -> String {
        let mut prompt = String::from("## Available Tools\n\n");
        prompt.push_str("Call a tool by responding with a JSON block:\n\n");
        prompt.push_str(
            "```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n",
        );
        prompt.push_str("Several tools may be called at once, one block per call.\n\n");

        for schema in self.schemas() {
            prompt.push_str(&format!("### {}\n", schema.name));
            prompt.push_str(&format!("{}\n", schema.description));

            if !schema.parameters.is_empty() {
                prompt.push_str("**Parameters:**\n");
                for param in &schema.parameters {
                    let required = if param.required { " (required)" } else { "" };
                    prompt.push_str(&format!(
                        "- `{}` ({}){}: {}\n",
                        param.name, param.param_type, required, param.description
                    ));
                }
            }
            prompt.push('\n');
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo the text back".into(),
                parameters: vec![ParameterSchema::required("text", "string", "Text to echo")],
                has_side_effects: false,
            }
        }

        async fn execute(&self, call: &ToolCall, ctx: &mut ToolContext<'_>) -> Result<ToolResult> {
            let text = call.arg("text").and_then(Value::as_str).unwrap_or_default();
            Ok(ToolResult::success("echo", format!("{}: {text}", ctx.user_id)))
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_registry_executes_with_context() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let id = SessionId::new();
        let mut state = SessionState::new();
        let mut ctx = ToolContext {
            session_id: &id,
            user_id: "user1",
            state: &mut state,
        };

        let call = ToolCall::new("echo", args(json!({"text": "hi"})));
        let result = registry.execute(&call, &mut ctx).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "user1: hi");
    }

    #[tokio::test]
    async fn test_missing_argument_and_unknown_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let id = SessionId::new();
        let mut state = SessionState::new();
        let mut ctx = ToolContext {
            session_id: &id,
            user_id: "u",
            state: &mut state,
        };

        let missing = ToolCall::new("echo", Map::new());
        assert!(matches!(
            registry.execute(&missing, &mut ctx).await,
            Err(AgentError::ToolValidation(_))
        ));

        let unknown = ToolCall::new("teleport", Map::new());
        assert!(matches!(
            registry.execute(&unknown, &mut ctx).await,
            Err(AgentError::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_tool_call_accepts_tool_key() {
        let call: ToolCall =
            serde_json::from_str(r#"{"tool": "roll_die", "arguments": {"sides": 6}}"#).unwrap();
        assert_eq!(call.name, "roll_die");
        assert_eq!(call.summary(), r#"roll_die({"sides":6})"#);
    }

    #[test]
    fn test_prompt_section_lists_parameters() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let section = registry.generate_prompt_section();
        assert!(section.contains("### echo"));
        assert!(section.contains("- `text` (string) (required): Text to echo"));
        assert_eq!(registry.names(), vec!["echo"]);
    }
}
