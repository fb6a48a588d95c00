//! Ollama-backed decision oracle.
//!
//! Talks to a local Ollama server via its native `/api/chat` endpoint with
//! the tool definitions for heating control. Models that ignore the native
//! tool API are handled by the narrow text fallback in [`crate::parser`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use hearth_core::action::AgentAction;
use hearth_core::model::MessageType;

use crate::parser::extract_tool_calls;
use crate::prompt;
use crate::{DecisionContext, DecisionOracle, OracleError, OracleInput};

/// Ollama connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OllamaConfig {
    /// Ollama endpoint (default: http://localhost:11434).
    pub endpoint: String,
    /// Model name, e.g. "qwen3:4b".
    pub model: String,
    /// Request timeout in seconds (default: 180).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    180
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            endpoint: hearth_core::config::endpoints::OLLAMA.to_string(),
            model: model.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(hearth_core::config::models::OLLAMA_DEFAULT)
    }
}

/// Decision oracle backed by an Ollama-served model.
pub struct OllamaOracle {
    config: OllamaConfig,
    client: Client,
}

impl OllamaOracle {
    /// Create a new oracle.
    pub fn new(config: OllamaConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| OracleError::Call(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn build_messages(input: &OracleInput) -> Vec<ChatMessage> {
        let (system, user) = match &input.context {
            DecisionContext::Cycle => (
                prompt::SYSTEM_PROMPT.to_string(),
                prompt::decision_prompt(input),
            ),
            DecisionContext::Message(message) => (
                prompt::MESSAGE_SYSTEM_PROMPT.to_string(),
                prompt::message_prompt(message, input),
            ),
        };

        vec![
            ChatMessage {
                role: "system".to_string(),
                content: system,
            },
            ChatMessage {
                role: "user".to_string(),
                content: user,
            },
        ]
    }
}

#[async_trait]
impl DecisionOracle for OllamaOracle {
    async fn decide(&self, input: &OracleInput) -> Result<Vec<AgentAction>, OracleError> {
        let url = format!("{}/api/chat", self.config.endpoint);
        let request = ChatRequest {
            model: &self.config.model,
            messages: Self::build_messages(input),
            stream: false,
            tools: tool_definitions(),
        };

        tracing::debug!(model = %self.config.model, "invoking decision model");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Call(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OracleError::Call(e.to_string()))?;
        if !status.is_success() {
            return Err(OracleError::Call(format!(
                "Ollama API error {}: {}",
                status.as_u16(),
                body
            )));
        }

        let chat: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| OracleError::MalformedOutput(e.to_string()))?;

        let mut actions = Vec::new();
        if !chat.message.tool_calls.is_empty() {
            tracing::debug!(count = chat.message.tool_calls.len(), "native tool calls received");
            for call in &chat.message.tool_calls {
                if let Some(action) = action_from_tool(&call.function.name, &call.function.arguments)
                {
                    actions.push(action);
                }
            }
        } else {
            // Fallback: the model may have emitted the calls as JSON text.
            for call in extract_tool_calls(&chat.message.content) {
                if let Some(action) = action_from_tool(&call.name, &call.arguments) {
                    actions.push(action);
                }
            }
        }

        Ok(actions)
    }
}

/// Map one tool invocation into a typed action. Unknown tools or missing
/// required arguments are skipped with a warning, not treated as errors.
pub(crate) fn action_from_tool(name: &str, arguments: &Value) -> Option<AgentAction> {
    let reason = arg_str(arguments, &["reason"]);
    match name {
        "turn_on_heating" => {
            let room_id = require_arg(name, arguments, &["roomId", "room_id"])?;
            Some(AgentAction::EnableHeating { room_id, reason })
        }
        "turn_off_heating" => {
            let room_id = require_arg(name, arguments, &["roomId", "room_id"])?;
            Some(AgentAction::DisableHeating { room_id, reason })
        }
        "send_message" => {
            let to = require_arg(name, arguments, &["to_agent", "to"])?;
            let content = require_arg(name, arguments, &["message", "content"])?;
            let kind = arg_str(arguments, &["type"])
                .map(|t| MessageType::parse_or_inform(&t))
                .unwrap_or(MessageType::Inform);
            Some(AgentAction::SendMessage { to, content, kind })
        }
        other => {
            tracing::warn!(tool = %other, "model invoked unknown tool, skipping");
            None
        }
    }
}

fn arg_str(arguments: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| arguments.get(k))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn require_arg(tool: &str, arguments: &Value, keys: &[&str]) -> Option<String> {
    let value = arg_str(arguments, keys);
    if value.is_none() {
        tracing::warn!(tool = %tool, key = %keys[0], "tool call missing required argument, skipping");
    }
    value
}

fn tool_definitions() -> Vec<ToolSpec> {
    vec![
        ToolSpec::function(
            "turn_on_heating",
            "Turn heating on for a specific room. Use when the room is too cold or a meeting is about to start there.",
            json!({
                "type": "object",
                "properties": {
                    "roomId": {"type": "string", "description": "Room id, e.g. 'room_208'"},
                    "reason": {"type": "string", "description": "Why heating is being enabled"}
                },
                "required": ["roomId"]
            }),
        ),
        ToolSpec::function(
            "turn_off_heating",
            "Turn heating off for a specific room. Use when the room is warm enough or unoccupied.",
            json!({
                "type": "object",
                "properties": {
                    "roomId": {"type": "string", "description": "Room id, e.g. 'room_208'"},
                    "reason": {"type": "string", "description": "Why heating is being disabled"}
                },
                "required": ["roomId"]
            }),
        ),
        ToolSpec::function(
            "send_message",
            "Send a natural-language message to another agent, or 'broadcast' for all agents.",
            json!({
                "type": "object",
                "properties": {
                    "to_agent": {"type": "string", "description": "Target agent id, e.g. 'LightAgent', or 'broadcast'"},
                    "message": {"type": "string", "description": "Message content"},
                    "type": {"type": "string", "description": "REQUEST, INFORM, QUERY or RESPONSE (default INFORM)"}
                },
                "required": ["to_agent", "message"]
            }),
        ),
    ]
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    tools: Vec<ToolSpec>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ToolSpec {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionSpec,
}

impl ToolSpec {
    fn function(name: &'static str, description: &'static str, parameters: Value) -> Self {
        Self {
            kind: "function",
            function: FunctionSpec {
                name,
                description,
                parameters,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct FunctionSpec {
    name: &'static str,
    description: &'static str,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
    #[serde(default)]
    #[allow(dead_code)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}
