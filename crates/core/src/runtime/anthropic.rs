//! # Anthropic Runtime
//!
//! Production [`AgentRuntime`] over the Claude Messages API. An agent here is
//! an instruction-bound entry in a name-keyed table: `start` registers it,
//! `send` runs one exchange (with a bounded tool-use loop for agents that
//! declare tools), `stop` removes it. The runtime holds no conversation
//! state between exchanges - agents live for exactly one request/response.

use crate::error::RuntimeError;
use crate::runtime::search;
use crate::runtime::{AgentRuntime, AgentSpec, ToolBinding};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Anthropic API version header value.
const API_VERSION: &str = "2023-06-01";

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default model for all agent roles.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Upper bound on tool-use rounds within a single exchange.
const MAX_TOOL_ROUNDS: usize = 8;

// === Wire Types ===

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Vec<Block>,
}

impl WireMessage {
    fn user_text(text: &str) -> Self {
        Self {
            role: "user",
            content: vec![Block::Text {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
struct WireTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<Block>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

// === Configuration ===

/// Connection settings for the Anthropic runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// API key sent as `x-api-key`.
    pub api_key: String,
    /// Base URL, overridable for proxies and compatible endpoints.
    pub base_url: String,
    /// Completion budget per model turn.
    pub max_tokens: u32,
}

impl RuntimeConfig {
    /// Create a configuration with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 4096,
        }
    }

    /// Read `ANTHROPIC_API_KEY` (required) and `ANTHROPIC_BASE_URL`
    /// (optional) from the environment.
    pub fn from_env() -> Result<Self, RuntimeError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            RuntimeError::Unavailable("ANTHROPIC_API_KEY not set".to_string())
        })?;
        let base_url = std::env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url,
            max_tokens: 4096,
        })
    }
}

// === Runtime ===

/// Claude-backed agent runtime.
pub struct AnthropicRuntime {
    client: Client,
    config: RuntimeConfig,
    agents: Mutex<HashMap<String, AgentSpec>>,
}

impl AnthropicRuntime {
    /// Build a runtime from an explicit configuration.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let client = Client::builder()
            .build()
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            config,
            agents: Mutex::new(HashMap::new()),
        })
    }

    /// Build a runtime from environment variables.
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::new(RuntimeConfig::from_env()?)
    }

    fn lookup(&self, name: &str) -> Result<AgentSpec, RuntimeError> {
        let agents = self
            .agents
            .lock()
            .map_err(|_| RuntimeError::Failed("agent table lock poisoned".to_string()))?;
        agents
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::Failed(format!("unknown agent: {name}")))
    }

    fn tool_definitions(spec: &AgentSpec) -> Option<Vec<WireTool>> {
        if spec.tools.is_empty() {
            return None;
        }
        let tools = spec
            .tools
            .iter()
            .map(|binding| match binding {
                ToolBinding::WebSearch => WireTool {
                    name: "web_search".to_string(),
                    description:
                        "Search the web. Returns results with titles, URLs and snippets."
                            .to_string(),
                    input_schema: json!({
                        "type": "object",
                        "properties": {
                            "query": { "type": "string", "description": "Search query" },
                            "max_results": { "type": "integer", "description": "Maximum results (default 5)" }
                        },
                        "required": ["query"]
                    }),
                },
            })
            .collect();
        Some(tools)
    }

    async fn post_messages(
        &self,
        spec: &AgentSpec,
        messages: &[WireMessage],
    ) -> Result<MessagesResponse, RuntimeError> {
        let request = MessagesRequest {
            model: spec.model.clone(),
            max_tokens: self.config.max_tokens,
            system: spec.instructions.clone(),
            messages: messages.to_vec(),
            tools: Self::tool_definitions(spec),
        };

        let url = format!("{}/v1/messages", self.config.base_url);
        debug!(agent = %spec.name, model = %spec.model, "sending messages request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RuntimeError::Failed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RuntimeError::Failed(e.to_string()))?;

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(&body) {
                return Err(RuntimeError::Failed(format!(
                    "{}: {}",
                    envelope.error.kind, envelope.error.message
                )));
            }
            return Err(RuntimeError::Failed(format!("HTTP {status}")));
        }

        serde_json::from_str(&body).map_err(|e| RuntimeError::Failed(e.to_string()))
    }

    async fn execute_tool(
        &self,
        spec: &AgentSpec,
        name: &str,
        input: &serde_json::Value,
    ) -> String {
        match name {
            "web_search" if spec.tools.contains(&ToolBinding::WebSearch) => {
                let query = input.get("query").and_then(|q| q.as_str()).unwrap_or("");
                let max_results = input
                    .get("max_results")
                    .and_then(|m| m.as_u64())
                    .map(|m| m as u32);
                search::web_search(&self.client, query, max_results).await
            }
            other => format!("Tool '{other}' is not available to this agent."),
        }
    }

    /// One full exchange: keep answering tool calls until the model produces
    /// a final text turn or the round budget runs out.
    async fn run_exchange(
        &self,
        spec: &AgentSpec,
        message: &str,
    ) -> Result<String, RuntimeError> {
        let mut messages = vec![WireMessage::user_text(message)];

        for _round in 0..MAX_TOOL_ROUNDS {
            let response = self.post_messages(spec, &messages).await?;

            let tool_uses: Vec<(String, String, serde_json::Value)> = response
                .content
                .iter()
                .filter_map(|block| match block {
                    Block::ToolUse { id, name, input } => {
                        Some((id.clone(), name.clone(), input.clone()))
                    }
                    _ => None,
                })
                .collect();

            if tool_uses.is_empty() || response.stop_reason.as_deref() != Some("tool_use") {
                let text = response
                    .content
                    .iter()
                    .filter_map(|block| match block {
                        Block::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("");
                return Ok(text);
            }

            messages.push(WireMessage {
                role: "assistant",
                content: response.content.clone(),
            });

            let mut results = Vec::with_capacity(tool_uses.len());
            for (id, name, input) in tool_uses {
                debug!(agent = %spec.name, tool = %name, "executing tool call");
                let content = self.execute_tool(spec, &name, &input).await;
                results.push(Block::ToolResult {
                    tool_use_id: id,
                    content,
                });
            }
            messages.push(WireMessage {
                role: "user",
                content: results,
            });
        }

        Err(RuntimeError::Failed(format!(
            "agent {} exhausted {MAX_TOOL_ROUNDS} tool-use rounds without a final answer",
            spec.name
        )))
    }
}

#[async_trait]
impl AgentRuntime for AnthropicRuntime {
    async fn start(&self, spec: AgentSpec) -> Result<(), RuntimeError> {
        let mut agents = self
            .agents
            .lock()
            .map_err(|_| RuntimeError::Unavailable("agent table lock poisoned".to_string()))?;
        if agents.contains_key(&spec.name) {
            return Err(RuntimeError::Unavailable(format!(
                "agent name already in use: {}",
                spec.name
            )));
        }
        debug!(agent = %spec.name, tools = spec.tools.len(), "agent started");
        agents.insert(spec.name.clone(), spec);
        Ok(())
    }

    async fn send(
        &self,
        name: &str,
        message: &str,
        timeout: Duration,
    ) -> Result<String, RuntimeError> {
        let spec = self.lookup(name)?;

        match tokio::time::timeout(timeout, self.run_exchange(&spec, message)).await {
            Ok(result) => result,
            Err(_) => Err(RuntimeError::Timeout(timeout)),
        }
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        let mut agents = self
            .agents
            .lock()
            .map_err(|_| RuntimeError::Failed("agent table lock poisoned".to_string()))?;
        // Idempotent: removing an unknown name is a no-op.
        agents.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_runtime() -> AnthropicRuntime {
        AnthropicRuntime::new(RuntimeConfig::new("test-key")).unwrap()
    }

    fn spec(name: &str) -> AgentSpec {
        AgentSpec::new(name, "You are a test agent.", DEFAULT_MODEL)
    }

    #[tokio::test]
    async fn test_start_rejects_duplicate_names() {
        let runtime = test_runtime();
        runtime.start(spec("checker_0")).await.unwrap();

        let err = runtime.start(spec("checker_0")).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let runtime = test_runtime();
        runtime.start(spec("checker_1")).await.unwrap();

        runtime.stop("checker_1").await.unwrap();
        runtime.stop("checker_1").await.unwrap();
        runtime.stop("never_started").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_to_unknown_agent_fails() {
        let runtime = test_runtime();
        let err = runtime
            .send("ghost", "hello", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Failed(_)));
    }

    #[test]
    fn test_request_serialization_shape() {
        let spec = spec("checker_2").with_tool(ToolBinding::WebSearch);
        let request = MessagesRequest {
            model: spec.model.clone(),
            max_tokens: 1024,
            system: spec.instructions.clone(),
            messages: vec![WireMessage::user_text("Fact-check this claim.")],
            tools: AnthropicRuntime::tool_definitions(&spec),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["tools"][0]["name"], "web_search");
        assert_eq!(value["tools"][0]["input_schema"]["required"][0], "query");
    }

    #[test]
    fn test_response_parsing_with_tool_use() {
        let body = r#"{
            "content": [
                {"type": "text", "text": "Let me search."},
                {"type": "tool_use", "id": "tu_1", "name": "web_search", "input": {"query": "test"}}
            ],
            "stop_reason": "tool_use"
        }"#;

        let response: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(response.content.len(), 2);
        assert!(matches!(response.content[1], Block::ToolUse { .. }));
    }

    #[test]
    fn test_error_envelope_parsing() {
        let body = r#"{"error": {"type": "overloaded_error", "message": "Overloaded"}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.kind, "overloaded_error");
    }

    #[test]
    fn test_agents_without_tools_send_no_tool_definitions() {
        assert!(AnthropicRuntime::tool_definitions(&spec("plain")).is_none());
    }
}
