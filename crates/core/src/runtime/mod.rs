//! # Agent Runtime Boundary
//!
//! The pipeline never talks to a model directly. It asks an [`AgentRuntime`]
//! for an ephemeral, instruction-bound agent, sends it exactly one message,
//! and tears it down. The trait is the whole contract; everything behind it
//! (model inference, tool execution, scheduling) is the runtime's business.
//!
//! ## Components
//!
//! - [`AgentRuntime`] - start / send / stop, object-safe so tests can stub it
//! - [`AgentHandle`] - scoped acquisition: one exchange, release on every
//!   exit path, teardown errors swallowed
//! - [`AnthropicRuntime`] - production implementation over the Claude
//!   Messages API with a bounded tool-use loop

mod anthropic;
mod handle;
mod search;

pub use anthropic::{AnthropicRuntime, RuntimeConfig, DEFAULT_MODEL};
pub use handle::{AgentHandle, NameSeq};

use crate::error::RuntimeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A named tool capability an agent may declare.
///
/// Tools are opt-in per agent: an agent that does not declare a binding
/// cannot reach the tool, no matter what it asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolBinding {
    /// Web search backed by a SearXNG instance.
    WebSearch,
}

/// Everything needed to start one agent.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    /// Runtime-unique agent name (see [`NameSeq`]).
    pub name: String,
    /// System instructions the agent is bound to for its lifetime.
    pub instructions: String,
    /// Model identifier.
    pub model: String,
    /// Tool capabilities the agent may invoke.
    pub tools: Vec<ToolBinding>,
}

impl AgentSpec {
    /// Build a spec with no tool bindings.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model: model.into(),
            tools: Vec::new(),
        }
    }

    /// Add a tool binding.
    pub fn with_tool(mut self, tool: ToolBinding) -> Self {
        self.tools.push(tool);
        self
    }
}

/// The external agent runtime, seen from the pipeline's side.
///
/// Implementations must keep `stop` idempotent: stopping an unknown or
/// already-stopped agent is not an error worth surfacing, and callers are
/// free to ignore the result.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Allocate an agent bound to the given instructions, model and tools.
    async fn start(&self, spec: AgentSpec) -> Result<(), RuntimeError>;

    /// Send one message to a started agent and wait for its textual reply.
    ///
    /// Blocks the calling task (never the process) until the runtime answers
    /// or `timeout` elapses. No retries happen at this layer.
    async fn send(
        &self,
        name: &str,
        message: &str,
        timeout: Duration,
    ) -> Result<String, RuntimeError>;

    /// Tear the agent down.
    async fn stop(&self, name: &str) -> Result<(), RuntimeError>;
}
