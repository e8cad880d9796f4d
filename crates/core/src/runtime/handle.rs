//! # Scoped Agent Handle
//!
//! Every stage follows the same lifecycle: acquire an agent, run exactly one
//! exchange, release the agent no matter how the exchange went. The handle
//! makes the release half of that contract hard to get wrong: `release`
//! consumes the handle, and teardown failures are logged and swallowed so
//! they can never mask the primary result.

use crate::error::RuntimeError;
use crate::runtime::{AgentRuntime, AgentSpec};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Issues runtime-unique agent names.
///
/// Names look like `fact_checker_3_1754550000123-42`: role, claim index,
/// millisecond timestamp, then a monotonic sequence number. The timestamp is
/// for operators reading logs; uniqueness rests on the counter, which is
/// owned by the pipeline instance rather than living in a global.
#[derive(Debug, Default)]
pub struct NameSeq(AtomicU64);

impl NameSeq {
    /// Create a fresh sequence starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next unique name for `role` at position `index`.
    pub fn next(&self, role: &str, index: usize) -> String {
        let seq = self.0.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis();
        format!("{role}_{index}_{millis}-{seq}")
    }
}

/// A live agent, tied to the runtime that started it.
///
/// The handle supports a single request/response exchange. Callers bind the
/// exchange result before releasing, so the agent is torn down on success,
/// timeout and error paths alike:
///
/// ```rust,ignore
/// let agent = AgentHandle::acquire(runtime, spec).await?;
/// let outcome = agent.exchange(&message, timeout).await;
/// agent.release().await;
/// let reply = outcome?;
/// ```
pub struct AgentHandle<'r> {
    runtime: &'r dyn AgentRuntime,
    name: String,
}

impl<'r> AgentHandle<'r> {
    /// Start an agent and wrap it in a handle.
    pub async fn acquire(
        runtime: &'r dyn AgentRuntime,
        spec: AgentSpec,
    ) -> Result<AgentHandle<'r>, RuntimeError> {
        let name = spec.name.clone();
        runtime.start(spec).await?;
        Ok(Self { runtime, name })
    }

    /// The runtime-unique agent name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send one message and wait for the reply or the timeout.
    pub async fn exchange(
        &self,
        message: &str,
        timeout: Duration,
    ) -> Result<String, RuntimeError> {
        self.runtime.send(&self.name, message, timeout).await
    }

    /// Tear the agent down. Teardown failures are logged, never propagated.
    pub async fn release(self) {
        if let Err(e) = self.runtime.stop(&self.name).await {
            tracing::warn!(agent = %self.name, error = %e, "agent teardown failed");
        }
    }
}
