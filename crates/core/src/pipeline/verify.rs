//! # Verification Stage
//!
//! Scatter-gather over the claim list: one ephemeral fact-checker agent per
//! claim, all launched together, each with the `web_search` tool bound.
//! Isolation is per claim - a timeout or runtime failure becomes an inline
//! error record in that claim's slot and the siblings keep going. Results
//! are collected positionally, so output order always equals input order no
//! matter which exchange finishes first.

use crate::error::PipelineError;
use crate::pipeline::PipelineConfig;
use crate::runtime::{AgentHandle, AgentRuntime, AgentSpec, NameSeq, ToolBinding};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::warn;

/// System instructions for fact-checker agents.
const INSTRUCTIONS: &str = include_str!("defaults/fact_checker.md");

const ROLE: &str = "fact_checker";

/// How a single claim's verification ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// The agent produced a verdict.
    Completed,
    /// The exchange failed; `result` carries the error text.
    Error,
}

/// One claim's verification outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    /// The claim as handed to the agent.
    pub claim: String,
    /// Verdict text, or an error message when `status` is `Error`.
    pub result: String,
    /// Outcome class.
    pub status: VerificationStatus,
}

/// Verify every claim concurrently, one agent per claim.
///
/// Returns exactly one [`Verification`] per input claim, in input order.
/// Only a panicked task escapes as an error; everything the runtime can
/// throw is contained in the affected claim's record.
pub(crate) async fn verify_claims(
    runtime: Arc<dyn AgentRuntime>,
    names: Arc<NameSeq>,
    config: &PipelineConfig,
    claims: &[String],
) -> Result<Vec<Verification>, PipelineError> {
    let mut join_set = JoinSet::new();

    for (index, claim) in claims.iter().enumerate() {
        let runtime = Arc::clone(&runtime);
        let names = Arc::clone(&names);
        let model = config.model.clone();
        let timeout = config.verify_timeout;
        let claim = claim.clone();

        join_set.spawn(async move {
            let verification =
                fact_check_claim(runtime.as_ref(), &names, &model, timeout, &claim, index).await;
            (index, verification)
        });
    }

    let mut slots: Vec<Option<Verification>> = claims.iter().map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, verification)) => slots[index] = Some(verification),
            Err(e) => {
                return Err(PipelineError::Internal(format!(
                    "verification task panicked: {e}"
                )))
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| {
                PipelineError::Internal(format!("missing verification result for claim {index}"))
            })
        })
        .collect()
}

/// Verify one claim. Infallible: failures become an `Error`-status record.
async fn fact_check_claim(
    runtime: &dyn AgentRuntime,
    names: &NameSeq,
    model: &str,
    timeout: Duration,
    claim: &str,
    index: usize,
) -> Verification {
    let spec = AgentSpec::new(names.next(ROLE, index), INSTRUCTIONS, model)
        .with_tool(ToolBinding::WebSearch);

    let outcome = match AgentHandle::acquire(runtime, spec).await {
        Ok(agent) => {
            let message = format!("Fact-check this claim:\n\n{claim}");
            let outcome = agent.exchange(&message, timeout).await;
            agent.release().await;
            outcome
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => Verification {
            claim: claim.to_string(),
            result,
            status: VerificationStatus::Completed,
        },
        Err(e) => {
            warn!(claim_index = index, error = %e, "claim verification failed");
            Verification {
                claim: claim.to_string(),
                result: format!("Error during fact-check: {e}"),
                status: VerificationStatus::Error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        let verification = Verification {
            claim: "X happened".to_string(),
            result: "Verdict: TRUE".to_string(),
            status: VerificationStatus::Completed,
        };

        let value = serde_json::to_value(&verification).unwrap();
        assert_eq!(value["status"], "completed");

        let errored = serde_json::to_value(VerificationStatus::Error).unwrap();
        assert_eq!(errored, "error");
    }
}
