//! # Error Taxonomy
//!
//! Two layers of failure: `RuntimeError` for anything that goes wrong at the
//! agent runtime boundary, `PipelineError` for what the orchestrator surfaces
//! to the HTTP layer. Most runtime failures never become pipeline errors -
//! the stages contain them (pseudo-claims, per-claim error records,
//! substituted report bodies) and the pipeline keeps going.

use std::time::Duration;
use thiserror::Error;

/// Failures at the agent runtime boundary.
///
/// None of these are retried at this layer; each stage decides whether a
/// failure degrades its output or is contained per-item.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime could not allocate an agent.
    #[error("agent runtime unavailable: {0}")]
    Unavailable(String),

    /// An exchange did not complete within its deadline.
    #[error("agent exchange timed out after {0:?}")]
    Timeout(Duration),

    /// The runtime accepted the exchange but failed to complete it.
    #[error("agent runtime error: {0}")]
    Failed(String),
}

/// Failures the orchestrator reports to its caller.
///
/// The message text is user-facing; the HTTP layer maps the first two
/// variants to 400 and `Internal` to 500.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The article is below the minimum length. No agent was invoked.
    #[error("Article too short. Please provide a substantial article to fact-check.")]
    ArticleTooShort,

    /// Extraction produced an empty claim list.
    #[error("No verifiable claims found in the article.")]
    NoClaims,

    /// Something escaped the per-stage error containment.
    #[error("{0}")]
    Internal(String),
}
