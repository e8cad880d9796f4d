//! # Claim Extraction Stage
//!
//! One ephemeral agent reads the article and answers with (ideally) a JSON
//! array of claim objects. Agents being agents, the answer is treated as
//! semi-structured text and parsed by a decision tree of strategies rather
//! than a strict schema. The stage itself is infallible: if the agent cannot
//! be acquired or the exchange fails, the output degrades to a single
//! synthetic pseudo-claim carrying the error.

use crate::error::RuntimeError;
use crate::pipeline::{PipelineConfig, MAX_CLAIMS};
use crate::runtime::{AgentHandle, AgentRuntime, AgentSpec, NameSeq};
use tracing::warn;

/// System instructions for the extraction agent.
const INSTRUCTIONS: &str = include_str!("defaults/claim_extractor.md");

const ROLE: &str = "claim_extractor";

/// Extract up to [`MAX_CLAIMS`] claims from the article.
///
/// Never errors: a stage-level failure yields the degenerate one-element
/// list `["Could not extract claims: <error>"]`, which the orchestrator
/// treats as claims present and carries into verification.
pub(crate) async fn extract_claims(
    runtime: &dyn AgentRuntime,
    names: &NameSeq,
    config: &PipelineConfig,
    article: &str,
) -> Vec<String> {
    match run_extraction(runtime, names, config, article).await {
        Ok(response) => {
            let mut claims = parse_claims(&response);
            claims.truncate(MAX_CLAIMS);
            claims
        }
        Err(e) => {
            warn!(error = %e, "claim extraction degraded to pseudo-claim");
            vec![format!("Could not extract claims: {e}")]
        }
    }
}

async fn run_extraction(
    runtime: &dyn AgentRuntime,
    names: &NameSeq,
    config: &PipelineConfig,
    article: &str,
) -> Result<String, RuntimeError> {
    let spec = AgentSpec::new(names.next(ROLE, 0), INSTRUCTIONS, &config.model);
    let agent = AgentHandle::acquire(runtime, spec).await?;

    let message = format!("Extract verifiable claims from this article:\n\n{article}");
    let outcome = agent.exchange(&message, config.extract_timeout).await;
    agent.release().await;

    outcome
}

// === Response Parsing ===

/// What a single parsing strategy concluded.
///
/// `NoBrackets` routes to the bare-line fallback, `Malformed` to the
/// long-line fallback; the distinction preserves the original lenient
/// behavior (bracketless output is probably a list of lines, broken JSON is
/// probably prose with noise in it).
#[derive(Debug, PartialEq, Eq)]
enum ParseOutcome {
    /// A JSON array was found and every element mapped to a claim.
    Parsed(Vec<String>),
    /// The response contains no bracketed region at all.
    NoBrackets,
    /// A bracketed region exists but is not a usable claim array.
    Malformed,
}

/// Parse an extraction response into claim strings.
///
/// Strategy order: JSON array between the first `[` and last `]`, then
/// non-empty non-bracket lines, then lines longer than 20 chars. A
/// successfully parsed empty array stays empty - that is the agent saying
/// "no claims", not a parse failure.
pub(crate) fn parse_claims(response: &str) -> Vec<String> {
    match json_array_strategy(response) {
        ParseOutcome::Parsed(claims) => claims,
        ParseOutcome::NoBrackets => bare_lines(response),
        ParseOutcome::Malformed => long_lines(response),
    }
}

fn json_array_strategy(response: &str) -> ParseOutcome {
    let (Some(start), Some(end)) = (response.find('['), response.rfind(']')) else {
        return ParseOutcome::NoBrackets;
    };
    if end <= start {
        return ParseOutcome::NoBrackets;
    }

    let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(&response[start..=end]) else {
        return ParseOutcome::Malformed;
    };

    let mut claims = Vec::with_capacity(items.len());
    for item in items {
        let Some(claim) = item.get("claim").and_then(|c| c.as_str()) else {
            return ParseOutcome::Malformed;
        };
        let context = item.get("context").and_then(|c| c.as_str()).unwrap_or("N/A");
        claims.push(format!("{claim} (Context: {context})"));
    }
    ParseOutcome::Parsed(claims)
}

fn bare_lines(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('[') && !line.starts_with(']'))
        .map(String::from)
        .collect()
}

fn long_lines(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 20)
        .map(String::from)
        .collect()
}
