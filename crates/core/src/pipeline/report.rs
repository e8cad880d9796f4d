//! # Report Synthesis Stage
//!
//! One ephemeral agent turns the article plus every verification result into
//! a single markdown report. The article is previewed (first 1000 chars)
//! rather than resent whole; the verdicts carry the substance. Like
//! extraction, the stage is infallible: a failed exchange substitutes an
//! error message as the report body.

use crate::error::RuntimeError;
use crate::pipeline::verify::Verification;
use crate::pipeline::PipelineConfig;
use crate::runtime::{AgentHandle, AgentRuntime, AgentSpec, NameSeq};
use tracing::warn;

/// System instructions for the report-writer agent.
const INSTRUCTIONS: &str = include_str!("defaults/report_writer.md");

const ROLE: &str = "report_writer";

/// How much of the article the report writer sees.
const ARTICLE_PREVIEW_CHARS: usize = 1000;

/// Synthesize the final markdown report.
///
/// Never errors: a stage-level failure substitutes
/// `"Error generating report: <error>"` as the report body.
pub(crate) async fn synthesize_report(
    runtime: &dyn AgentRuntime,
    names: &NameSeq,
    config: &PipelineConfig,
    article: &str,
    results: &[Verification],
) -> String {
    match run_synthesis(runtime, names, config, article, results).await {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "report synthesis degraded to error body");
            format!("Error generating report: {e}")
        }
    }
}

async fn run_synthesis(
    runtime: &dyn AgentRuntime,
    names: &NameSeq,
    config: &PipelineConfig,
    article: &str,
    results: &[Verification],
) -> Result<String, RuntimeError> {
    let spec = AgentSpec::new(names.next(ROLE, 0), INSTRUCTIONS, &config.model);
    let agent = AgentHandle::acquire(runtime, spec).await?;

    let prompt = build_synthesis_prompt(article, results);
    let outcome = agent.exchange(&prompt, config.synthesis_timeout).await;
    agent.release().await;

    outcome
}

/// Assemble the synthesis prompt: article preview plus one block per
/// verification result, numbered from 1 in claim order.
pub(crate) fn build_synthesis_prompt(article: &str, results: &[Verification]) -> String {
    let mut preview: String = article.chars().take(ARTICLE_PREVIEW_CHARS).collect();
    if article.chars().count() > ARTICLE_PREVIEW_CHARS {
        preview.push_str("...");
    }

    let results_summary = results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("**Claim {}:** {}\n\n{}\n", i + 1, r.claim, r.result))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Create a comprehensive fact-check report.\n\n\
         ORIGINAL ARTICLE:\n{preview}\n\n\
         FACT-CHECK RESULTS:\n{results_summary}\n\n\
         Please generate a professional fact-check report based on these findings."
    )
}
