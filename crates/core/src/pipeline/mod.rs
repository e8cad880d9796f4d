//! # Fact-Check Pipeline
//!
//! Orchestrates the three stages: claim extraction, parallel claim
//! verification, report synthesis. Data flows strictly forward - article to
//! claims to verdicts to report - and the whole pipeline is stateless across
//! invocations; the only thing shared between runs is the agent runtime and
//! the name sequence that keeps concurrent agent names unique.
//!
//! Failure policy in one line: validate up front, contain everything the
//! stages can contain (degraded output beats no output), and surface only
//! validation rejections and genuinely unhandled failures to the caller.

mod extract;
mod report;
mod stage;
mod verify;

pub use stage::PipelineStage;
pub use verify::{Verification, VerificationStatus};

use crate::error::PipelineError;
use crate::runtime::{AgentRuntime, NameSeq, DEFAULT_MODEL};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Minimum article length (chars) accepted before any agent is invoked.
pub const MIN_ARTICLE_LEN: usize = 50;

/// Maximum claims verified per article; extras are discarded in order.
pub const MAX_CLAIMS: usize = 10;

/// Tunables for a pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model identifier passed to every agent.
    pub model: String,
    /// Deadline for the extraction exchange.
    pub extract_timeout: Duration,
    /// Deadline for each per-claim verification exchange.
    pub verify_timeout: Duration,
    /// Deadline for the synthesis exchange.
    pub synthesis_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            extract_timeout: Duration::from_secs(60),
            verify_timeout: Duration::from_secs(90),
            synthesis_timeout: Duration::from_secs(60),
        }
    }
}

/// The fact-check orchestrator.
///
/// Cheap to clone-share behind an `Arc` in server state; holds no per-request
/// state of its own.
pub struct FactCheckPipeline {
    runtime: Arc<dyn AgentRuntime>,
    config: PipelineConfig,
    names: Arc<NameSeq>,
}

impl FactCheckPipeline {
    /// Create a pipeline over the given runtime.
    pub fn new(runtime: Arc<dyn AgentRuntime>, config: PipelineConfig) -> Self {
        Self {
            runtime,
            config,
            names: Arc::new(NameSeq::new()),
        }
    }

    /// Run the full pipeline and return the markdown report.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::ArticleTooShort`] - article under
    ///   [`MIN_ARTICLE_LEN`] chars; no agent was invoked.
    /// - [`PipelineError::NoClaims`] - extraction produced an empty list;
    ///   verification and synthesis were never invoked.
    /// - [`PipelineError::Internal`] - a failure escaped per-stage
    ///   containment (e.g. a panicked verification task).
    #[tracing::instrument(skip(self, article), fields(article_chars = article.chars().count()))]
    pub async fn run(&self, article: &str) -> Result<String, PipelineError> {
        let mut stage = PipelineStage::default();

        if article.chars().count() < MIN_ARTICLE_LEN {
            stage.reject();
            return Err(PipelineError::ArticleTooShort);
        }

        stage.advance();
        info!(stage = ?stage, "extracting claims");
        let claims =
            extract::extract_claims(self.runtime.as_ref(), &self.names, &self.config, article)
                .await;

        if claims.is_empty() {
            stage.reject();
            return Err(PipelineError::NoClaims);
        }

        stage.advance();
        info!(stage = ?stage, claims = claims.len(), "verifying claims");
        let results = match verify::verify_claims(
            Arc::clone(&self.runtime),
            Arc::clone(&self.names),
            &self.config,
            &claims,
        )
        .await
        {
            Ok(results) => results,
            Err(e) => {
                stage.fail();
                return Err(e);
            }
        };

        stage.advance();
        info!(stage = ?stage, "synthesizing report");
        let report = report::synthesize_report(
            self.runtime.as_ref(),
            &self.names,
            &self.config,
            article,
            &results,
        )
        .await;

        stage.advance();
        info!(stage = ?stage, "fact-check pipeline completed");
        Ok(report)
    }
}
