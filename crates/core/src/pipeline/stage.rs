//! # Pipeline Stages
//!
//! The fact-check pipeline as a small state machine. Two terminal states
//! besides `Completed`: `Rejected` (validation said no before or right after
//! extraction, no further agents invoked) and `Failed` (something escaped
//! the per-stage error containment).

use serde::{Deserialize, Serialize};

/// Stage of the fact-check pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Article received, not yet validated.
    Received,
    /// Extracting verifiable claims.
    Extracting,
    /// Verifying all claims concurrently.
    Verifying,
    /// Synthesizing the final report.
    Synthesizing,
    /// Report produced.
    Completed,
    /// Rejected by validation (article too short / no claims).
    Rejected,
    /// Unhandled failure.
    Failed,
}

impl PipelineStage {
    /// Advance to the next stage on the happy path.
    pub fn advance(&mut self) {
        *self = match self {
            Self::Received => Self::Extracting,
            Self::Extracting => Self::Verifying,
            Self::Verifying => Self::Synthesizing,
            Self::Synthesizing => Self::Completed,
            Self::Completed => Self::Completed,
            Self::Rejected => Self::Rejected,
            Self::Failed => Self::Failed,
        };
    }

    /// Terminate with a validation rejection.
    ///
    /// Only meaningful from `Received` (article too short) or `Extracting`
    /// (no claims); terminal states stay put.
    pub fn reject(&mut self) {
        if !self.is_terminal() {
            *self = Self::Rejected;
        }
    }

    /// Terminate with a failure.
    pub fn fail(&mut self) {
        if !self.is_terminal() {
            *self = Self::Failed;
        }
    }

    /// Whether the pipeline has stopped moving.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Failed)
    }
}

impl Default for PipelineStage {
    fn default() -> Self {
        Self::Received
    }
}
