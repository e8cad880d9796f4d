//! # Veracity Core
//!
//! The pipeline behind the Veracity fact-check service: everything between
//! "here is an article" and "here is a markdown report".
//!
//! ## Architecture
//!
//! - `runtime/` - The agent runtime boundary: a trait for starting, messaging
//!   and stopping ephemeral instruction-bound agents, a scoped handle that
//!   guarantees teardown, and the production Claude-backed implementation.
//! - `pipeline/` - The three-stage orchestration: claim extraction, parallel
//!   claim verification, report synthesis, plus the stage state machine.
//! - `error` - Error taxonomy shared with the HTTP layer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use veracity_core::pipeline::{FactCheckPipeline, PipelineConfig};
//! use veracity_core::runtime::AnthropicRuntime;
//!
//! let runtime = Arc::new(AnthropicRuntime::from_env()?);
//! let pipeline = FactCheckPipeline::new(runtime, PipelineConfig::default());
//! let report = pipeline.run(&article).await?;
//! ```

pub mod error;
pub mod pipeline;
pub mod runtime;

pub use error::{PipelineError, RuntimeError};
