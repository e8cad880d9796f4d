//! Veracity server binary: CLI parsing, env loading, runtime wiring.

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use veracity_core::pipeline::{FactCheckPipeline, PipelineConfig};
use veracity_core::runtime::AnthropicRuntime;
use veracity_server::{router, AppState};

#[derive(Parser)]
#[command(author, version, about = "Veracity - Agent-Orchestrated Fact Checking")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Model identifier for all agent roles
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local .env (API keys, SEARXNG_URL) before anything reads the environment.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("veracity=info,veracity_core=info")),
        )
        .init();

    let args = Args::parse();

    let runtime =
        Arc::new(AnthropicRuntime::from_env().context("failed to initialize agent runtime")?);

    let mut config = PipelineConfig::default();
    if let Some(model) = args.model {
        config.model = model;
    }

    let state = Arc::new(AppState {
        pipeline: FactCheckPipeline::new(runtime, config),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!(%addr, "Veracity server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
