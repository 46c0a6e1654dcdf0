//! CLI module for PMP LLM Bench
//!
//! Provides subcommands against an Ollama-compatible endpoint:
//! - `models`: list installed models
//! - `pull`: download a model
//! - `run`: benchmark a model against a test suite

pub mod models;
pub mod pull;
pub mod run;
pub mod suite;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};

use crate::config::{AppConfig, EndpointConfig};
use crate::domain::ModelEndpoint;
use crate::infrastructure::endpoint::{HttpClient, OllamaEndpoint};
use crate::infrastructure::logging::init_logging;

/// PMP LLM Bench - Accuracy and latency benchmarks for local LLM endpoints
#[derive(Parser)]
#[command(name = "pmp-llm-bench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Endpoint base URL (overrides config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List models installed on the endpoint
    Models,

    /// Download a model, logging progress
    Pull(pull::PullArgs),

    /// Run a test suite against one model
    Run(run::RunArgs),
}

/// Load `.env` and layered config, apply overrides and start logging
pub fn bootstrap(base_url: Option<String>) -> AppConfig {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(base_url) = base_url {
        config.endpoint.base_url = base_url;
    }

    init_logging(&config.logging);
    config
}

pub fn build_endpoint(config: &EndpointConfig) -> anyhow::Result<Arc<dyn ModelEndpoint>> {
    let client = HttpClient::with_connect_timeout(config.connect_timeout())?;
    let endpoint = OllamaEndpoint::with_base_url(client, config.base_url.as_str())
        .with_list_timeout(config.list_timeout());

    Ok(Arc::new(endpoint))
}

/// Resolves on the first Ctrl+C
pub(crate) async fn interrupted() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, cancelling"),
        Err(e) => {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
