//! Run command - benchmarks one model against a suite

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tracing::{debug, info, warn};

use super::suite::{load_few_shot, load_suite};
use crate::config::AppConfig;
use crate::domain::{AnswerFormat, ModelConfig, RunEvent, RunReport, RunSummary};
use crate::infrastructure::services::{BenchmarkRunner, RunRequest};

/// Arguments for the run command
#[derive(Args, Clone)]
pub struct RunArgs {
    /// Suite file: a JSON array of test cases or an object with a `tests` key
    #[arg(long)]
    pub suite: PathBuf,

    /// Model to benchmark
    #[arg(long)]
    pub model: String,

    /// Sampling temperature in [0, 1] (overrides config)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Few-shot examples file
    #[arg(long)]
    pub few_shot: Option<PathBuf>,

    /// Leave out the examples stored on individual test cases
    #[arg(long)]
    pub skip_case_examples: bool,

    /// Per-test timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write the full run report as JSON
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub async fn run(config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let suite = load_suite(&args.suite)?;
    let few_shot = match &args.few_shot {
        Some(path) => load_few_shot(path)?,
        None => Vec::new(),
    };

    let temperature = args
        .temperature
        .unwrap_or(config.benchmark.default_temperature);
    let model = ModelConfig::new(args.model.as_str(), temperature);
    let format = AnswerFormat::new(config.benchmark.answer_field.as_str())?;

    let runner = BenchmarkRunner::new(super::build_endpoint(&config.endpoint)?)
        .with_answer_format(format)
        .with_generate_timeout(config.endpoint.generate_timeout())
        .with_event_buffer(config.benchmark.event_buffer);

    let mut request = RunRequest::new(suite, model).with_few_shot(few_shot);
    if args.skip_case_examples {
        request = request.without_case_examples();
    }
    if let Some(seconds) = args.timeout {
        request = request.with_timeout(Duration::from_secs(seconds));
    }

    let mut run = runner.start(request).await?;

    let cancel = run.cancellation_token();
    tokio::spawn(async move {
        super::interrupted().await;
        cancel.cancel();
    });

    while let Some(event) = run.next_event().await {
        log_event(&event);
    }

    let report = run.finish().await;
    let summary = RunSummary::from_results(report.model_name.as_str(), &report.results);
    println!("{}", summary);

    if report.is_cancelled() {
        warn!(
            "Run cancelled after {} of the suite's tests",
            report.results.len()
        );
    }

    if let Some(path) = &args.output {
        write_report(path, &report)?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

fn log_event(event: &RunEvent) {
    match event {
        RunEvent::Started { run_id, total } => info!(run_id = %run_id, "Running {} tests", total),
        RunEvent::Progress(progress) => {
            if let Some(name) = &progress.current_test_name {
                debug!(
                    "[{}/{}] {}",
                    progress.completed_count + 1,
                    progress.total_count,
                    name
                );
            }
        }
        RunEvent::Result(result) => {
            let verdict = if result.passed() { "PASS" } else { "FAIL" };
            info!(
                test_id = %result.test_id(),
                seconds = %format!("{:.2}", result.response_time_seconds()),
                "{} {}",
                verdict,
                result.test_name()
            );
            if let Some(error) = result.error() {
                warn!(test_id = %result.test_id(), "{}", error);
            }
        }
    }
}

fn write_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
