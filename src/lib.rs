//! PMP LLM Bench
//!
//! Benchmark execution and evaluation engine for LLM endpoints:
//! - Deterministic prompt construction with a fixed answer format
//! - Structured answer extraction and per-policy grading
//! - Cancellable, ordered benchmark runs with progress events
//! - Model listing and coordinated model pulls

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
pub use infrastructure::endpoint::{HttpClient, OllamaEndpoint};
pub use infrastructure::services::{BenchmarkRun, BenchmarkRunner, ModelCatalog, RunRequest};
