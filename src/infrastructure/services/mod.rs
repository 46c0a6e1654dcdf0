//! Application services built on the model endpoint

mod benchmark_runner;
mod model_catalog;

pub use benchmark_runner::{BenchmarkRun, BenchmarkRunner, RunRequest};
pub use model_catalog::ModelCatalog;
