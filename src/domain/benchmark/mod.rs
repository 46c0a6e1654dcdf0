//! Benchmark domain - results, run lifecycle and aggregation

mod progress;
mod result;
mod summary;

pub use progress::{RunEvent, RunId, RunProgress, RunReport, RunStatus};
pub use result::TestResult;
pub use summary::RunSummary;
