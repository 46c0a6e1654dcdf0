//! Benchmark metrics recorded through the `metrics` facade
//!
//! Nothing is exported unless the embedding process installs a recorder.

use std::time::Duration;

use metrics::{counter, histogram};

use crate::domain::{PullState, TokenUsage};

/// Parameters for generation metrics
pub struct GenerationMetricParams<'a> {
    pub endpoint: &'a str,
    pub model: &'a str,
    pub duration: Duration,
    pub success: bool,
    pub tokens: Option<TokenUsage>,
}

/// Record one generate call, successful or not
pub fn record_generation(params: GenerationMetricParams) {
    let labels = [
        ("endpoint", params.endpoint.to_string()),
        ("model", params.model.to_string()),
        ("status", if params.success { "success" } else { "error" }.to_string()),
    ];

    counter!("benchmark_generations_total", &labels).increment(1);
    histogram!("benchmark_generation_duration_seconds", &labels)
        .record(params.duration.as_secs_f64());

    if let Some(tokens) = params.tokens {
        counter!("benchmark_prompt_tokens_total", &labels).increment(tokens.prompt_tokens as u64);
        counter!("benchmark_completion_tokens_total", &labels)
            .increment(tokens.completion_tokens as u64);
    }
}

/// Record the verdict for one graded test
pub fn record_test(model: &str, passed: bool) {
    let labels = [
        ("model", model.to_string()),
        ("passed", passed.to_string()),
    ];

    counter!("benchmark_tests_total", &labels).increment(1);
}

/// Record one pull progress event
pub fn record_pull_event(model: &str, state: Option<PullState>) {
    let state = match state {
        Some(PullState::Indeterminate) => "indeterminate",
        Some(PullState::Determinate(_)) => "determinate",
        Some(PullState::Complete) => "complete",
        None => "error",
    };
    let labels = [("model", model.to_string()), ("state", state.to_string())];

    counter!("benchmark_pull_events_total", &labels).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_generation(GenerationMetricParams {
            endpoint: "http://localhost:11434",
            model: "llama3",
            duration: Duration::from_millis(250),
            success: true,
            tokens: Some(TokenUsage::new(12, 3)),
        });
        record_test("llama3", false);
        record_pull_event("llama3", Some(PullState::Determinate(0.5)));
        record_pull_event("llama3", None);
    }
}
