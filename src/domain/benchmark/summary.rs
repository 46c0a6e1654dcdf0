//! Aggregate statistics over a run's results, computed by callers

use serde::{Deserialize, Serialize};

use super::TestResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub model_name: String,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    /// Tests whose endpoint call failed outright (a subset of `failed_tests`)
    pub errored_tests: usize,
    pub accuracy_percent: f64,
    pub total_response_time_seconds: f64,
    pub mean_response_time_seconds: f64,
}

impl RunSummary {
    pub fn from_results(model_name: impl Into<String>, results: &[TestResult]) -> Self {
        let total_tests = results.len();
        let passed_tests = results.iter().filter(|r| r.passed()).count();
        let errored_tests = results.iter().filter(|r| r.error().is_some()).count();
        let total_response_time_seconds: f64 =
            results.iter().map(|r| r.response_time_seconds()).sum();

        let (accuracy_percent, mean_response_time_seconds) = if total_tests == 0 {
            (0.0, 0.0)
        } else {
            (
                passed_tests as f64 / total_tests as f64 * 100.0,
                total_response_time_seconds / total_tests as f64,
            )
        };

        Self {
            model_name: model_name.into(),
            total_tests,
            passed_tests,
            failed_tests: total_tests - passed_tests,
            errored_tests,
            accuracy_percent,
            total_response_time_seconds,
            mean_response_time_seconds,
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}/{} passed ({:.1}%), {} errored, mean {:.2}s, total {:.2}s",
            self.model_name,
            self.passed_tests,
            self.total_tests,
            self.accuracy_percent,
            self.errored_tests,
            self.mean_response_time_seconds,
            self.total_response_time_seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grading::ResponseGrader;
    use crate::domain::test_case::{TestCase, TestCaseId};
    use std::time::Duration;

    fn result(id: &str, response: &str, seconds: u64) -> TestResult {
        let test_case = TestCase::boolean(TestCaseId::new(id).unwrap(), id, "Is it?", true);
        let outcome = ResponseGrader::default().grade(&test_case, response);
        TestResult::graded(&test_case, "llama3", outcome, response, Duration::from_secs(seconds))
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::from_results("llama3", &[]);
        assert_eq!(summary.total_tests, 0);
        assert_eq!(summary.accuracy_percent, 0.0);
        assert_eq!(summary.mean_response_time_seconds, 0.0);
    }

    #[test]
    fn test_summary_statistics() {
        let test_case = TestCase::boolean(TestCaseId::new("t4").unwrap(), "t4", "Is it?", true);
        let results = vec![
            result("t1", "true", 1),
            result("t2", "false", 2),
            result("t3", "true", 3),
            TestResult::execution_error(&test_case, "llama3", "timeout", Duration::from_secs(2)),
        ];

        let summary = RunSummary::from_results("llama3", &results);
        assert_eq!(summary.total_tests, 4);
        assert_eq!(summary.passed_tests, 2);
        assert_eq!(summary.failed_tests, 2);
        assert_eq!(summary.errored_tests, 1);
        assert_eq!(summary.accuracy_percent, 50.0);
        assert_eq!(summary.total_response_time_seconds, 8.0);
        assert_eq!(summary.mean_response_time_seconds, 2.0);
        assert!(summary.to_string().starts_with("llama3: 2/4 passed (50.0%)"));
    }
}
