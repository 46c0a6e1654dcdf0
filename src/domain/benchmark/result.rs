//! Per-test result of a benchmark run

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::endpoint::TokenUsage;
use crate::domain::grading::{Answer, GradeOutcome};
use crate::domain::test_case::{EvaluationType, ExpectedAnswer, TestCase, TestCaseId};

/// Result of grading one test case; created once per case per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Reference to the test case
    test_id: TestCaseId,
    /// Display name of the test case
    test_name: String,
    /// Model the prompt was sent to
    model_name: String,
    /// Policy the answer was graded with
    evaluation_type: EvaluationType,
    /// Whether the answer matched the expectation
    passed: bool,
    /// Extracted answer; absent when the call failed or parsing failed
    actual_answer: Option<Answer>,
    /// Expected answer copied from the test case
    expected_answer: ExpectedAnswer,
    /// Wall-clock time of the endpoint call, including time until failure
    response_time_seconds: f64,
    /// Full model output, kept for audit
    raw_response: String,
    /// Transport or generation failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Why no answer could be extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grading_error: Option<String>,
    /// Token usage, when the endpoint reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tokens: Option<TokenUsage>,
    /// When the test was run
    executed_at: DateTime<Utc>,
}

impl TestResult {
    /// Create a result from a graded response
    pub fn graded(
        test_case: &TestCase,
        model_name: impl Into<String>,
        outcome: GradeOutcome,
        raw_response: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            test_id: test_case.id().clone(),
            test_name: test_case.name().to_string(),
            model_name: model_name.into(),
            evaluation_type: test_case.evaluation_type(),
            passed: outcome.passed,
            actual_answer: outcome.actual_answer,
            expected_answer: test_case.expected_answer().clone(),
            response_time_seconds: elapsed.as_secs_f64(),
            raw_response: raw_response.into(),
            error: None,
            grading_error: outcome.grading_error,
            tokens: None,
            executed_at: Utc::now(),
        }
    }

    /// Create a failed result for a call that never produced a response
    pub fn execution_error(
        test_case: &TestCase,
        model_name: impl Into<String>,
        error: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            test_id: test_case.id().clone(),
            test_name: test_case.name().to_string(),
            model_name: model_name.into(),
            evaluation_type: test_case.evaluation_type(),
            passed: false,
            actual_answer: None,
            expected_answer: test_case.expected_answer().clone(),
            response_time_seconds: elapsed.as_secs_f64(),
            raw_response: String::new(),
            error: Some(error.into()),
            grading_error: None,
            tokens: None,
            executed_at: Utc::now(),
        }
    }

    // Builder methods
    pub fn with_tokens(mut self, tokens: Option<TokenUsage>) -> Self {
        self.tokens = tokens;
        self
    }

    // Getters
    pub fn test_id(&self) -> &TestCaseId {
        &self.test_id
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn evaluation_type(&self) -> EvaluationType {
        self.evaluation_type
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn actual_answer(&self) -> Option<&Answer> {
        self.actual_answer.as_ref()
    }

    pub fn expected_answer(&self) -> &ExpectedAnswer {
        &self.expected_answer
    }

    pub fn response_time_seconds(&self) -> f64 {
        self.response_time_seconds
    }

    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn grading_error(&self) -> Option<&str> {
        self.grading_error.as_deref()
    }

    pub fn tokens(&self) -> Option<&TokenUsage> {
        self.tokens.as_ref()
    }

    pub fn executed_at(&self) -> DateTime<Utc> {
        self.executed_at
    }
}
