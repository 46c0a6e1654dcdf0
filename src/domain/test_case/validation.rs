//! Test case and suite validation

use std::collections::HashSet;

use thiserror::Error;

use super::{EvaluationType, TestCase};

/// Maximum length for test case IDs
pub const MAX_TEST_CASE_ID_LENGTH: usize = 100;

/// Validation errors for test cases and suites
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TestCaseValidationError {
    #[error("Test case ID is required")]
    IdRequired,

    #[error("Test case ID is too long ({length} characters, max {max})")]
    IdTooLong { length: usize, max: usize },

    #[error("Test case ID '{0}' must not contain whitespace")]
    IdContainsWhitespace(String),

    #[error("Test case '{0}' has no question")]
    QuestionRequired(String),

    #[error("Test case '{id}' expects a {expected} answer for evaluation type '{evaluation_type}'")]
    AnswerTypeMismatch {
        id: String,
        evaluation_type: EvaluationType,
        expected: &'static str,
    },

    #[error("Test case '{0}' has an empty expected answer")]
    EmptyExpectedAnswer(String),

    #[error("Duplicate test case ID: {0}")]
    DuplicateId(String),

    #[error("Test suite is empty")]
    EmptySuite,
}

/// Validate a test case identifier
pub fn validate_test_case_id(id: &str) -> Result<(), TestCaseValidationError> {
    if id.is_empty() {
        return Err(TestCaseValidationError::IdRequired);
    }

    if id.len() > MAX_TEST_CASE_ID_LENGTH {
        return Err(TestCaseValidationError::IdTooLong {
            length: id.len(),
            max: MAX_TEST_CASE_ID_LENGTH,
        });
    }

    if id.chars().any(char::is_whitespace) {
        return Err(TestCaseValidationError::IdContainsWhitespace(id.to_string()));
    }

    Ok(())
}

/// Validate a single test case
pub fn validate_test_case(test_case: &TestCase) -> Result<(), TestCaseValidationError> {
    let id = test_case.id().as_str();

    if test_case.question().trim().is_empty() {
        return Err(TestCaseValidationError::QuestionRequired(id.to_string()));
    }

    let evaluation_type = test_case.evaluation_type();
    if !test_case.expected_answer().matches_type(evaluation_type) {
        let expected = match evaluation_type {
            EvaluationType::Boolean => "boolean",
            EvaluationType::ExactMatch | EvaluationType::Contains => "string",
        };
        return Err(TestCaseValidationError::AnswerTypeMismatch {
            id: id.to_string(),
            evaluation_type,
            expected,
        });
    }

    if let Some(text) = test_case.expected_answer().as_text() {
        if text.trim().is_empty() {
            return Err(TestCaseValidationError::EmptyExpectedAnswer(id.to_string()));
        }
    }

    Ok(())
}

/// Validate an ordered suite: non-empty, unique IDs, every case valid
pub fn validate_suite(suite: &[TestCase]) -> Result<(), TestCaseValidationError> {
    if suite.is_empty() {
        return Err(TestCaseValidationError::EmptySuite);
    }

    let mut seen = HashSet::with_capacity(suite.len());
    for test_case in suite {
        validate_test_case(test_case)?;

        if !seen.insert(test_case.id().as_str()) {
            return Err(TestCaseValidationError::DuplicateId(
                test_case.id().to_string(),
            ));
        }
    }

    Ok(())
}
