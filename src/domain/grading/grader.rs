//! Evaluation policies

use serde::Serialize;

use super::extractor::{extract_structured, parse_boolean_token, Answer};
use crate::domain::prompt::AnswerFormat;
use crate::domain::test_case::{EvaluationType, TestCase};
use crate::domain::DomainError;

/// Longest response excerpt kept in a grading error message
const ERROR_EXCERPT_CHARS: usize = 120;

/// Verdict for one response; grading problems are carried here, never raised
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeOutcome {
    pub passed: bool,
    pub actual_answer: Option<Answer>,
    pub grading_error: Option<String>,
}

impl GradeOutcome {
    fn verdict(passed: bool, actual_answer: Answer) -> Self {
        Self {
            passed,
            actual_answer: Some(actual_answer),
            grading_error: None,
        }
    }

    fn unparsed(error: impl Into<String>) -> Self {
        Self {
            passed: false,
            actual_answer: None,
            grading_error: Some(error.into()),
        }
    }
}

/// Turns raw model output into an answer and a pass/fail verdict
#[derive(Debug, Clone, Default)]
pub struct ResponseGrader {
    format: AnswerFormat,
}

impl ResponseGrader {
    pub fn new(format: AnswerFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &AnswerFormat {
        &self.format
    }

    /// Grade a response against a test case; a pure function of its inputs
    pub fn grade(&self, test_case: &TestCase, response_text: &str) -> GradeOutcome {
        let trimmed = response_text.trim();
        if trimmed.is_empty() {
            return GradeOutcome::unparsed("Model returned an empty response");
        }

        let extracted = extract_structured(trimmed, &self.format);

        match test_case.evaluation_type() {
            EvaluationType::Boolean => self.grade_boolean(test_case, extracted, trimmed),
            EvaluationType::ExactMatch => {
                let actual = extracted.unwrap_or_else(|| Answer::Text(trimmed.to_string()));
                match test_case.expected_answer().as_text() {
                    Some(expected) => {
                        let passed = actual.as_text().trim().to_lowercase()
                            == expected.trim().to_lowercase();
                        GradeOutcome::verdict(passed, actual)
                    }
                    None => mismatched_expectation(test_case, actual),
                }
            }
            EvaluationType::Contains => {
                let actual = extracted.unwrap_or_else(|| Answer::Text(trimmed.to_string()));
                match test_case.expected_answer().as_text() {
                    Some(expected) => {
                        let passed = actual
                            .as_text()
                            .trim()
                            .to_lowercase()
                            .contains(&expected.trim().to_lowercase());
                        GradeOutcome::verdict(passed, actual)
                    }
                    None => mismatched_expectation(test_case, actual),
                }
            }
        }
    }

    fn grade_boolean(
        &self,
        test_case: &TestCase,
        extracted: Option<Answer>,
        literal: &str,
    ) -> GradeOutcome {
        let value = match extracted {
            Some(Answer::Boolean(value)) => Some(value),
            Some(Answer::Text(text)) => {
                parse_boolean_token(&text).or_else(|| parse_boolean_token(literal))
            }
            None => parse_boolean_token(literal),
        };

        let Some(value) = value else {
            return GradeOutcome::unparsed(
                DomainError::unparsable_boolean(excerpt(literal)).to_string(),
            );
        };

        match test_case.expected_answer().as_bool() {
            Some(expected) => GradeOutcome::verdict(value == expected, Answer::Boolean(value)),
            None => mismatched_expectation(test_case, Answer::Boolean(value)),
        }
    }
}

fn mismatched_expectation(test_case: &TestCase, actual: Answer) -> GradeOutcome {
    GradeOutcome {
        passed: false,
        actual_answer: Some(actual),
        grading_error: Some(format!(
            "Expected answer '{}' does not fit evaluation type '{}'",
            test_case.expected_answer(),
            test_case.evaluation_type()
        )),
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= ERROR_EXCERPT_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(ERROR_EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::{ExpectedAnswer, TestCaseId};

    fn boolean_case(expected: bool) -> TestCase {
        TestCase::boolean(TestCaseId::new("b1").unwrap(), "Boolean", "Is it?", expected)
    }

    fn contains_case(expected: &str) -> TestCase {
        TestCase::contains(TestCaseId::new("c1").unwrap(), "Contains", "What is there?", expected)
    }

    fn exact_case(expected: &str) -> TestCase {
        TestCase::exact_match(TestCaseId::new("e1").unwrap(), "Exact", "Which one?", expected)
    }

    #[test]
    fn test_boolean_true_token_any_case() {
        let grader = ResponseGrader::default();
        for text in ["true", "TRUE", "The statement is True.", r#"{"answer": true}"#] {
            let outcome = grader.grade(&boolean_case(true), text);
            assert!(outcome.passed, "expected pass for {text:?}");
            assert_eq!(outcome.actual_answer, Some(Answer::Boolean(true)));
        }
    }

    #[test]
    fn test_boolean_false_token_fails_true_expectation() {
        let grader = ResponseGrader::default();
        for text in ["false", "FALSE", "I think that's False", r#"{"answer": false}"#] {
            let outcome = grader.grade(&boolean_case(true), text);
            assert!(!outcome.passed, "expected fail for {text:?}");
            assert_eq!(outcome.actual_answer, Some(Answer::Boolean(false)));
            assert!(outcome.grading_error.is_none());
        }
    }

    #[test]
    fn test_boolean_mixed_tokens_favour_true() {
        let grader = ResponseGrader::default();
        for text in ["Not false. True.", "Is it false? No, it is true."] {
            let outcome = grader.grade(&boolean_case(true), text);
            assert!(outcome.passed, "expected pass for {text:?}");
            assert_eq!(outcome.actual_answer, Some(Answer::Boolean(true)));
        }
    }

    #[test]
    fn test_boolean_string_values_are_normalized() {
        let grader = ResponseGrader::default();
        assert!(grader.grade(&boolean_case(true), r#"{"answer": "yes"}"#).passed);
        assert!(grader.grade(&boolean_case(false), r#"{"answer": "No"}"#).passed);
        assert!(grader.grade(&boolean_case(true), r#"{"answer": "1"}"#).passed);
        assert!(grader.grade(&boolean_case(true), r#"{"answer": 1}"#).passed);
    }

    #[test]
    fn test_boolean_unparsable() {
        let outcome = ResponseGrader::default().grade(&boolean_case(true), "I cannot say.");

        assert!(!outcome.passed);
        assert!(outcome.actual_answer.is_none());
        assert!(outcome
            .grading_error
            .as_deref()
            .unwrap()
            .contains("Could not find a boolean answer"));
    }

    #[test]
    fn test_contains_policy() {
        let grader = ResponseGrader::default();

        let outcome = grader.grade(&contains_case("dog"), "There is a dog here");
        assert!(outcome.passed);
        assert_eq!(
            outcome.actual_answer,
            Some(Answer::Text("There is a dog here".to_string()))
        );

        assert!(!grader.grade(&contains_case("dog"), "There is a cat here").passed);
        assert!(grader.grade(&contains_case("dog"), r#"{"answer": "A big DOG"}"#).passed);
    }

    #[test]
    fn test_contains_trims_expected() {
        let grader = ResponseGrader::default();
        assert!(grader.grade(&contains_case("dog "), "dog.").passed);
        assert!(grader.grade(&contains_case("  dog"), r#"{"answer": "dog"}"#).passed);
    }

    #[test]
    fn test_exact_match_policy() {
        let grader = ResponseGrader::default();

        assert!(grader.grade(&exact_case("cat"), "Cat").passed);
        assert!(grader.grade(&exact_case("cat"), r#"{"answer": "  CAT "}"#).passed);
        assert!(!grader.grade(&exact_case("cat"), "cats").passed);
        assert!(!grader.grade(&exact_case("cat"), r#"{"answer": "cats"}"#).passed);
    }

    #[test]
    fn test_structured_answer_beats_surrounding_prose() {
        let text = "The text mentions a cat.\n```json\n{\"answer\": \"dog\"}\n```";
        let outcome = ResponseGrader::default().grade(&exact_case("dog"), text);
        assert!(outcome.passed);
        assert_eq!(outcome.actual_answer, Some(Answer::Text("dog".to_string())));
    }

    #[test]
    fn test_empty_response_is_unparsed() {
        let outcome = ResponseGrader::default().grade(&contains_case("dog"), "   \n");
        assert!(!outcome.passed);
        assert!(outcome.actual_answer.is_none());
        assert!(outcome.grading_error.is_some());
    }

    #[test]
    fn test_mismatched_expected_answer_fails_without_panicking() {
        let test_case = TestCase::new(
            TestCaseId::new("m1").unwrap(),
            "Mismatch",
            "Is it?",
            ExpectedAnswer::Text("yes".to_string()),
            EvaluationType::Boolean,
        );

        let outcome = ResponseGrader::default().grade(&test_case, "true");
        assert!(!outcome.passed);
        assert!(outcome.grading_error.is_some());
    }

    #[test]
    fn test_grading_is_idempotent() {
        let grader = ResponseGrader::default();
        let test_case = contains_case("dog");
        let text = r#"Here: {"answer": "hot dog"}"#;

        assert_eq!(grader.grade(&test_case, text), grader.grade(&test_case, text));
    }

    #[test]
    fn test_long_text_is_truncated_in_error() {
        let text = "x".repeat(500);
        let outcome = ResponseGrader::default().grade(&boolean_case(true), &text);
        let error = outcome.grading_error.unwrap();
        assert!(error.len() < 300);
        assert!(error.contains("..."));
    }
}
