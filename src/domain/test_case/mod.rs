//! Test case domain - Suite entries, few-shot examples and their validation

mod entity;
mod validation;

pub use entity::{EvaluationType, ExpectedAnswer, FewShotExample, TestCase, TestCaseId};
pub use validation::{
    validate_suite, validate_test_case, validate_test_case_id, TestCaseValidationError,
};
