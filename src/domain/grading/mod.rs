//! Grading domain - answer extraction and pass/fail evaluation

mod extractor;
mod grader;

pub use extractor::{extract_structured, parse_boolean_token, Answer};
pub use grader::{GradeOutcome, ResponseGrader};
