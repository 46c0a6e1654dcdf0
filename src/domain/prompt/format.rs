//! Structured answer format shared by prompt construction and answer extraction

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field name used when nothing else is configured
pub const DEFAULT_ANSWER_FIELD: &str = "answer";

static FIELD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnswerFormatError {
    #[error("Invalid answer field name '{0}': must be an identifier")]
    InvalidField(String),
}

/// The single-field JSON object the model is asked to reply with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnswerFormat {
    field: String,
}

impl AnswerFormat {
    pub fn new(field: impl Into<String>) -> Result<Self, AnswerFormatError> {
        let field = field.into();
        if !FIELD_PATTERN.is_match(&field) {
            return Err(AnswerFormatError::InvalidField(field));
        }
        Ok(Self { field })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Closing instruction appended to every prompt of a run
    pub fn instruction(&self) -> String {
        format!(
            "Respond with JSON only, in exactly this format:\n\
             {{\"{field}\": <your answer>}}\n\
             For yes/no questions the value must be true or false. Do not add any other text.",
            field = self.field
        )
    }
}

impl Default for AnswerFormat {
    fn default() -> Self {
        Self {
            field: DEFAULT_ANSWER_FIELD.to_string(),
        }
    }
}

impl TryFrom<String> for AnswerFormat {
    type Error = AnswerFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AnswerFormat> for String {
    fn from(format: AnswerFormat) -> Self {
        format.field
    }
}
