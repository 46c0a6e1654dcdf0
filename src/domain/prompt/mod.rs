//! Prompt domain - Deterministic prompt construction

mod builder;
mod format;

pub use builder::PromptBuilder;
pub use format::{AnswerFormat, AnswerFormatError, DEFAULT_ANSWER_FIELD};
