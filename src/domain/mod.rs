//! Domain layer - Core benchmarking logic and entities

pub mod benchmark;
pub mod endpoint;
pub mod error;
pub mod grading;
pub mod model;
pub mod prompt;
pub mod test_case;

pub use benchmark::{RunEvent, RunId, RunProgress, RunReport, RunStatus, RunSummary, TestResult};
pub use endpoint::{
    ModelEndpoint, PullProgress, PullState, PullStream, RawModelResponse, TokenUsage,
};
pub use error::DomainError;
pub use grading::{Answer, GradeOutcome, ResponseGrader};
pub use model::{validate_model_config, ModelConfig, ModelValidationError};
pub use prompt::{AnswerFormat, PromptBuilder};
pub use test_case::{
    validate_suite, EvaluationType, ExpectedAnswer, FewShotExample, TestCase, TestCaseId,
    TestCaseValidationError,
};
