//! Test case entity and related types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::validation::{validate_test_case_id, TestCaseValidationError};

/// Test case identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TestCaseId(String);

impl TestCaseId {
    pub fn new(id: impl Into<String>) -> Result<Self, TestCaseValidationError> {
        let id = id.into();
        validate_test_case_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TestCaseId {
    type Error = TestCaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TestCaseId> for String {
    fn from(id: TestCaseId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a model answer is compared with the expected answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationType {
    /// Answer normalizes to the expected true/false
    #[default]
    Boolean,
    /// Case-insensitive, trimmed string equality
    ExactMatch,
    /// Case-insensitive substring test
    Contains,
}

impl std::fmt::Display for EvaluationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationType::Boolean => write!(f, "boolean"),
            EvaluationType::ExactMatch => write!(f, "exact_match"),
            EvaluationType::Contains => write!(f, "contains"),
        }
    }
}

/// Expected answer of a test case; its shape must agree with the evaluation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedAnswer {
    Boolean(bool),
    Text(String),
}

impl ExpectedAnswer {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ExpectedAnswer::Boolean(value) => Some(*value),
            ExpectedAnswer::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExpectedAnswer::Boolean(_) => None,
            ExpectedAnswer::Text(value) => Some(value),
        }
    }

    /// Whether this value has the shape the given evaluation type expects
    pub fn matches_type(&self, evaluation_type: EvaluationType) -> bool {
        matches!(
            (self, evaluation_type),
            (ExpectedAnswer::Boolean(_), EvaluationType::Boolean)
                | (ExpectedAnswer::Text(_), EvaluationType::ExactMatch)
                | (ExpectedAnswer::Text(_), EvaluationType::Contains)
        )
    }
}

impl std::fmt::Display for ExpectedAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpectedAnswer::Boolean(value) => write!(f, "{}", value),
            ExpectedAnswer::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for ExpectedAnswer {
    fn from(value: bool) -> Self {
        ExpectedAnswer::Boolean(value)
    }
}

impl From<&str> for ExpectedAnswer {
    fn from(value: &str) -> Self {
        ExpectedAnswer::Text(value.to_string())
    }
}

impl From<String> for ExpectedAnswer {
    fn from(value: String) -> Self {
        ExpectedAnswer::Text(value)
    }
}

/// An example input/output pair shown to the model before the question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotExample {
    pub input: String,
    pub output: String,
}

impl FewShotExample {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// One evaluation unit of a suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique identifier
    id: TestCaseId,
    /// Display name
    name: String,
    /// Subject text the question refers to
    #[serde(default)]
    input_text: String,
    /// Instruction to the model
    question: String,
    /// Value the extracted answer is compared with
    expected_answer: ExpectedAnswer,
    /// Comparison policy
    #[serde(default)]
    evaluation_type: EvaluationType,
    /// Optional preamble placed before everything else in the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system_prompt: Option<String>,
    /// Examples that belong to this case; shown before any run-level examples
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    few_shot_examples: Vec<FewShotExample>,
    /// Free-form metadata carried along from the suite file
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    metadata: Map<String, Value>,
}

impl TestCase {
    pub fn new(
        id: TestCaseId,
        name: impl Into<String>,
        question: impl Into<String>,
        expected_answer: impl Into<ExpectedAnswer>,
        evaluation_type: EvaluationType,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            input_text: String::new(),
            question: question.into(),
            expected_answer: expected_answer.into(),
            evaluation_type,
            system_prompt: None,
            few_shot_examples: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Create a boolean test case
    pub fn boolean(
        id: TestCaseId,
        name: impl Into<String>,
        question: impl Into<String>,
        expected: bool,
    ) -> Self {
        Self::new(id, name, question, expected, EvaluationType::Boolean)
    }

    /// Create an exact-match test case
    pub fn exact_match(
        id: TestCaseId,
        name: impl Into<String>,
        question: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            name,
            question,
            ExpectedAnswer::Text(expected.into()),
            EvaluationType::ExactMatch,
        )
    }

    /// Create a contains test case
    pub fn contains(
        id: TestCaseId,
        name: impl Into<String>,
        question: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            name,
            question,
            ExpectedAnswer::Text(expected.into()),
            EvaluationType::Contains,
        )
    }

    // Builder methods
    pub fn with_input_text(mut self, input_text: impl Into<String>) -> Self {
        self.input_text = input_text.into();
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_few_shot_example(mut self, example: FewShotExample) -> Self {
        self.few_shot_examples.push(example);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    // Getters
    pub fn id(&self) -> &TestCaseId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn expected_answer(&self) -> &ExpectedAnswer {
        &self.expected_answer
    }

    pub fn evaluation_type(&self) -> EvaluationType {
        self.evaluation_type
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn few_shot_examples(&self) -> &[FewShotExample] {
        &self.few_shot_examples
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<FewShotExample>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FewShotExample>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_case_id_rejects_empty() {
        assert!(TestCaseId::new("").is_err());
        assert!(TestCaseId::new("has space").is_err());
        assert!(TestCaseId::new("sentiment-01").is_ok());
    }

    #[test]
    fn test_deserialize_boolean_case() {
        let json = serde_json::json!({
            "id": "t1",
            "name": "Is positive",
            "input_text": "I love it",
            "question": "Is the sentiment positive?",
            "expected_answer": true,
            "evaluation_type": "boolean"
        });

        let test_case: TestCase = serde_json::from_value(json).unwrap();
        assert_eq!(test_case.id().as_str(), "t1");
        assert_eq!(test_case.expected_answer(), &ExpectedAnswer::Boolean(true));
        assert_eq!(test_case.evaluation_type(), EvaluationType::Boolean);
        assert!(test_case.system_prompt().is_none());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = serde_json::json!({
            "id": "t2",
            "name": "Animal",
            "question": "Which animal?",
            "expected_answer": "dog",
            "evaluation_type": "contains",
            "metadata": {"difficulty": "easy"}
        });

        let test_case: TestCase = serde_json::from_value(json).unwrap();
        assert_eq!(test_case.input_text(), "");
        assert_eq!(test_case.expected_answer().as_text(), Some("dog"));
        assert_eq!(test_case.metadata()["difficulty"], "easy");
    }

    #[test]
    fn test_deserialize_per_case_examples() {
        let json = serde_json::json!({
            "id": "t3",
            "name": "Weather",
            "question": "Is it raining?",
            "expected_answer": false,
            "few_shot_examples": [{ "input": "Sunny sky", "output": "{\"answer\": false}" }]
        });
        let test_case: TestCase = serde_json::from_value(json).unwrap();
        assert_eq!(
            test_case.few_shot_examples(),
            &[FewShotExample::new("Sunny sky", "{\"answer\": false}")]
        );

        let json = serde_json::json!({
            "id": "t4",
            "name": "Weather",
            "question": "Is it raining?",
            "expected_answer": true,
            "few_shot_examples": null
        });
        let test_case: TestCase = serde_json::from_value(json).unwrap();
        assert!(test_case.few_shot_examples().is_empty());
    }

    #[test]
    fn test_unsupported_evaluation_type_is_rejected() {
        for evaluation_type in ["regex", "json_field"] {
            let json = serde_json::json!({
                "id": "t5",
                "name": "x",
                "question": "q",
                "expected_answer": "a+",
                "evaluation_type": evaluation_type
            });
            assert!(serde_json::from_value::<TestCase>(json).is_err());
        }
    }

    #[test]
    fn test_deserialize_rejects_invalid_id() {
        let json = serde_json::json!({
            "id": "",
            "name": "x",
            "question": "q",
            "expected_answer": true
        });

        assert!(serde_json::from_value::<TestCase>(json).is_err());
    }

    #[test]
    fn test_expected_answer_matches_type() {
        assert!(ExpectedAnswer::Boolean(true).matches_type(EvaluationType::Boolean));
        assert!(!ExpectedAnswer::Boolean(true).matches_type(EvaluationType::Contains));
        assert!(ExpectedAnswer::from("cat").matches_type(EvaluationType::ExactMatch));
        assert!(!ExpectedAnswer::from("true").matches_type(EvaluationType::Boolean));
    }

    #[test]
    fn test_evaluation_type_display() {
        assert_eq!(EvaluationType::ExactMatch.to_string(), "exact_match");
        assert_eq!(EvaluationType::default(), EvaluationType::Boolean);
    }
}
