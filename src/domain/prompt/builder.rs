//! Prompt construction

use super::AnswerFormat;
use crate::domain::test_case::{FewShotExample, TestCase};

/// Builds the text sent to the model for one test case.
///
/// Output depends only on the test case, the few-shot examples and the
/// answer format, so two runs with the same inputs send identical prompts.
/// The closing instruction is the same for every case in a run.
///
/// A case's own examples come first, followed by the run-level ones.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    format: AnswerFormat,
    include_case_examples: bool,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(AnswerFormat::default())
    }
}

impl PromptBuilder {
    pub fn new(format: AnswerFormat) -> Self {
        Self {
            format,
            include_case_examples: true,
        }
    }

    /// Leave each case's own examples out of the prompt
    pub fn without_case_examples(mut self) -> Self {
        self.include_case_examples = false;
        self
    }

    pub fn format(&self) -> &AnswerFormat {
        &self.format
    }

    pub fn build(&self, test_case: &TestCase, few_shot: &[FewShotExample]) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(system_prompt) = test_case.system_prompt() {
            if !system_prompt.trim().is_empty() {
                parts.push(system_prompt.to_string());
                parts.push(String::new());
            }
        }

        let case_examples: &[FewShotExample] = if self.include_case_examples {
            test_case.few_shot_examples()
        } else {
            &[]
        };

        if !case_examples.is_empty() || !few_shot.is_empty() {
            parts.push("Examples:".to_string());
            for example in case_examples.iter().chain(few_shot) {
                parts.push(format!("Input: {}\nOutput: {}", example.input, example.output));
                parts.push(String::new());
            }
        }

        if !test_case.input_text().trim().is_empty() {
            parts.push("Text:".to_string());
            parts.push(test_case.input_text().to_string());
            parts.push(String::new());
        }

        parts.push("Question:".to_string());
        parts.push(test_case.question().to_string());
        parts.push(String::new());
        parts.push(self.format.instruction());

        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::TestCaseId;

    fn sample_case() -> TestCase {
        TestCase::boolean(
            TestCaseId::new("t1").unwrap(),
            "Positive",
            "Is the sentiment positive?",
            true,
        )
        .with_input_text("I love this product")
    }

    #[test]
    fn test_build_without_examples() {
        let prompt = PromptBuilder::default().build(&sample_case(), &[]);

        assert_eq!(
            prompt,
            format!(
                "Text:\nI love this product\n\nQuestion:\nIs the sentiment positive?\n\n{}",
                AnswerFormat::default().instruction()
            )
        );
    }

    #[test]
    fn test_build_with_examples_and_system_prompt() {
        let test_case = sample_case().with_system_prompt("You are a sentiment classifier.");
        let examples = vec![
            FewShotExample::new("Great!", r#"{"answer": true}"#),
            FewShotExample::new("Awful.", r#"{"answer": false}"#),
        ];

        let prompt = PromptBuilder::default().build(&test_case, &examples);

        assert!(prompt.starts_with("You are a sentiment classifier.\n\nExamples:\n"));
        assert!(prompt.contains("Input: Great!\nOutput: {\"answer\": true}\n"));
        let first = prompt.find("Input: Great!").unwrap();
        let second = prompt.find("Input: Awful.").unwrap();
        let text = prompt.find("Text:").unwrap();
        assert!(first < second && second < text);
    }

    #[test]
    fn test_case_examples_precede_run_examples() {
        let test_case = sample_case()
            .with_few_shot_example(FewShotExample::new("Own example", r#"{"answer": true}"#));
        let run_examples = vec![FewShotExample::new("Shared example", r#"{"answer": false}"#)];

        let prompt = PromptBuilder::default().build(&test_case, &run_examples);

        assert_eq!(prompt.matches("Examples:").count(), 1);
        let own = prompt.find("Input: Own example").unwrap();
        let shared = prompt.find("Input: Shared example").unwrap();
        assert!(own < shared);
    }

    #[test]
    fn test_case_examples_can_be_left_out() {
        let test_case = sample_case()
            .with_few_shot_example(FewShotExample::new("Own example", r#"{"answer": true}"#));

        let builder = PromptBuilder::default().without_case_examples();
        assert_eq!(builder.build(&test_case, &[]), builder.build(&sample_case(), &[]));
        assert!(!builder.build(&test_case, &[]).contains("Examples:"));
    }

    #[test]
    fn test_empty_input_text_is_omitted() {
        let test_case = TestCase::exact_match(
            TestCaseId::new("t2").unwrap(),
            "Capital",
            "What is the capital of France?",
            "Paris",
        );

        let prompt = PromptBuilder::default().build(&test_case, &[]);
        assert!(!prompt.contains("Text:"));
        assert!(prompt.starts_with("Question:\nWhat is the capital of France?"));
    }

    #[test]
    fn test_closing_instruction_is_case_independent() {
        let builder = PromptBuilder::default();
        let boolean = builder.build(&sample_case(), &[]);
        let contains = builder.build(
            &TestCase::contains(TestCaseId::new("t3").unwrap(), "Animal", "Which animal?", "dog"),
            &[],
        );

        let instruction = builder.format().instruction();
        assert!(boolean.ends_with(&instruction));
        assert!(contains.ends_with(&instruction));
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::default();
        assert_eq!(builder.build(&sample_case(), &[]), builder.build(&sample_case(), &[]));
    }
}
