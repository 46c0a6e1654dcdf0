use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Full text returned by the endpoint for one prompt
#[derive(Debug, Clone, PartialEq)]
pub struct RawModelResponse {
    pub model: String,
    pub text: String,
    pub elapsed: Duration,
    pub prompt_eval_count: Option<u32>,
    pub eval_count: Option<u32>,
}

impl RawModelResponse {
    pub fn new(model: impl Into<String>, text: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            elapsed,
            prompt_eval_count: None,
            eval_count: None,
        }
    }

    pub fn with_token_counts(mut self, prompt_eval_count: u32, eval_count: u32) -> Self {
        self.prompt_eval_count = Some(prompt_eval_count);
        self.eval_count = Some(eval_count);
        self
    }
}

/// Token counters reported for one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Usage from a raw response, when the endpoint reported both counters
    pub fn from_response(response: &RawModelResponse) -> Option<Self> {
        match (response.prompt_eval_count, response.eval_count) {
            (Some(prompt), Some(completion)) => Some(Self::new(prompt, completion)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_calculation() {
        let usage = TokenUsage::new(10, 20);
        assert_eq!(usage.total_tokens, 30);
    }

    #[test]
    fn test_usage_requires_both_counters() {
        let response = RawModelResponse::new("llama3", "{}", Duration::from_millis(5));
        assert!(TokenUsage::from_response(&response).is_none());

        let response = response.with_token_counts(12, 3);
        assert_eq!(TokenUsage::from_response(&response), Some(TokenUsage::new(12, 3)));
    }
}
