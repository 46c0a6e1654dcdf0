//! Model configuration for a benchmark run

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_TAG: &str = "latest";

/// Model identifier plus sampling parameters, fixed for the duration of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier as known to the endpoint
    name: String,

    /// Temperature for response randomness (0.0 - 1.0)
    temperature: f32,

    /// Top-p (nucleus) sampling parameter (0.0 - 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,

    /// Top-k sampling parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,

    /// Context window size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    num_ctx: Option<u32>,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, temperature: f32) -> Self {
        Self {
            name: name.into(),
            temperature,
            top_p: None,
            top_k: None,
            num_ctx: None,
        }
    }

    // Builder methods
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_num_ctx(mut self, num_ctx: u32) -> Self {
        self.num_ctx = Some(num_ctx);
        self
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> Option<f32> {
        self.top_p
    }

    pub fn top_k(&self) -> Option<u32> {
        self.top_k
    }

    pub fn num_ctx(&self) -> Option<u32> {
        self.num_ctx
    }

    /// Sampling options in the endpoint's `options` object shape
    pub fn sampling_options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        options.insert("temperature".to_string(), serde_json::json!(self.temperature));

        if let Some(top_p) = self.top_p {
            options.insert("top_p".to_string(), serde_json::json!(top_p));
        }

        if let Some(top_k) = self.top_k {
            options.insert("top_k".to_string(), serde_json::json!(top_k));
        }

        if let Some(num_ctx) = self.num_ctx {
            options.insert("num_ctx".to_string(), serde_json::json!(num_ctx));
        }

        options
    }
}

/// Model name with the implicit `:latest` tag spelled out.
///
/// A colon only counts as a tag separator in the last path segment, so a
/// registry port (`host:5000/llama3`) is not mistaken for a tag.
pub fn canonical_model_name(name: &str) -> String {
    let name = name.trim();
    let last_segment = name.rsplit('/').next().unwrap_or(name);
    if last_segment.contains(':') {
        name.to_string()
    } else {
        format!("{}:{}", name, DEFAULT_TAG)
    }
}
