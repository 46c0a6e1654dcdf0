//! Answer extraction from raw model output

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::prompt::AnswerFormat;

/// Boolean vocabularies, strongest first; the first tier with a hit decides,
/// and inside that tier any affirmative token wins
static BOOLEAN_TIERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\b(true|false)\b").unwrap(),
        Regex::new(r"(?i)\b(yes|no)\b").unwrap(),
        Regex::new(r"\b(1|0)\b").unwrap(),
    ]
});

/// Answer value extracted from a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Boolean(bool),
    Text(String),
}

impl Answer {
    /// Text form used by the string policies
    pub fn as_text(&self) -> String {
        match self {
            Answer::Boolean(value) => value.to_string(),
            Answer::Text(value) => value.clone(),
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Answer::Boolean(*b)),
            Value::String(s) => Some(Answer::Text(s.clone())),
            Value::Number(n) => Some(Answer::Text(n.to_string())),
            other => Some(Answer::Text(other.to_string())),
        }
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// Locate the answer field inside a response.
///
/// Tries every `{` as the start of a JSON object, so prose, markdown fences
/// and trailing text around the object are tolerated. Returns the value of
/// the first object that has the field (exact key first, then
/// case-insensitive).
pub fn extract_structured(text: &str, format: &AnswerFormat) -> Option<Answer> {
    for (start, _) in text.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();

        let Some(Ok(Value::Object(map))) = values.next() else {
            continue;
        };

        let field = map.get(format.field()).or_else(|| {
            map.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(format.field()))
                .map(|(_, value)| value)
        });

        if let Some(answer) = field.and_then(Answer::from_json) {
            return Some(answer);
        }
    }

    None
}

/// Normalize free text to a boolean using `true/yes/1` and `false/no/0` tokens
pub fn parse_boolean_token(text: &str) -> Option<bool> {
    BOOLEAN_TIERS.iter().find_map(|tier| {
        let mut tokens = tier
            .captures_iter(text)
            .map(|caps| caps[1].to_ascii_lowercase())
            .peekable();
        tokens.peek()?;
        Some(tokens.any(|token| matches!(token.as_str(), "true" | "yes" | "1")))
    })
}
