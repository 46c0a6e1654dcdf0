//! Model configuration validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ModelConfig;

/// Maximum length for model names
pub const MAX_MODEL_NAME_LENGTH: usize = 200;

/// Model names as the endpoint reports them, e.g. `qwen3:4b-instruct` or `library/llama3:latest`
static MODEL_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:/-]*$").unwrap());

/// Model configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    /// Model name is empty
    EmptyName,
    /// Model name exceeds maximum length
    NameTooLong { length: usize, max: usize },
    /// Model name contains invalid characters
    InvalidNameFormat { name: String },
    /// Temperature out of valid range
    InvalidTemperature { value: f32, min: f32, max: f32 },
    /// Top-p out of valid range
    InvalidTopP { value: f32, min: f32, max: f32 },
    /// Top-k is zero
    InvalidTopK,
    /// Context window is zero
    InvalidNumCtx,
}

impl fmt::Display for ModelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Model name cannot be empty"),
            Self::NameTooLong { length, max } => {
                write!(f, "Model name too long: {} characters (max {})", length, max)
            }
            Self::InvalidNameFormat { name } => {
                write!(
                    f,
                    "Invalid model name '{}': must start with a letter or digit and contain no whitespace",
                    name
                )
            }
            Self::InvalidTemperature { value, min, max } => {
                write!(
                    f,
                    "Invalid temperature {}: must be between {} and {}",
                    value, min, max
                )
            }
            Self::InvalidTopP { value, min, max } => {
                write!(
                    f,
                    "Invalid top_p {}: must be between {} and {}",
                    value, min, max
                )
            }
            Self::InvalidTopK => write!(f, "top_k must be greater than 0"),
            Self::InvalidNumCtx => write!(f, "num_ctx must be greater than 0"),
        }
    }
}

impl std::error::Error for ModelValidationError {}

/// Validate a model name
pub fn validate_model_name(name: &str) -> Result<(), ModelValidationError> {
    if name.is_empty() {
        return Err(ModelValidationError::EmptyName);
    }

    if name.len() > MAX_MODEL_NAME_LENGTH {
        return Err(ModelValidationError::NameTooLong {
            length: name.len(),
            max: MAX_MODEL_NAME_LENGTH,
        });
    }

    if !MODEL_NAME_PATTERN.is_match(name) {
        return Err(ModelValidationError::InvalidNameFormat {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Validate temperature value
pub fn validate_temperature(temp: f32) -> Result<(), ModelValidationError> {
    const MIN: f32 = 0.0;
    const MAX: f32 = 1.0;

    if !(MIN..=MAX).contains(&temp) {
        return Err(ModelValidationError::InvalidTemperature {
            value: temp,
            min: MIN,
            max: MAX,
        });
    }

    Ok(())
}

/// Validate top_p value
pub fn validate_top_p(top_p: f32) -> Result<(), ModelValidationError> {
    const MIN: f32 = 0.0;
    const MAX: f32 = 1.0;

    if !(MIN..=MAX).contains(&top_p) {
        return Err(ModelValidationError::InvalidTopP {
            value: top_p,
            min: MIN,
            max: MAX,
        });
    }

    Ok(())
}

/// Validate a complete ModelConfig
pub fn validate_model_config(config: &ModelConfig) -> Result<(), ModelValidationError> {
    validate_model_name(config.name())?;
    validate_temperature(config.temperature())?;

    if let Some(top_p) = config.top_p() {
        validate_top_p(top_p)?;
    }

    if config.top_k() == Some(0) {
        return Err(ModelValidationError::InvalidTopK);
    }

    if config.num_ctx() == Some(0) {
        return Err(ModelValidationError::InvalidNumCtx);
    }

    Ok(())
}
