use std::time::Duration;
use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Endpoint unreachable at {url}: {message}")]
    EndpointUnreachable { url: String, message: String },

    #[error("Generation failed for model '{model}': {message}")]
    Generation { model: String, message: String },

    #[error("{operation} timed out after {limit:?}")]
    Timeout { operation: String, limit: Duration },

    #[error("Pull failed for model '{model}': {message}")]
    Pull { model: String, message: String },

    #[error("A pull for model '{model}' is already in progress")]
    PullAlreadyInProgress { model: String },

    #[error("A benchmark run is already in progress on this runner")]
    RunAlreadyInProgress,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Could not find a boolean answer in '{text}'")]
    UnparsableBoolean { text: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn endpoint_unreachable(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EndpointUnreachable {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn generation(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            model: model.into(),
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, limit: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            limit,
        }
    }

    pub fn pull(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pull {
            model: model.into(),
            message: message.into(),
        }
    }

    pub fn pull_already_in_progress(model: impl Into<String>) -> Self {
        Self::PullAlreadyInProgress {
            model: model.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn unparsable_boolean(text: impl Into<String>) -> Self {
        Self::UnparsableBoolean { text: text.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error means the endpoint could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::EndpointUnreachable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error() {
        let error = DomainError::generation("llama3", "HTTP 500: boom");
        assert_eq!(
            error.to_string(),
            "Generation failed for model 'llama3': HTTP 500: boom"
        );
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
    }

    #[test]
    fn test_timeout_error() {
        let error = DomainError::timeout("Generation", Duration::from_secs(30));
        assert_eq!(error.to_string(), "Generation timed out after 30s");
    }

    #[test]
    fn test_sub_second_timeout_keeps_precision() {
        let error = DomainError::timeout("Generation", Duration::from_millis(200));
        assert_eq!(error.to_string(), "Generation timed out after 200ms");
    }

    #[test]
    fn test_is_unreachable() {
        assert!(DomainError::endpoint_unreachable("http://localhost:11434", "refused").is_unreachable());
        assert!(!DomainError::transport("reset").is_unreachable());
    }
}
