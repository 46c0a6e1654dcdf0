use async_trait::async_trait;
use futures::Stream;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::pin::Pin;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use super::{PullProgress, RawModelResponse};
use crate::domain::model::ModelConfig;
use crate::domain::DomainError;

/// Lazy, non-restartable sequence of pull progress events
pub type PullStream = Pin<Box<dyn Stream<Item = Result<PullProgress, DomainError>> + Send>>;

/// Trait for model-serving endpoints (Ollama and compatible servers)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModelEndpoint: Send + Sync + Debug {
    /// List installed model names
    async fn list_models(&self) -> Result<BTreeSet<String>, DomainError>;

    /// Generate a full (non-streamed) response for one prompt within `timeout`; never retried
    async fn generate(
        &self,
        model: &ModelConfig,
        prompt: &str,
        timeout: Duration,
    ) -> Result<RawModelResponse, DomainError>;

    /// Start pulling a model, yielding progress until the endpoint reports success
    async fn pull_model(&self, model: &str) -> Result<PullStream, DomainError>;

    /// Human-readable location of the endpoint, for logs
    fn location(&self) -> &str;
}
