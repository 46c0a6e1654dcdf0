//! Model catalog - installed model listing and pull coordination

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::model::{canonical_model_name, validate_model_name};
use crate::domain::{DomainError, ModelEndpoint, PullStream};
use crate::infrastructure::metrics::record_pull_event;

type InFlight = Arc<Mutex<HashSet<String>>>;

/// Lists installed models and runs at most one pull per model (`name` and `name:latest` are one model)
#[derive(Debug)]
pub struct ModelCatalog {
    endpoint: Arc<dyn ModelEndpoint>,
    in_flight: InFlight,
}

impl ModelCatalog {
    pub fn new(endpoint: Arc<dyn ModelEndpoint>) -> Self {
        Self {
            endpoint,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Installed model names; endpoint failures are returned unchanged
    pub async fn list_installed(&self) -> Result<BTreeSet<String>, DomainError> {
        self.endpoint.list_models().await
    }

    /// Whether a pull for `model` is currently registered
    pub fn is_pulling(&self, model: &str) -> bool {
        lock(&self.in_flight).contains(&canonical_model_name(model))
    }

    /// Start pulling `model`.
    ///
    /// The returned stream owns the model's in-flight registration and the
    /// underlying connection; both are released when the stream ends, is
    /// dropped, or observes `cancel`.
    pub async fn pull(
        &self,
        model: &str,
        cancel: CancellationToken,
    ) -> Result<PullStream, DomainError> {
        validate_model_name(model).map_err(|e| DomainError::validation(e.to_string()))?;

        let registration = PullRegistration::acquire(&self.in_flight, model)?;
        info!(model = %model, "Starting model pull");

        let inner = match self.endpoint.pull_model(model).await {
            Ok(inner) => inner,
            Err(e) => {
                warn!(model = %model, error = %e, "Model pull could not start");
                return Err(e);
            }
        };

        let session = PullSession {
            inner,
            cancel,
            registration,
        };

        let stream = stream::unfold(session, |mut session| async move {
            let next = tokio::select! {
                biased;
                _ = session.cancel.cancelled() => None,
                item = session.inner.next() => Some(item),
            };

            let model = session.registration.model.as_str();
            match next {
                None => {
                    info!(model = %model, "Model pull cancelled");
                    None
                }
                Some(None) => None,
                Some(Some(Ok(progress))) => {
                    record_pull_event(model, Some(progress.state()));
                    if progress.is_success() {
                        info!(model = %model, "Model pull completed");
                    }
                    Some((Ok(progress), session))
                }
                Some(Some(Err(e))) => {
                    record_pull_event(model, None);
                    warn!(model = %model, error = %e, "Model pull failed");
                    Some((Err(e), session))
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

struct PullSession {
    inner: PullStream,
    cancel: CancellationToken,
    registration: PullRegistration,
}

/// In-flight entry for one model, removed on drop
struct PullRegistration {
    in_flight: InFlight,
    model: String,
}

impl PullRegistration {
    fn acquire(in_flight: &InFlight, model: &str) -> Result<Self, DomainError> {
        let key = canonical_model_name(model);
        if !lock(in_flight).insert(key.clone()) {
            return Err(DomainError::pull_already_in_progress(model));
        }

        Ok(Self {
            in_flight: Arc::clone(in_flight),
            model: key,
        })
    }
}

impl Drop for PullRegistration {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.model);
    }
}

fn lock(in_flight: &InFlight) -> std::sync::MutexGuard<'_, HashSet<String>> {
    in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
