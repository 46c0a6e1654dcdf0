use serde::Serialize;

/// Status reported by the endpoint when a pull has finished
pub const PULL_SUCCESS_STATUS: &str = "success";

/// Normalized progress of a pull, as observers should render it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "fraction", rename_all = "snake_case")]
pub enum PullState {
    /// Byte total unknown; show activity, not a bar
    Indeterminate,
    /// Fraction of the current layer downloaded, in `[0.0, 1.0]`
    Determinate(f64),
    /// The endpoint reported success
    Complete,
}

/// One progress event of a model pull
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullProgress {
    pub status_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_completed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_total: Option<u64>,
}

impl PullProgress {
    pub fn new(status_message: impl Into<String>) -> Self {
        Self {
            status_message: status_message.into(),
            digest: None,
            bytes_completed: None,
            bytes_total: None,
        }
    }

    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    pub fn with_bytes(mut self, completed: Option<u64>, total: Option<u64>) -> Self {
        self.bytes_completed = completed;
        self.bytes_total = total;
        self
    }

    /// Whether this is the endpoint's final success event
    pub fn is_success(&self) -> bool {
        self.status_message == PULL_SUCCESS_STATUS
    }

    /// Progress as observers should see it; an absent or zero total is indeterminate
    pub fn state(&self) -> PullState {
        if self.is_success() {
            return PullState::Complete;
        }

        match self.bytes_total {
            Some(total) if total > 0 => {
                let completed = self.bytes_completed.unwrap_or(0).min(total);
                PullState::Determinate(completed as f64 / total as f64)
            }
            _ => PullState::Indeterminate,
        }
    }
}
