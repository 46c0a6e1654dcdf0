//! Pull command - downloads a model and logs progress

use clap::Args;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{PullProgress, PullState};
use crate::infrastructure::services::ModelCatalog;

/// Arguments for the pull command
#[derive(Args, Clone)]
pub struct PullArgs {
    /// Model to download, e.g. `llama3:8b`
    pub model: String,
}

pub async fn run(config: &AppConfig, args: PullArgs) -> anyhow::Result<()> {
    let catalog = ModelCatalog::new(super::build_endpoint(&config.endpoint)?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        super::interrupted().await;
        on_interrupt.cancel();
    });

    let mut stream = catalog.pull(&args.model, cancel.clone()).await?;
    let mut reporter = ProgressReporter::default();
    while let Some(event) = stream.next().await {
        reporter.report(&event?);
    }

    if cancel.is_cancelled() {
        warn!(model = %args.model, "Pull cancelled");
    }

    Ok(())
}

/// Logs status changes and every ten percent of a layer
#[derive(Default)]
struct ProgressReporter {
    status: String,
    decile: Option<u64>,
}

impl ProgressReporter {
    fn report(&mut self, progress: &PullProgress) {
        let status_changed = progress.status_message != self.status;
        if status_changed {
            self.status = progress.status_message.clone();
            self.decile = None;
        }

        match progress.state() {
            PullState::Complete => info!("Pull complete"),
            PullState::Indeterminate if status_changed => info!("{}", progress.status_message),
            PullState::Indeterminate => {}
            PullState::Determinate(fraction) => {
                let decile = (fraction * 10.0).floor() as u64;
                if self.decile != Some(decile) {
                    self.decile = Some(decile);
                    info!(
                        "{} {:.0}%",
                        progress.status_message,
                        fraction * 100.0
                    );
                }
            }
        }
    }
}
