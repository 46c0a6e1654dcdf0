//! Models command - lists installed models

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::services::ModelCatalog;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = ModelCatalog::new(super::build_endpoint(&config.endpoint)?);
    let models = catalog.list_installed().await?;

    if models.is_empty() {
        info!("No models installed at {}", config.endpoint.base_url);
    }

    for model in models {
        println!("{}", model);
    }

    Ok(())
}
