//! Chorale server entry point

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chorale_server::config::{Config, SyncSource};
use chorale_server::db;
use chorale_server::sync::{FolderScanner, ManifestImporter, SyncScheduler, SyncStrategy};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chorale_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(environment = %config.environment(), "Starting Chorale server");

    let pool = db::connect(config.database())
        .await
        .context("Failed to open database")?;
    db::init_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;

    let strategy: Arc<dyn SyncStrategy> = match config.sync_source {
        SyncSource::Folder => {
            info!(path = %config.music_library_path().display(), "Using folder scanner");
            Arc::new(FolderScanner::new(
                pool.clone(),
                config.music_library_path().clone(),
            ))
        }
        SyncSource::Manifest => {
            let importer_config = config
                .importer()
                .context("SYNC_SOURCE=manifest requires IMPORT_MANIFEST_URL and IMPORT_API_KEY")?
                .clone();
            info!(url = %importer_config.manifest_url, "Using manifest importer");
            Arc::new(
                ManifestImporter::new(pool.clone(), importer_config)
                    .context("Failed to build manifest importer")?,
            )
        }
    };

    let shutdown = CancellationToken::new();
    let scheduler = SyncScheduler::start(strategy, config.sync_interval(), shutdown.clone());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    shutdown.cancel();
    scheduler.await.ok();

    pool.close().await;
    info!("Chorale server stopped");
    Ok(())
}
