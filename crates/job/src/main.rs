use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use addonwatch_core::{
    load_config, validate_config, ArchiveFetcher, HttpListingSource, HttpUpdateCatalog,
    Inspector, KintoStore, Pipeline, ReleaseWalker, VersionStore,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("addonwatch {}", VERSION);

    // Determine config path
    let config_path = std::env::var("ADDONWATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = if config_path.exists() {
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file found, using built-in defaults");
        addonwatch_core::Config::default()
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    // Compute config hash so runs are attributable to a configuration
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Configuration loaded (hash {})", &config_hash[..16]);
    info!("Delivery root: {}", config.delivery.root_url);
    info!("Store: {}", config.store.base_url);

    let timeout = Duration::from_secs(config.pipeline.http_timeout_secs);

    // Wire concrete clients
    let listing = Arc::new(HttpListingSource::new(timeout));
    let catalog = Arc::new(HttpUpdateCatalog::new(
        config.update_catalog.url_template.clone(),
        timeout,
    ));
    let store: Arc<dyn VersionStore> = Arc::new(KintoStore::new(&config.store, timeout));

    let walker = ReleaseWalker::new(listing, &config.delivery)
        .context("Failed to compile selection patterns")?;
    let inspector = Inspector::new(
        ArchiveFetcher::new(timeout),
        catalog,
        config.delivery.download_dir.clone(),
        &config.inspect.include_pattern,
    )
    .context("Failed to compile extraction pattern")?;

    let pipeline = Pipeline::new(walker, inspector, store, &config.pipeline);

    info!(
        "Starting pipeline ({} inspector workers)",
        config.pipeline.workers
    );

    tokio::select! {
        result = pipeline.run() => {
            let report = result.context("Pipeline run failed")?;
            info!(
                "Run complete: {} published, {} already known",
                report.published, report.already_known
            );
        }
        _ = shutdown_signal() => {
            warn!("Interrupted, shutting down");
        }
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
