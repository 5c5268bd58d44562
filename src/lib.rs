pub mod config;

mod client;
mod fetcher;
mod models;
mod sink;

pub use client::{HttpTransport, JsonpTransport, Transport, TransportError};
pub use fetcher::{endpoint_url, FetchError, PollingFetcher, DEFAULT_REFRESH_MS};
pub use models::{PresentationState, ReadingDisplay, SensorReading, PLACEHOLDER};
pub use sink::{ConsoleSink, CurrentData, MemorySink, PresentationSink};

use crate::config::AppConfig;
use anyhow::Context;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

pub async fn run() -> anyhow::Result<()> {
    info!("Starting application");

    match monitor().await {
        Ok(_) => info!("Application completed successfully"),
        Err(e) => {
            error!("Application error: {e:#}");
            // Print chain of error causes
            let mut source = e.source();
            while let Some(e) = source {
                error!("Caused by: {e}");
                source = e.source();
            }
            return Err(e).context("Application failed to run");
        }
    }

    Ok(())
}

async fn monitor() -> anyhow::Result<()> {
    let config = AppConfig::new().unwrap_or_else(|e| {
        warn!("Falling back to default configuration: {e:#}");
        AppConfig::default()
    });

    let sink: Arc<dyn PresentationSink> = Arc::new(ConsoleSink::default());
    let fetcher = Arc::new(
        PollingFetcher::from_config(&config, sink).context("Failed to build HTTP clients")?,
    );

    info!(
        "Polling {} every {} ms",
        fetcher.endpoint(),
        config.widget.refresh
    );
    fetcher
        .setup(Duration::from_millis(config.widget.refresh))
        .await;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for shutdown signal")?;
    info!("Received shutdown signal");
    fetcher.stop_auto_refresh();

    Ok(())
}
