//! `basepull daily` command implementation
//!
//! Runs fetch, sync, and download back to back. This is the cron entry
//! point; the first failing stage aborts the run so the scheduler sees a
//! non-zero exit.

use crate::config::AppConfig;
use crate::error::Result;
use crate::stages;
use std::time::Instant;
use tracing::info;

/// Run the full daily pipeline
pub async fn run(config: &AppConfig) -> Result<()> {
    let started = Instant::now();
    info!("daily run started");

    let store = super::open_store(config).await?;
    let (client, table) = super::open_client(config)?;

    let fetched = stages::fetch::run(&client, &table, &config.fields, &store).await?;
    let synced = stages::sync::run(&store).await?;
    let downloaded = stages::download::run(&client, &store, &config.save_root).await?;

    info!(
        pulled = fetched.pulled,
        staged = synced.inserted + synced.reset,
        downloaded = downloaded.downloaded,
        failed = downloaded.failed,
        elapsed_secs = started.elapsed().as_secs(),
        "daily run finished"
    );
    println!(
        "Daily run: {} pulled, {} staged, {} downloaded, {} failed ({}s)",
        fetched.pulled,
        synced.inserted + synced.reset,
        downloaded.downloaded,
        downloaded.failed,
        started.elapsed().as_secs()
    );

    Ok(())
}
