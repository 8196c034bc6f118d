//! `basepull fetch` command implementation
//!
//! Pulls the full source table into `raw_records`.

use crate::config::AppConfig;
use crate::error::Result;
use crate::stages;
use tracing::info;

/// Fetch the source table
pub async fn run(config: &AppConfig) -> Result<()> {
    let store = super::open_store(config).await?;
    let (client, table) = super::open_client(config)?;

    let outcome = stages::fetch::run(&client, &table, &config.fields, &store).await?;
    info!(pulled = outcome.pulled, skipped = outcome.skipped, "fetch finished");
    println!("Fetched {} record(s), skipped {}", outcome.pulled, outcome.skipped);

    Ok(())
}
