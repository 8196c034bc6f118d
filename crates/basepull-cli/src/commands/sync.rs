//! `basepull sync` command implementation
//!
//! Diffs the latest raw pull into the staging table.

use crate::config::AppConfig;
use crate::error::Result;
use crate::stages;

/// Sync raw records into the staging table
pub async fn run(config: &AppConfig) -> Result<()> {
    let store = super::open_store(config).await?;

    let outcome = stages::sync::run(&store).await?;
    println!(
        "Staged {} new, reset {}, refreshed {}, unchanged {}",
        outcome.inserted, outcome.reset, outcome.refreshed, outcome.unchanged
    );

    Ok(())
}
