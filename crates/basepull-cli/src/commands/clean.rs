//! `basepull clean` command implementation
//!
//! Prunes raw rows that have been superseded by a newer pull of the same
//! record. The latest raw row per record always survives.

use crate::config::AppConfig;
use crate::error::Result;
use basepull_store::StagingStore;
use tracing::info;

/// Prune superseded raw rows
pub async fn run(config: &AppConfig) -> Result<()> {
    let store = super::open_store(config).await?;

    let pruned = store.prune_superseded_raw().await?;
    info!(pruned, "superseded raw rows pruned");
    println!("Pruned {pruned} superseded raw row(s)");

    Ok(())
}
