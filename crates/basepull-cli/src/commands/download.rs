//! `basepull download` command implementation
//!
//! Downloads attachments for every staged row still waiting for files.

use crate::config::AppConfig;
use crate::error::Result;
use crate::stages;

/// Download attachments for staged records
pub async fn run(config: &AppConfig) -> Result<()> {
    let store = super::open_store(config).await?;
    let (client, _table) = super::open_client(config)?;

    let outcome = stages::download::run(&client, &store, &config.save_root).await?;
    println!(
        "Downloaded {} record(s) ({} file(s) written, {} skipped), {} failed",
        outcome.downloaded, outcome.files_written, outcome.files_skipped, outcome.failed
    );

    Ok(())
}
