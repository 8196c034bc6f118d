//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. Commands wire
//! the MySQL store and the table service client to the pipeline stages in
//! [`crate::stages`].

use crate::config::AppConfig;
use crate::error::Result;
use basepull_client::{BaseClient, TableRef};
use basepull_store::{MySqlStore, StagingStore};

pub mod clean;
pub mod daily;
pub mod download;
pub mod fetch;
pub mod sync;

/// Connect to the staging database and make sure the tables exist
pub(crate) async fn open_store(config: &AppConfig) -> Result<MySqlStore> {
    let store = MySqlStore::connect(&config.database_url).await?;
    store.ensure_schema().await?;
    Ok(store)
}

/// Build the API client and resolve the source table reference
pub(crate) fn open_client(config: &AppConfig) -> Result<(BaseClient, TableRef)> {
    let client = BaseClient::new(config.client.clone())?;
    let table = TableRef::parse(&config.table_url)?;
    Ok((client, table))
}
