//! basepull Base-service client
//!
//! HTTP client for the hosted collaborative-table ("base") service: tenant
//! token auth, paginated record listing, and attachment (media) download.
//!
//! The client is an explicit session object. It owns the app credentials and
//! the cached bearer token with its expiry; nothing is process-global, so
//! tests can point a fresh client at a mock server.
//!
//! # Example
//!
//! ```no_run
//! use basepull_client::{BaseClient, ClientConfig, TableRef};
//!
//! #[tokio::main]
//! async fn main() -> basepull_client::Result<()> {
//!     let client = BaseClient::new(ClientConfig::default())?;
//!     let table = TableRef::parse("https://example.feishu.cn/base/appXXXX?table=tblYYYY")?;
//!     let records = client.fetch_all_records(&table).await?;
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod table_ref;
pub mod types;

pub use client::{BaseClient, ClientConfig};
pub use error::{ClientError, Result};
pub use table_ref::TableRef;
pub use types::BaseRecord;
