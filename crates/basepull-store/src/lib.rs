//! basepull staging store
//!
//! Row store behind the sync pipeline. Two logical tables:
//!
//! - `raw_records`: every pulled row, append/supersede only
//! - `staged_records`: one status-tracked row per external id, driving
//!   attachment downloads
//!
//! [`StagingStore`] is the storage contract; [`MySqlStore`] is the production
//! backend and [`MemoryStore`] the in-process backend used by pipeline tests.

pub mod backend;
pub mod error;
pub mod memory;
pub mod mysql;
pub mod types;

pub use backend::StagingStore;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use mysql::MySqlStore;
pub use types::{tokens_differ, Attachment, DownloadStatus, NewRawRecord, NewStagedRecord, RawRecord, StagedRecord};
