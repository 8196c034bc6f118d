//! Pipeline stages
//!
//! Each stage is a free function over the client and the [`StagingStore`]
//! trait so tests can run them against the in-memory backend and a mock
//! server. The command wrappers in [`crate::commands`] wire them to the real
//! MySQL store.
//!
//! [`StagingStore`]: basepull_store::StagingStore

pub mod download;
pub mod fetch;
pub mod sync;
