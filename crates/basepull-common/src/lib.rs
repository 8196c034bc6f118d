//! basepull Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities and error handling for the basepull workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all basepull workspace members:
//!
//! - **Error Handling**: the shared [`CommonError`] type
//! - **Logging**: centralized tracing setup with console/file outputs
//! - **Checksums**: attachment integrity digests
//!
//! # Example
//!
//! ```no_run
//! use basepull_common::checksum::file_sha256;
//!
//! fn digest(path: &str) -> basepull_common::Result<()> {
//!     let checksum = file_sha256(path)?;
//!     tracing::debug!(%checksum, "attachment digest");
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CommonError, Result};
