//! basepull CLI library
//!
//! Subcommands mirror the pipeline stages: `fetch` pulls the source table
//! into `raw_records`, `sync` stages new or changed rows, `download` fetches
//! attachments for staged rows, `daily` runs all three in sequence for the
//! cron trigger, and `clean` prunes superseded raw rows.

use clap::{Parser, Subcommand};

pub mod commands;
pub mod config;
pub mod error;
pub mod stages;

pub use error::{CliError, Result};

/// Command-line interface
#[derive(Parser, Debug)]
#[command(name = "basepull")]
#[command(author, version, about = "Daily table mirror and attachment downloader")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose console output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Pipeline subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull every row of the source table into raw_records
    Fetch,

    /// Stage new or changed rows for download
    Sync,

    /// Download attachments for staged rows
    Download,

    /// Run fetch, sync, and download in sequence (cron entry point)
    Daily,

    /// Prune raw rows superseded by newer pulls
    Clean,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbose_flag_is_global() {
        let cli = Cli::parse_from(["basepull", "daily", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Daily));
    }
}
