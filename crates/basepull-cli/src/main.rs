//! basepull - Main entry point

use basepull_cli::{commands, config::AppConfig, Cli, Commands, Result};
use basepull_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Verbose mode logs debug to the console; normal mode keeps the console
    // quiet and writes info+ to the log file for the cron trail.
    let log_config = if cli.verbose {
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .log_file_prefix("basepull".to_string())
            .build()
    } else {
        LogConfig::builder()
            .level(LogLevel::Info)
            .output(LogOutput::Both)
            .log_file_prefix("basepull".to_string())
            .build()
    };

    // Environment variables refine the flag-derived config, overriding only
    // the fields they actually set
    let log_config = LogConfig::from_env_or(log_config.clone()).unwrap_or(log_config);

    // The job should still run if logging cannot be set up
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    let config = AppConfig::load()?;

    match cli.command {
        Commands::Fetch => commands::fetch::run(&config).await,
        Commands::Sync => commands::sync::run(&config).await,
        Commands::Download => commands::download::run(&config).await,
        Commands::Daily => commands::daily::run(&config).await,
        Commands::Clean => commands::clean::run(&config).await,
    }
}
