//! repo-sync CLI
//!
//! Clones, updates or reinstalls a repository checkout and installs its
//! dependencies.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter (default `info`, `--verbose` forces `debug`)
//! - `REPO_SYNC_CONFIG`: config file, same as `--config`
//!
//! Logs go to stderr. git and installer output is passed through untouched.

mod cli;
mod error;

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use repo_sync::{
    DispatchMode, Host, SyncConfig, SyncEngine, SyncOptions, SyncPath, SyncReport, SyncRequest,
    WorkerReport,
};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::{CliError, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync {
            repository,
            destination,
            clean,
            dispatch,
        } => cmd_sync(cli.config.as_deref(), repository, &destination, clean, dispatch).await,
        Commands::Worker { request, report } => cmd_worker(&request, &report).await,
    }
}

async fn cmd_sync(
    config_path: Option<&Path>,
    repository: String,
    destination: &Path,
    clean: bool,
    dispatch: Option<DispatchMode>,
) -> Result<()> {
    let mut config = SyncConfig::resolve(config_path)?;
    if let Some(mode) = dispatch {
        config.dispatch = mode;
    }

    let destination = resolve_destination(destination)?;
    let request = SyncRequest::new(repository, &destination).with_options(SyncOptions { clean });

    let report = SyncEngine::local(config)?.sync(request).await?;
    print_summary(&destination, &report);
    Ok(())
}

fn resolve_destination(destination: &Path) -> Result<PathBuf> {
    std::path::absolute(destination).map_err(|e| {
        CliError::user(format!(
            "cannot resolve destination {}: {e}",
            destination.display()
        ))
    })
}

fn print_summary(destination: &Path, report: &SyncReport) {
    let action = match report.path {
        SyncPath::CleanInstall => "Reinstalled",
        SyncPath::FreshClone => "Cloned",
        SyncPath::Updated => "Updated",
        SyncPath::FallbackCleanInstall => "Reinstalled after failed update",
    };
    println!(
        "{} {} {}",
        "✓".green(),
        action.bold(),
        destination.display()
    );
    if let Some(cause) = &report.recovered_from {
        println!("  {} {}", "update error:".yellow(), cause);
    }
}

async fn cmd_worker(job: &str, report_path: &Path) -> Result<()> {
    let outcome = repo_sync::serve_request(&Host::local(), job, report_path).await?;
    if let WorkerReport::Failure { error } = &outcome {
        tracing::debug!(kind = ?error.kind, step = ?error.step, "Worker job failed");
    }
    Ok(())
}
