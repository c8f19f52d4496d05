//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use repo_sync::DispatchMode;

/// repo-sync - Clone, update or reinstall a repository checkout
#[derive(Parser, Debug)]
#[command(name = "repo-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (TOML, JSON or YAML)
    #[arg(long, global = true, env = "REPO_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Bring a checkout up to date, cloning it if missing
    ///
    /// Examples:
    ///   repo-sync sync https://github.com/org/app.git ./app
    ///   repo-sync sync git@github.com:org/app.git /srv/app --clean
    Sync {
        /// Repository to clone (URL, scp-style address or local path)
        repository: String,

        /// Checkout directory; relative paths resolve against the current directory
        destination: PathBuf,

        /// Delete the destination and reinstall from a fresh clone
        #[arg(long)]
        clean: bool,

        /// Where to run the sync: auto, inline, thread or process
        #[arg(long)]
        dispatch: Option<DispatchMode>,
    },

    /// Run one sync job on behalf of a parent process
    #[command(hide = true)]
    Worker {
        /// Encoded job
        #[arg(long)]
        request: String,

        /// File the outcome is written to
        #[arg(long)]
        report: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_sync() {
        let cli = Cli::parse_from(["repo-sync", "sync", "https://example.com/app.git", "app"]);
        assert!(!cli.verbose);
        assert_eq!(
            cli.command,
            Commands::Sync {
                repository: "https://example.com/app.git".to_string(),
                destination: PathBuf::from("app"),
                clean: false,
                dispatch: None,
            }
        );
    }

    #[test]
    fn parse_sync_with_flags() {
        let cli = Cli::parse_from([
            "repo-sync",
            "-v",
            "sync",
            "repo",
            "/srv/app",
            "--clean",
            "--dispatch",
            "process",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Sync {
                clean, dispatch, ..
            } => {
                assert!(clean);
                assert_eq!(dispatch, Some(DispatchMode::Process));
            }
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_unknown_dispatch() {
        let result =
            Cli::try_parse_from(["repo-sync", "sync", "repo", "/srv/app", "--dispatch", "fork"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_worker() {
        let cli = Cli::parse_from(["repo-sync", "worker", "--request", "{}", "--report", "/tmp/r"]);
        assert_eq!(
            cli.command,
            Commands::Worker {
                request: "{}".to_string(),
                report: PathBuf::from("/tmp/r"),
            }
        );
    }

    #[test]
    fn worker_is_hidden_from_help() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("sync"));
        assert!(!help.contains("worker"));
    }
}
