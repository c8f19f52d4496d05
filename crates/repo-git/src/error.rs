//! Error types for repo-git

use std::path::PathBuf;

/// Result type for repo-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while invoking external tools
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to start `{command}` in {cwd}: {source}")]
    Spawn {
        command: String,
        cwd: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed in {cwd} ({})", exit_description(.code))]
    CommandFailed {
        command: String,
        cwd: PathBuf,
        /// `None` when the process was terminated by a signal
        code: Option<i32>,
    },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
