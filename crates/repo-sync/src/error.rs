//! Error types for repo-sync

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::operation::Step;

/// Result type for repo-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the caller of a sync.
///
/// Failures of best-effort steps never appear here, and a failed update
/// attempt is recovered by the clean-install fallback before anything is
/// reported.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid sync request: {reason}")]
    InvalidRequest { reason: String },

    /// The destination could not be inspected for a reason other than
    /// "does not exist".
    #[error("Cannot inspect destination {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: repo_fs::Error,
    },

    /// An operation of the last attempted sequence failed.
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("Sync worker failed: {message}")]
    Worker { message: String },

    #[error("Configuration error: {0}")]
    Config(#[source] repo_fs::Error),

    /// Raised inside a worker process and rebuilt here.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Which [`Error`] variant a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidRequest,
    Probe,
    Operation,
    Worker,
    Config,
}

/// Serializable form of an [`Error`]: kind, failed step and display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Step>,
    pub message: String,
}

impl Error {
    pub(crate) fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// The step that failed, for operation failures.
    pub fn failed_step(&self) -> Option<Step> {
        match self {
            Self::Operation(e) => Some(e.step),
            Self::Remote(e) => e.step,
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::Probe { .. } => ErrorKind::Probe,
            Self::Operation(_) => ErrorKind::Operation,
            Self::Worker { .. } => ErrorKind::Worker,
            Self::Config(_) => ErrorKind::Config,
            Self::Remote(e) => e.kind,
        }
    }

    /// Flatten into a form that can cross a process boundary.
    pub fn to_remote(&self) -> RemoteError {
        match self {
            Self::Remote(e) => e.clone(),
            other => RemoteError {
                kind: other.kind(),
                step: other.failed_step(),
                message: other.to_string(),
            },
        }
    }
}

/// A named operation failed; carries the collaborator's error unchanged.
#[derive(Debug, thiserror::Error)]
#[error("{step} failed: {cause}")]
pub struct OperationError {
    pub step: Step,
    #[source]
    pub cause: Failure,
}

/// What went wrong inside an operation.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error(transparent)]
    Command(#[from] repo_git::Error),

    #[error(transparent)]
    Fs(#[from] repo_fs::Error),

    #[error("Filesystem task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}
