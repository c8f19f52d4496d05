use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use super::Delegate;
use crate::config::SyncConfig;
use crate::error::RemoteError;
use crate::host::Host;
use crate::request::SyncRequest;
use crate::strategy::{Selector, SyncReport};
use crate::{Error, Result};

const REPORT_FILE: &str = "report.json";

/// What the parent hands to a worker process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerJob {
    pub request: SyncRequest,
    pub config: SyncConfig,
}

/// What a worker process writes back.
///
/// A failed sync keeps its kind, failed step and message, so the caller
/// sees the same error it would have seen inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum WorkerReport {
    Success { report: SyncReport },
    Failure { error: RemoteError },
}

impl WorkerReport {
    pub fn from_result(result: &Result<SyncReport>) -> Self {
        match result {
            Ok(report) => Self::Success {
                report: report.clone(),
            },
            Err(e) => Self::Failure {
                error: e.to_remote(),
            },
        }
    }

    pub fn into_result(self) -> Result<SyncReport> {
        match self {
            Self::Success { report } => Ok(report),
            Self::Failure { error } => Err(Error::Remote(error)),
        }
    }
}

/// Runs each sync in a child process:
/// `<program> worker --request <job json> --report <file>`.
///
/// The child's stdout and stderr are inherited, so tool output streams
/// through unchanged.
#[derive(Debug, Clone)]
pub struct ProcessWorker {
    program: PathBuf,
    config: Arc<SyncConfig>,
}

impl ProcessWorker {
    pub const SUBCOMMAND: &'static str = "worker";

    pub fn new(program: impl Into<PathBuf>, config: Arc<SyncConfig>) -> Self {
        Self {
            program: program.into(),
            config,
        }
    }

    /// The configured worker program, or the running executable.
    pub fn from_config(config: Arc<SyncConfig>) -> Result<Self> {
        let program = match &config.worker.program {
            Some(program) => program.clone(),
            None => std::env::current_exe()
                .map_err(|e| Error::worker(format!("cannot locate current executable: {e}")))?,
        };
        Ok(Self::new(program, config))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Delegate for ProcessWorker {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn delegate(&self, request: SyncRequest) -> Result<SyncReport> {
        let job = WorkerJob {
            request,
            config: SyncConfig::clone(&self.config),
        };
        let payload = serde_json::to_string(&job)
            .map_err(|e| Error::worker(format!("cannot encode worker job: {e}")))?;

        let scratch = tempfile::tempdir()
            .map_err(|e| Error::worker(format!("cannot create report directory: {e}")))?;
        let report_path = scratch.path().join(REPORT_FILE);

        tracing::debug!(program = %self.program.display(), "Spawning worker process");
        let status = Command::new(&self.program)
            .arg(Self::SUBCOMMAND)
            .arg("--request")
            .arg(&payload)
            .arg("--report")
            .arg(&report_path)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| {
                Error::worker(format!("cannot start {}: {e}", self.program.display()))
            })?;

        let raw = match tokio::fs::read_to_string(&report_path).await {
            Ok(raw) => raw,
            Err(e) => {
                return Err(Error::worker(format!(
                    "worker exited with {status} without a report: {e}"
                )));
            }
        };

        serde_json::from_str::<WorkerReport>(&raw)
            .map_err(|e| Error::worker(format!("malformed worker report: {e}")))?
            .into_result()
    }
}

/// Worker-process side: decode `job`, run the selector inline and write the
/// outcome to `report_path`.
///
/// Returns `Err` only when no report could be written; a failed sync is a
/// successfully written [`WorkerReport::Failure`].
pub async fn serve_request(host: &Host, job: &str, report_path: &Path) -> Result<WorkerReport> {
    let outcome = match serde_json::from_str::<WorkerJob>(job) {
        Ok(job) => {
            tracing::debug!(destination = %job.request.destination.display(), "Worker received job");
            WorkerReport::from_result(&Selector::new(host, &job.config).run(&job.request).await)
        }
        Err(e) => WorkerReport::Failure {
            error: Error::worker(format!("malformed worker job: {e}")).to_remote(),
        },
    };

    let encoded = serde_json::to_string(&outcome)
        .map_err(|e| Error::worker(format!("cannot encode worker report: {e}")))?;
    tokio::fs::write(report_path, encoded).await.map_err(|e| {
        Error::worker(format!(
            "cannot write worker report to {}: {e}",
            report_path.display()
        ))
    })?;

    Ok(outcome)
}
