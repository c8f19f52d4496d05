//! Repository operations
//!
//! Each [`Operation`] is one external action (a git or install command, or a
//! filesystem change) with a name for diagnostics. A best-effort operation
//! turns its own failure into success before anything downstream sees it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use repo_fs::Filesystem;
use repo_git::CommandSpec;
use serde::{Deserialize, Serialize};

use crate::error::{Failure, OperationError};
use crate::host::Host;

/// Name of an operation, as shown in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Wipe,
    CreateDestination,
    CreateParent,
    Clone,
    RemoveStaleLocks,
    AbortMerge,
    AbortRebase,
    Clean,
    Reset,
    Pull,
    Install,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wipe => "wipe",
            Self::CreateDestination => "create-destination",
            Self::CreateParent => "create-parent",
            Self::Clone => "clone",
            Self::RemoveStaleLocks => "remove-stale-locks",
            Self::AbortMerge => "abort-merge",
            Self::AbortRebase => "abort-rebase",
            Self::Clean => "clean",
            Self::Reset => "reset",
            Self::Pull => "pull",
            Self::Install => "install",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    /// Failure stops the sequence.
    Required,
    /// Failure is expected in common cases and discarded.
    BestEffort,
}

/// What an operation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Command { spec: CommandSpec, cwd: PathBuf },
    EnsureDir(PathBuf),
    RemoveAll(PathBuf),
    /// Delete `*.lock` files directly inside a git metadata directory.
    RemoveLocks(PathBuf),
}

impl Action {
    async fn perform(&self, host: &Host) -> Result<(), Failure> {
        match self {
            Self::Command { spec, cwd } => Ok(host.runner.run(spec, cwd).await?),
            Self::EnsureDir(path) => on_blocking_pool(host, path, |fs, p| fs.ensure_dir(p)).await,
            Self::RemoveAll(path) => {
                on_blocking_pool(host, path, |fs, p| fs.remove_recursively(p)).await
            }
            Self::RemoveLocks(git_dir) => on_blocking_pool(host, git_dir, remove_lock_files).await,
        }
    }
}

async fn on_blocking_pool<F>(host: &Host, path: &Path, f: F) -> Result<(), Failure>
where
    F: FnOnce(&dyn Filesystem, &Path) -> repo_fs::Result<()> + Send + 'static,
{
    let fs = Arc::clone(&host.fs);
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || f(fs.as_ref(), &path))
        .await?
        .map_err(Failure::from)
}

/// Tries every lock file and reports the first failure.
fn remove_lock_files(fs: &dyn Filesystem, git_dir: &Path) -> repo_fs::Result<()> {
    let entries = fs.list_entries(git_dir)?;
    let mut first_error = None;

    for name in repo_git::locks::lock_files(entries.iter().map(String::as_str)) {
        let path = git_dir.join(name);
        tracing::info!(path = %path.display(), "Removing stale lock file");
        if let Err(e) = fs.delete_file(&path) {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// A named action plus its failure tolerance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    step: Step,
    action: Action,
    tolerance: Tolerance,
}

impl Operation {
    /// A required operation.
    pub fn new(step: Step, action: Action) -> Self {
        Self {
            step,
            action,
            tolerance: Tolerance::Required,
        }
    }

    pub fn command(step: Step, spec: CommandSpec, cwd: impl Into<PathBuf>) -> Self {
        Self::new(
            step,
            Action::Command {
                spec,
                cwd: cwd.into(),
            },
        )
    }

    /// Mark this operation's failure as expected and ignorable.
    pub fn best_effort(mut self) -> Self {
        self.tolerance = Tolerance::BestEffort;
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Run the operation to completion.
    ///
    /// Best-effort failures are logged at debug level and reported as
    /// success.
    pub async fn execute(&self, host: &Host) -> Result<(), OperationError> {
        tracing::debug!(step = %self.step, "Starting operation");

        match self.action.perform(host).await {
            Ok(()) => Ok(()),
            Err(cause) if self.tolerance == Tolerance::BestEffort => {
                tracing::debug!(step = %self.step, error = %cause, "Ignoring best-effort failure");
                Ok(())
            }
            Err(cause) => Err(OperationError {
                step: self.step,
                cause,
            }),
        }
    }
}
