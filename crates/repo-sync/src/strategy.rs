//! Sync strategy selection
//!
//! Chooses one of three sequences per invocation:
//!
//! - **clean install**: wipe, recreate the parent, clone, install
//! - **fresh clone**: create the destination, clone, install
//! - **update**: best-effort lock cleanup and merge/rebase abort, then
//!   clean, hard reset, pull with rebase, install
//!
//! A failed update falls back to a clean install exactly once. Install
//! failures are terminal in every branch.

use std::fmt;

use repo_git::{CommandSpec, GitCli};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::config::SyncConfig;
use crate::host::Host;
use crate::operation::{Action, Operation, Step};
use crate::probe::DestinationState;
use crate::queue::TaskQueue;
use crate::request::{SyncRequest, Target};

/// Which path a successful sync took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPath {
    /// Requested with `clean`.
    CleanInstall,
    /// Destination was absent.
    FreshClone,
    /// Existing checkout updated in place.
    Updated,
    /// Update failed; the checkout was rebuilt from scratch.
    FallbackCleanInstall,
}

impl SyncPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CleanInstall => "clean-install",
            Self::FreshClone => "fresh-clone",
            Self::Updated => "updated",
            Self::FallbackCleanInstall => "fallback-clean-install",
        }
    }
}

impl fmt::Display for SyncPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub path: SyncPath,
    /// The update failure that triggered the fallback, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovered_from: Option<String>,
}

impl SyncReport {
    pub fn new(path: SyncPath) -> Self {
        Self {
            path,
            recovered_from: None,
        }
    }
}

/// Builds the operation sequences for a target.
#[derive(Debug, Clone)]
pub struct Plan {
    git: GitCli,
    install: CommandSpec,
}

impl Plan {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            git: config.git_cli(),
            install: config.install.clone(),
        }
    }

    fn clone_repository(&self, target: &Target) -> Operation {
        Operation::command(
            Step::Clone,
            self.git.clone_into(&target.repository, &target.name),
            &target.parent,
        )
    }

    fn git_step(&self, step: Step, spec: CommandSpec, target: &Target) -> Operation {
        Operation::command(step, spec, &target.destination)
    }

    /// Dependency install inside the checkout.
    pub fn install(&self, target: &Target) -> Operation {
        Operation::command(Step::Install, self.install.clone(), &target.destination)
    }

    pub fn clean_install(&self, target: &Target) -> TaskQueue {
        TaskQueue::new()
            .then(Operation::new(
                Step::Wipe,
                Action::RemoveAll(target.destination.clone()),
            ))
            .then(Operation::new(
                Step::CreateParent,
                Action::EnsureDir(target.parent.clone()),
            ))
            .then(self.clone_repository(target))
            .then(self.install(target))
    }

    pub fn fresh_clone(&self, target: &Target) -> TaskQueue {
        TaskQueue::new()
            .then(Operation::new(
                Step::CreateDestination,
                Action::EnsureDir(target.destination.clone()),
            ))
            .then(self.clone_repository(target))
            .then(self.install(target))
    }

    /// Repair-and-update sequence for an existing checkout, without the
    /// install step.
    pub fn update_attempt(&self, target: &Target) -> TaskQueue {
        let git = &self.git;
        TaskQueue::new()
            .then(
                Operation::new(Step::RemoveStaleLocks, Action::RemoveLocks(target.git_dir()))
                    .best_effort(),
            )
            // "No merge/rebase in progress" is the common case and fails
            .then(self.git_step(Step::AbortMerge, git.abort_merge(), target).best_effort())
            .then(self.git_step(Step::AbortRebase, git.abort_rebase(), target).best_effort())
            .then(self.git_step(Step::Clean, git.clean_untracked(), target))
            .then(self.git_step(Step::Reset, git.reset_hard(), target))
            .then(self.git_step(Step::Pull, git.pull_rebase(), target))
    }
}

/// Runs the decision logic for one request against a [`Host`].
pub struct Selector<'a> {
    host: &'a Host,
    plan: Plan,
}

impl<'a> Selector<'a> {
    pub fn new(host: &'a Host, config: &SyncConfig) -> Self {
        Self {
            host,
            plan: Plan::new(config),
        }
    }

    pub async fn run(&self, request: &SyncRequest) -> Result<SyncReport> {
        let target = request.target()?;

        if request.options.clean {
            tracing::info!(destination = %target.destination.display(), "Clean install requested");
            self.plan.clean_install(&target).run(self.host).await?;
            return Ok(SyncReport::new(SyncPath::CleanInstall));
        }

        match DestinationState::inspect(self.host, &target.destination).await? {
            DestinationState::Absent => {
                tracing::info!(destination = %target.destination.display(), "Destination absent, cloning");
                self.plan.fresh_clone(&target).run(self.host).await?;
                Ok(SyncReport::new(SyncPath::FreshClone))
            }
            DestinationState::Present => self.update_or_reinstall(&target).await,
        }
    }

    async fn update_or_reinstall(&self, target: &Target) -> Result<SyncReport> {
        tracing::info!(destination = %target.destination.display(), "Destination present, updating");

        match self.plan.update_attempt(target).run(self.host).await {
            Ok(()) => {
                self.plan.install(target).execute(self.host).await?;
                Ok(SyncReport::new(SyncPath::Updated))
            }
            Err(failure) => {
                tracing::warn!(
                    step = %failure.step,
                    error = %failure,
                    "Update failed, falling back to clean install"
                );
                self.plan.clean_install(target).run(self.host).await?;
                Ok(SyncReport {
                    path: SyncPath::FallbackCleanInstall,
                    recovered_from: Some(failure.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn target() -> Target {
        SyncRequest::new("https://example.com/app.git", "/srv/apps/app")
            .target()
            .unwrap()
    }

    #[test]
    fn test_clean_install_steps() {
        let plan = Plan::new(&SyncConfig::default());
        assert_eq!(
            plan.clean_install(&target()).steps(),
            vec![Step::Wipe, Step::CreateParent, Step::Clone, Step::Install]
        );
    }

    #[test]
    fn test_fresh_clone_steps() {
        let plan = Plan::new(&SyncConfig::default());
        assert_eq!(
            plan.fresh_clone(&target()).steps(),
            vec![Step::CreateDestination, Step::Clone, Step::Install]
        );
    }

    #[test]
    fn test_update_attempt_tolerances() {
        let plan = Plan::new(&SyncConfig::default());
        let queue = plan.update_attempt(&target());
        let best_effort: Vec<Step> = queue
            .operations()
            .iter()
            .filter(|op| op.tolerance() == crate::operation::Tolerance::BestEffort)
            .map(Operation::step)
            .collect();

        assert_eq!(
            queue.steps(),
            vec![
                Step::RemoveStaleLocks,
                Step::AbortMerge,
                Step::AbortRebase,
                Step::Clean,
                Step::Reset,
                Step::Pull,
            ]
        );
        assert_eq!(
            best_effort,
            vec![Step::RemoveStaleLocks, Step::AbortMerge, Step::AbortRebase]
        );
    }

    #[test]
    fn test_clone_runs_in_parent_with_directory_name() {
        let plan = Plan::new(&SyncConfig::default());
        let queue = plan.fresh_clone(&target());
        let clone = &queue.operations()[1];

        assert_eq!(
            clone.action(),
            &Action::Command {
                spec: CommandSpec::new("git").args(["clone", "https://example.com/app.git", "app"]),
                cwd: PathBuf::from("/srv/apps"),
            }
        );
    }

    #[test]
    fn test_report_serialization_omits_empty_recovery() {
        let json = serde_json::to_string(&SyncReport::new(SyncPath::Updated)).unwrap();
        assert_eq!(json, r#"{"path":"updated"}"#);
    }
}
