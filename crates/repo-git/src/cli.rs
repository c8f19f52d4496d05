//! Git CLI invocations used to bring a checkout up to date

use crate::command::CommandSpec;

/// Builds git commands against a configurable git executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command<const N: usize>(&self, args: [&str; N]) -> CommandSpec {
        CommandSpec::new(&self.program).args(args)
    }

    /// `git clone <repository> <directory>`, run from the parent directory.
    pub fn clone_into(&self, repository: &str, directory: &str) -> CommandSpec {
        self.command(["clone", repository, directory])
    }

    /// `git merge --abort`. Fails when no merge is in progress.
    pub fn abort_merge(&self) -> CommandSpec {
        self.command(["merge", "--abort"])
    }

    /// `git rebase --abort`. Fails when no rebase is in progress.
    pub fn abort_rebase(&self) -> CommandSpec {
        self.command(["rebase", "--abort"])
    }

    /// `git clean -fd`: drop untracked files and directories.
    pub fn clean_untracked(&self) -> CommandSpec {
        self.command(["clean", "-fd"])
    }

    /// `git reset --hard HEAD`
    pub fn reset_hard(&self) -> CommandSpec {
        self.command(["reset", "--hard", "HEAD"])
    }

    /// `git pull --rebase`
    pub fn pull_rebase(&self) -> CommandSpec {
        self.command(["pull", "--rebase"])
    }
}
