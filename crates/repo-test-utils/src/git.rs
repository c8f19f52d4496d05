//! Git repository fixtures backed by the real `git` CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Run `git <args>` in `dir`, panicking with stderr on failure.
///
/// # Panics
/// Panics if git cannot be started or exits non-zero.
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "git: `git {args:?}` failed in {}:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Run `git <args>` in `dir` and report whether it exited successfully.
///
/// For setting up states where git is expected to stop part way, such as
/// an interrupted rebase.
///
/// # Panics
/// Panics if git cannot be started.
pub fn try_git(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("try_git: failed to run `git {args:?}`: {e}"))
        .status
        .success()
}

/// Initialises a real git repository with an initial commit.
///
/// Configures a local identity and disables signing so commits work on
/// machines without a global git config.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    git(path, &["init"]);
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);

    fs::write(path.join("README.md"), "# Test\n")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);
}

/// Commit every tracked change in `dir` with a throwaway identity.
///
/// Works in clones that carry no local identity configuration.
pub fn commit_all(dir: &Path, message: &str) {
    git(
        dir,
        &[
            "-c",
            "user.email=local@test.com",
            "-c",
            "user.name=Local User",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "-a",
            "-m",
            message,
        ],
    );
}

/// Commit id that `HEAD` resolves to in the repository at `path`.
///
/// # Panics
/// Panics if the repository cannot be opened or has no commits.
pub fn head_commit(path: &Path) -> git2::Oid {
    let repo = git2::Repository::open(path)
        .unwrap_or_else(|e| panic!("head_commit: cannot open {}: {e}", path.display()));
    let head = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .unwrap_or_else(|e| panic!("head_commit: no HEAD commit in {}: {e}", path.display()));
    head.id()
}

/// A bare upstream repository plus the working copy that feeds it.
///
/// Lives in its own temporary directory; clone from [`Upstream::url`].
pub struct Upstream {
    _temp: TempDir,
    work: PathBuf,
    bare: PathBuf,
}

impl Default for Upstream {
    fn default() -> Self {
        Self::new()
    }
}

impl Upstream {
    /// Create an upstream with one commit containing `README.md`.
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        let bare = temp.path().join("upstream.git");
        fs::create_dir(&work).unwrap();

        real_git_repo_with_commit(&work);
        git(temp.path(), &["clone", "--bare", "work", "upstream.git"]);

        Self {
            _temp: temp,
            work,
            bare,
        }
    }

    /// Location to pass to `git clone`.
    pub fn url(&self) -> String {
        self.bare.to_string_lossy().into_owned()
    }

    /// Write `name`, commit it and push it to the bare repository.
    pub fn commit_file(&self, name: &str, content: &str) -> git2::Oid {
        let path = self.work.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        git(&self.work, &["add", name]);
        git(&self.work, &["commit", "-m", &format!("Update {name}")]);
        git(&self.work, &["push", &self.url(), "HEAD"]);
        self.head()
    }

    /// Commit the bare repository's `HEAD` resolves to.
    pub fn head(&self) -> git2::Oid {
        let repo = git2::Repository::open_bare(&self.bare).unwrap();
        repo.head().unwrap().peel_to_commit().unwrap().id()
    }
}
