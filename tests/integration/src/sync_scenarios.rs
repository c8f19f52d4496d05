//! End-to-end syncs against real git and local bare upstreams.
//!
//! The install step runs `git --version` so the suite needs nothing beyond
//! git itself.

use std::fs;

use pretty_assertions::assert_eq;
use repo_git::CommandSpec;
use repo_sync::{
    DispatchMode, Error, Step, SyncConfig, SyncEngine, SyncOptions, SyncPath, SyncRequest,
};
use repo_test_utils::dest::Destination;
use repo_test_utils::git::{Upstream, commit_all, git, head_commit, try_git};

fn config() -> SyncConfig {
    SyncConfig {
        dispatch: DispatchMode::Inline,
        install: CommandSpec::new("git").arg("--version"),
        ..SyncConfig::default()
    }
}

fn engine() -> SyncEngine {
    SyncEngine::local(config()).unwrap()
}

fn request(upstream: &Upstream, dest: &Destination) -> SyncRequest {
    SyncRequest::new(upstream.url(), dest.path())
}

const IDENTITY: [&str; 6] = [
    "-c",
    "user.email=local@test.com",
    "-c",
    "user.name=Local User",
    "-c",
    "commit.gpgsign=false",
];

fn with_identity<'a>(args: &[&'a str]) -> Vec<&'a str> {
    let mut all: Vec<&'a str> = IDENTITY.to_vec();
    all.extend_from_slice(args);
    all
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fresh_clone_creates_missing_parents() {
    let upstream = Upstream::new();
    let dest = Destination::nested(&["apps", "team", "checkout"]);

    let report = engine().sync(request(&upstream, &dest)).await.unwrap();

    assert_eq!(report.path, SyncPath::FreshClone);
    assert_eq!(report.recovered_from, None);
    dest.assert_content("README.md", "# Test\n");
    assert_eq!(head_commit(dest.path()), upstream.head());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dirty_checkout_is_repaired_and_updated() {
    let upstream = Upstream::new();
    let dest = Destination::new();
    let engine = engine();
    engine.sync(request(&upstream, &dest)).await.unwrap();

    dest.write("README.md", "local edit\n");
    dest.write("build/output.bin", "artifact");
    dest.write(".git/index.lock", "");
    let latest = upstream.commit_file("src/lib.txt", "new upstream file\n");

    let report = engine.sync(request(&upstream, &dest)).await.unwrap();

    assert_eq!(report.path, SyncPath::Updated);
    dest.assert_content("README.md", "# Test\n");
    dest.assert_content("src/lib.txt", "new upstream file\n");
    dest.assert_missing("build");
    dest.assert_missing(".git/index.lock");
    assert_eq!(head_commit(dest.path()), latest);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_without_upstream_changes_is_noop() {
    let upstream = Upstream::new();
    let dest = Destination::new();
    let engine = engine();
    engine.sync(request(&upstream, &dest)).await.unwrap();
    let before = head_commit(dest.path());

    let report = engine.sync(request(&upstream, &dest)).await.unwrap();

    assert_eq!(report.path, SyncPath::Updated);
    assert_eq!(head_commit(dest.path()), before);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_interrupted_merge_is_aborted_and_updated() {
    let upstream = Upstream::new();
    let dest = Destination::new();
    let engine = engine();
    engine.sync(request(&upstream, &dest)).await.unwrap();

    git(dest.path(), &["checkout", "-b", "side"]);
    dest.write("side.txt", "from side branch\n");
    git(dest.path(), &["add", "side.txt"]);
    git(dest.path(), &with_identity(&["commit", "-m", "Side change"]));
    git(dest.path(), &["checkout", "-"]);
    git(
        dest.path(),
        &with_identity(&["merge", "--no-commit", "--no-ff", "side"]),
    );
    dest.assert_exists(".git/MERGE_HEAD");
    let latest = upstream.commit_file("src/lib.txt", "new upstream file\n");

    let report = engine.sync(request(&upstream, &dest)).await.unwrap();

    assert_eq!(report.path, SyncPath::Updated);
    assert_eq!(report.recovered_from, None);
    dest.assert_missing(".git/MERGE_HEAD");
    dest.assert_missing("side.txt");
    dest.assert_content("src/lib.txt", "new upstream file\n");
    assert_eq!(head_commit(dest.path()), latest);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_interrupted_rebase_is_aborted_and_updated() {
    let upstream = Upstream::new();
    upstream.commit_file("CHANGELOG.md", "v1\n");
    let dest = Destination::new();
    let engine = engine();
    engine.sync(request(&upstream, &dest)).await.unwrap();

    // The exec step fails, leaving the rebase stopped part way
    let finished = try_git(
        dest.path(),
        &with_identity(&["rebase", "--force-rebase", "--exec", "false", "HEAD~1"]),
    );
    assert!(!finished);
    dest.assert_exists(".git/rebase-merge");
    let latest = upstream.commit_file("src/lib.txt", "new upstream file\n");

    let report = engine.sync(request(&upstream, &dest)).await.unwrap();

    assert_eq!(report.path, SyncPath::Updated);
    assert_eq!(report.recovered_from, None);
    dest.assert_missing(".git/rebase-merge");
    dest.assert_content("CHANGELOG.md", "v1\n");
    dest.assert_content("src/lib.txt", "new upstream file\n");
    assert_eq!(head_commit(dest.path()), latest);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_diverged_history_falls_back_to_clean_install() {
    let upstream = Upstream::new();
    let dest = Destination::new();
    let engine = engine();
    engine.sync(request(&upstream, &dest)).await.unwrap();

    // Local commit touching the same line as the upstream commit
    dest.write("README.md", "# Local\n");
    commit_all(dest.path(), "Local change");
    let latest = upstream.commit_file("README.md", "# Upstream\n");

    let report = engine.sync(request(&upstream, &dest)).await.unwrap();

    assert_eq!(report.path, SyncPath::FallbackCleanInstall);
    let cause = report.recovered_from.unwrap();
    assert!(cause.starts_with("pull failed"), "{cause}");
    dest.assert_content("README.md", "# Upstream\n");
    dest.assert_missing(".git/rebase-merge");
    assert_eq!(head_commit(dest.path()), latest);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_file_at_destination_is_replaced() {
    let upstream = Upstream::new();
    let dest = Destination::new();
    fs::write(dest.path(), "not a directory").unwrap();

    let report = engine().sync(request(&upstream, &dest)).await.unwrap();

    assert_eq!(report.path, SyncPath::FallbackCleanInstall);
    assert!(dest.path().is_dir());
    dest.assert_exists("README.md");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clean_option_replaces_unrelated_content() {
    let upstream = Upstream::new();
    let dest = Destination::new();
    dest.write("garbage/deep/file.txt", "junk");
    dest.write("notes.md", "junk");

    let report = engine()
        .sync(request(&upstream, &dest).with_options(SyncOptions::clean()))
        .await
        .unwrap();

    assert_eq!(report.path, SyncPath::CleanInstall);
    dest.assert_missing("garbage");
    dest.assert_missing("notes.md");
    assert_eq!(head_commit(dest.path()), upstream.head());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clean_option_on_absent_destination() {
    let upstream = Upstream::new();
    let dest = Destination::new();

    let report = engine()
        .sync(request(&upstream, &dest).with_options(SyncOptions::clean()))
        .await
        .unwrap();

    assert_eq!(report.path, SyncPath::CleanInstall);
    dest.assert_exists("README.md");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_install_failure_keeps_clone_and_fails() {
    let upstream = Upstream::new();
    let dest = Destination::new();
    let config = SyncConfig {
        install: CommandSpec::new("git").arg("definitely-not-a-subcommand"),
        ..config()
    };

    let err = SyncEngine::local(config)
        .unwrap()
        .sync(request(&upstream, &dest))
        .await
        .unwrap_err();

    assert_eq!(err.failed_step(), Some(Step::Install));
    dest.assert_exists(".git");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_repository_fails_at_clone() {
    let upstream = Upstream::new();
    let dest = Destination::new();
    let missing = format!("{}-missing", upstream.url());

    let err = engine()
        .sync(SyncRequest::new(missing, dest.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Operation(_)));
    assert_eq!(err.failed_step(), Some(Step::Clone));
}
