//! Tests for the local filesystem primitives under adverse conditions

use repo_fs::{Filesystem, LocalFs};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn delete_file_missing_returns_error() {
    let dir = tempdir().unwrap();
    let result = LocalFs::new().delete_file(&dir.path().join("index.lock"));
    assert!(result.is_err(), "Deleting a missing file should fail");
}

#[test]
fn remove_recursively_leaves_siblings_alone() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("checkout");
    let sibling = dir.path().join("neighbour");
    fs::create_dir_all(target.join(".git/objects")).unwrap();
    fs::write(target.join(".git/index.lock"), "").unwrap();
    fs::create_dir(&sibling).unwrap();

    LocalFs::new()
        .with_removal_budget(Duration::from_millis(100))
        .remove_recursively(&target)
        .unwrap();

    assert!(!target.exists());
    assert!(sibling.exists());
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    fn is_root() -> bool {
        match std::process::Command::new("id").arg("-u").output() {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }

    #[test]
    fn exists_surfaces_permission_denied() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, Permissions::from_mode(0o000)).unwrap();

        let result = LocalFs::new().exists(&locked.join("inner"));

        // Restore so TempDir can clean up
        fs::set_permissions(&locked, Permissions::from_mode(0o755)).unwrap();

        let err = result.expect_err("permission denied must not read as absent");
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn remove_recursively_permanent_failure_is_reported() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let parent = dir.path().join("parent");
        let child = parent.join("child");
        fs::create_dir_all(&child).unwrap();
        fs::set_permissions(&parent, Permissions::from_mode(0o555)).unwrap();

        let result = LocalFs::new()
            .with_removal_budget(Duration::from_millis(100))
            .remove_recursively(&child);

        fs::set_permissions(&parent, Permissions::from_mode(0o755)).unwrap();

        assert!(result.is_err());
    }
}
