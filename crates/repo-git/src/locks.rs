//! Stale lock files left in the git metadata directory by killed processes

/// Name of the git metadata directory inside a checkout.
pub const GIT_DIR: &str = ".git";

const LOCK_SUFFIX: &str = ".lock";

/// Whether a `.git` entry name is a lock file (`index.lock`, `HEAD.lock`, ...).
pub fn is_lock_file(name: &str) -> bool {
    name.len() > LOCK_SUFFIX.len() && name.ends_with(LOCK_SUFFIX)
}

/// Filter directory entry names down to lock files.
pub fn lock_files<'a>(entries: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    entries.into_iter().filter(|n| is_lock_file(n)).collect()
}
