//! Filesystem primitives used by the sync engine
//!
//! The engine never touches `std::fs` directly; it goes through the
//! [`Filesystem`] trait so that tests can script every outcome.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

use crate::{Error, Result};

/// Filesystem capabilities consumed by the sync engine.
pub trait Filesystem: Send + Sync {
    /// Whether `path` exists. Symlinks are followed.
    ///
    /// Only "not found" maps to `false`; every other failure is an error.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Create `path` and any missing parents.
    fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Remove a file or directory tree. A missing path is not an error.
    fn remove_recursively(&self, path: &Path) -> Result<()>;

    /// Names of the entries directly inside `path`.
    fn list_entries(&self, path: &Path) -> Result<Vec<String>>;

    /// Delete a single file.
    fn delete_file(&self, path: &Path) -> Result<()>;
}

/// [`Filesystem`] backed by the local disk.
#[derive(Debug, Clone)]
pub struct LocalFs {
    removal_budget: Duration,
}

impl Default for LocalFs {
    fn default() -> Self {
        Self {
            removal_budget: Duration::from_secs(2),
        }
    }
}

impl LocalFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override how long transient removal failures are retried.
    pub fn with_removal_budget(mut self, budget: Duration) -> Self {
        self.removal_budget = budget;
        self
    }
}

/// Errors worth retrying while tearing down a tree: another process may
/// still hold a handle or be writing into the directory.
fn is_transient(kind: ErrorKind) -> bool {
    match kind {
        ErrorKind::DirectoryNotEmpty | ErrorKind::ResourceBusy => true,
        ErrorKind::PermissionDenied => cfg!(windows),
        _ => false,
    }
}

fn remove_once(path: &Path) -> std::io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

impl Filesystem for LocalFs {
    fn exists(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))
    }

    fn remove_recursively(&self, path: &Path) -> Result<()> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(50))
            .with_max_elapsed_time(Some(self.removal_budget))
            .build();

        backoff::retry(policy, || {
            remove_once(path).map_err(|e| {
                if is_transient(e.kind()) {
                    tracing::debug!(path = %path.display(), error = %e, "Retrying removal");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .map_err(|e| match e {
            backoff::Error::Permanent(source) => Error::io(path, source),
            backoff::Error::Transient { err, .. } => Error::io(path, err),
        })
    }

    fn list_entries(&self, path: &Path) -> Result<Vec<String>> {
        let entries = fs::read_dir(path).map_err(|e| Error::io(path, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(path, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| Error::io(path, e))
    }
}
