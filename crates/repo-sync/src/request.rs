//! Sync request and options

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Options recognised by a sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Discard the destination and reinstall from a fresh clone, whatever
    /// state it is in.
    pub clean: bool,
}

impl SyncOptions {
    pub fn clean() -> Self {
        Self { clean: true }
    }
}

/// One sync invocation: what to clone, where, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Anything `git clone` accepts (URL, scp-style address, local path).
    pub repository: String,
    /// Absolute path of the checkout.
    pub destination: PathBuf,
    #[serde(default)]
    pub options: SyncOptions,
}

impl SyncRequest {
    pub fn new(repository: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            repository: repository.into(),
            destination: destination.into(),
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Reject requests no sequence could act on.
    pub fn validate(&self) -> Result<()> {
        self.target().map(|_| ())
    }

    /// Validate the request and split the destination into the pieces the
    /// operations need.
    pub fn target(&self) -> Result<Target> {
        let repository = self.repository.trim();
        if repository.is_empty() {
            return Err(invalid("repository reference is empty"));
        }
        if !self.destination.is_absolute() {
            return Err(invalid(format!(
                "destination must be an absolute path, got {}",
                self.destination.display()
            )));
        }

        let name = self
            .destination
            .file_name()
            .ok_or_else(|| {
                invalid(format!(
                    "destination {} has no directory name",
                    self.destination.display()
                ))
            })?
            .to_str()
            .ok_or_else(|| {
                invalid(format!(
                    "destination {} is not valid UTF-8",
                    self.destination.display()
                ))
            })?
            .to_string();

        let parent = self
            .destination
            .parent()
            .ok_or_else(|| {
                invalid(format!(
                    "destination {} has no parent directory",
                    self.destination.display()
                ))
            })?
            .to_path_buf();

        Ok(Target {
            repository: repository.to_string(),
            destination: self.destination.clone(),
            parent,
            name,
        })
    }
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidRequest {
        reason: reason.into(),
    }
}

/// A validated destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub repository: String,
    pub destination: PathBuf,
    /// Directory the clone runs from.
    pub parent: PathBuf,
    /// Final path component, passed to `git clone` as the directory name.
    pub name: String,
}

impl Target {
    /// The git metadata directory of the checkout.
    pub fn git_dir(&self) -> PathBuf {
        self.destination.join(repo_git::locks::GIT_DIR)
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}
