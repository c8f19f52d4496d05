//! Sync configuration
//!
//! Loaded from TOML, JSON or YAML (by extension). Every field is optional:
//!
//! ```toml
//! git = "git"
//! dispatch = "auto"      # auto | inline | thread | process
//!
//! [install]
//! program = "npm"
//! args = ["install", "--silent"]
//!
//! [worker]
//! program = "/usr/local/bin/repo-sync"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use repo_fs::ConfigStore;
use repo_git::{CommandSpec, GitCli};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Where the orchestration runs relative to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Decide from the hosting runtime.
    #[default]
    Auto,
    Inline,
    /// Dedicated OS thread with its own runtime.
    Thread,
    /// Separate worker process.
    Process,
}

impl DispatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Inline => "inline",
            Self::Thread => "thread",
            Self::Process => "process",
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "inline" => Ok(Self::Inline),
            "thread" => Ok(Self::Thread),
            "process" => Ok(Self::Process),
            other => Err(format!(
                "unknown dispatch mode '{other}' (expected auto, inline, thread or process)"
            )),
        }
    }
}

/// Worker process settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Program to re-invoke; defaults to the current executable.
    pub program: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// git executable
    pub git: String,
    pub dispatch: DispatchMode,
    /// Dependency install command, run inside the checkout.
    pub install: CommandSpec,
    pub worker: WorkerConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            dispatch: DispatchMode::default(),
            install: CommandSpec::new("npm").args(["install", "--silent"]),
            worker: WorkerConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        ConfigStore::new().load(path).map_err(Error::Config)
    }

    /// Per-user config location (`<config dir>/repo-sync/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("repo-sync").join("config.toml"))
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must load. Otherwise the per-user file is used when
    /// present, and built-in defaults when not.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "Loading explicit config");
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Loading user config");
                Self::load(&path)
            }
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn git_cli(&self) -> GitCli {
        GitCli::new(&self.git)
    }
}
