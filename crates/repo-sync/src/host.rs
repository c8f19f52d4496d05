//! Collaborators the engine calls into

use std::fmt;
use std::sync::Arc;

use repo_fs::{Filesystem, LocalFs};
use repo_git::{ProcessRunner, SystemRunner};

/// Filesystem and process capabilities shared by every operation.
///
/// Cheap to clone; worker contexts get their own handle.
#[derive(Clone)]
pub struct Host {
    pub fs: Arc<dyn Filesystem>,
    pub runner: Arc<dyn ProcessRunner>,
}

impl Host {
    pub fn new(fs: Arc<dyn Filesystem>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { fs, runner }
    }

    /// Local disk and real child processes.
    pub fn local() -> Self {
        Self::new(Arc::new(LocalFs::new()), Arc::new(SystemRunner::new()))
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
