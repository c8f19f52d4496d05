//! Destination existence probe

use std::path::Path;
use std::sync::Arc;

use repo_fs::Filesystem;

use crate::host::Host;
use crate::{Error, Result};

/// Whether the destination already holds something.
///
/// Computed fresh on every sync; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationState {
    Absent,
    /// Assumed to be a previous checkout, possibly dirty.
    Present,
}

impl DestinationState {
    /// Inspect `path`. Anything other than "not found" is an error, never
    /// a silent `Absent`.
    pub fn probe(fs: &dyn Filesystem, path: &Path) -> Result<Self> {
        match fs.exists(path) {
            Ok(true) => Ok(Self::Present),
            Ok(false) => Ok(Self::Absent),
            Err(source) => Err(Error::Probe {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// [`DestinationState::probe`] on the blocking pool, like every other
    /// filesystem call the engine makes.
    pub async fn inspect(host: &Host, path: &Path) -> Result<Self> {
        let fs = Arc::clone(&host.fs);
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::probe(fs.as_ref(), &owned))
            .await
            .map_err(|e| Error::Probe {
                path: path.to_path_buf(),
                source: repo_fs::Error::io(path, std::io::Error::other(e)),
            })?
    }
}
