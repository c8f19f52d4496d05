//! Scripted collaborators that record every call into a shared [`Journal`].
//!
//! Filesystem calls are journaled as `"<call> <path>"` (`exists`,
//! `ensure_dir`, `remove`, `list`, `delete`). Commands are journaled as
//! their display form, e.g. `"git pull --rebase"`. Both doubles can share one
//! journal so a test sees the interleaved order of everything the engine did.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use repo_fs::Filesystem;
use repo_git::{CommandSpec, ProcessRunner};

/// Ordered, shareable log of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Entries starting with `prefix`.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// In-memory [`Filesystem`] with scripted failures.
#[derive(Debug, Default)]
pub struct ScriptedFs {
    journal: Journal,
    present: Mutex<HashSet<PathBuf>>,
    listings: Mutex<HashMap<PathBuf, Vec<String>>>,
    failures: Mutex<Vec<(String, io::ErrorKind)>>,
}

impl ScriptedFs {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    /// Mark `path` as existing.
    pub fn with_present(self, path: impl Into<PathBuf>) -> Self {
        self.present.lock().unwrap().insert(path.into());
        self
    }

    /// Give directory `path` the listed entry names (marks it present).
    pub fn with_listing(self, path: impl Into<PathBuf>, names: &[&str]) -> Self {
        let path = path.into();
        self.present.lock().unwrap().insert(path.clone());
        self.listings
            .lock()
            .unwrap()
            .insert(path, names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Fail every call whose journal entry starts with `prefix`.
    pub fn fail_on(self, prefix: impl Into<String>, kind: io::ErrorKind) -> Self {
        self.failures.lock().unwrap().push((prefix.into(), kind));
        self
    }

    pub fn is_present(&self, path: &Path) -> bool {
        self.present.lock().unwrap().contains(path)
    }

    /// Entry names currently listed under `path`.
    pub fn listing(&self, path: &Path) -> Vec<String> {
        self.listings
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    fn call(&self, name: &str, path: &Path) -> repo_fs::Result<()> {
        let entry = format!("{name} {}", path.display());
        self.journal.record(entry.clone());
        let failures = self.failures.lock().unwrap();
        match failures.iter().find(|(prefix, _)| entry.starts_with(prefix)) {
            Some((_, kind)) => Err(repo_fs::Error::io(
                path,
                io::Error::new(*kind, "scripted failure"),
            )),
            None => Ok(()),
        }
    }
}

impl Filesystem for ScriptedFs {
    fn exists(&self, path: &Path) -> repo_fs::Result<bool> {
        self.call("exists", path)?;
        Ok(self.is_present(path))
    }

    fn ensure_dir(&self, path: &Path) -> repo_fs::Result<()> {
        self.call("ensure_dir", path)?;
        self.present.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn remove_recursively(&self, path: &Path) -> repo_fs::Result<()> {
        self.call("remove", path)?;
        self.present.lock().unwrap().retain(|p| !p.starts_with(path));
        self.listings.lock().unwrap().retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn list_entries(&self, path: &Path) -> repo_fs::Result<Vec<String>> {
        self.call("list", path)?;
        self.listings
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                repo_fs::Error::io(path, io::Error::new(io::ErrorKind::NotFound, "no listing"))
            })
    }

    fn delete_file(&self, path: &Path) -> repo_fs::Result<()> {
        self.call("delete", path)?;
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let name = name.to_string_lossy();
            if let Some(names) = self.listings.lock().unwrap().get_mut(parent) {
                names.retain(|n| *n != name);
            }
        }
        Ok(())
    }
}

/// [`ProcessRunner`] that records commands instead of running them.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    journal: Journal,
    calls: Mutex<Vec<(String, PathBuf)>>,
    failures: Mutex<Vec<(String, usize)>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    /// Fail every command whose display form starts with `prefix`.
    pub fn fail_on(self, prefix: impl Into<String>) -> Self {
        self.failures.lock().unwrap().push((prefix.into(), usize::MAX));
        self
    }

    /// Fail only the first `times` matching commands.
    pub fn fail_times(self, prefix: impl Into<String>, times: usize) -> Self {
        self.failures.lock().unwrap().push((prefix.into(), times));
        self
    }

    /// Sleep this long inside every command.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every command run so far with its working directory.
    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of commands observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn should_fail(&self, command: &str) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures
            .iter_mut()
            .find(|(prefix, remaining)| command.starts_with(prefix.as_str()) && *remaining > 0)
        {
            Some((_, remaining)) => {
                if *remaining != usize::MAX {
                    *remaining -= 1;
                }
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, command: &CommandSpec, cwd: &Path) -> repo_git::Result<()> {
        let display = command.to_string();
        self.journal.record(display.clone());
        self.calls
            .lock()
            .unwrap()
            .push((display.clone(), cwd.to_path_buf()));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.should_fail(&display) {
            return Err(repo_git::Error::CommandFailed {
                command: display,
                cwd: cwd.to_path_buf(),
                code: Some(1),
            });
        }
        Ok(())
    }
}
