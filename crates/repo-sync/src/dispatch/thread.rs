use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::Delegate;
use crate::config::SyncConfig;
use crate::host::Host;
use crate::request::SyncRequest;
use crate::strategy::{Selector, SyncReport};
use crate::{Error, Result};

const THREAD_NAME: &str = "repo-sync-worker";

/// Runs each sync on a fresh OS thread that owns a current-thread runtime.
///
/// The caller only awaits a oneshot receiver, so any executor can drive it.
#[derive(Debug, Clone)]
pub struct ThreadWorker {
    host: Host,
    config: Arc<SyncConfig>,
}

impl ThreadWorker {
    pub fn new(host: Host, config: Arc<SyncConfig>) -> Self {
        Self { host, config }
    }
}

#[async_trait]
impl Delegate for ThreadWorker {
    fn name(&self) -> &'static str {
        "thread"
    }

    async fn delegate(&self, request: SyncRequest) -> Result<SyncReport> {
        let (tx, rx) = oneshot::channel();
        let host = self.host.clone();
        let config = Arc::clone(&self.config);

        std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let result = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(|e| Error::worker(format!("cannot start worker runtime: {e}")))
                    .and_then(|runtime| {
                        runtime.block_on(Selector::new(&host, &config).run(&request))
                    });
                // Receiver gone means the caller stopped waiting
                let _ = tx.send(result);
            })
            .map_err(|e| Error::worker(format!("cannot spawn worker thread: {e}")))?;

        rx.await
            .map_err(|_| Error::worker("worker thread exited without reporting"))?
    }
}
