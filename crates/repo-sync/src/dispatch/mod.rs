//! Inline or delegated execution of the strategy selector
//!
//! A [`Dispatch`] is chosen once per [`SyncEngine`](crate::SyncEngine) and
//! never changes afterwards. Both variants take a [`SyncRequest`] and give
//! back the same `Result<SyncReport>` the selector would have produced.

mod process;
mod thread;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::Result;
use crate::config::{DispatchMode, SyncConfig};
use crate::host::Host;
use crate::request::SyncRequest;
use crate::strategy::{Selector, SyncReport};

pub use process::{ProcessWorker, WorkerJob, WorkerReport, serve_request};
pub use thread::ThreadWorker;

/// Runs a sync somewhere other than the caller's task.
#[async_trait]
pub trait Delegate: Send + Sync + fmt::Debug {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    async fn delegate(&self, request: SyncRequest) -> Result<SyncReport>;
}

/// What the caller's async context can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeCapability {
    /// Multi-threaded tokio runtime: blocking pool and process driver are
    /// shared, the sync can run on the caller's task.
    MultiThread,
    CurrentThread,
    /// Not inside a tokio runtime.
    NoRuntime,
}

impl RuntimeCapability {
    pub fn detect() -> Self {
        match Handle::try_current() {
            Ok(handle) => match handle.runtime_flavor() {
                RuntimeFlavor::MultiThread => Self::MultiThread,
                _ => Self::CurrentThread,
            },
            Err(_) => Self::NoRuntime,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Dispatch {
    Inline,
    Delegated(Arc<dyn Delegate>),
}

impl Dispatch {
    /// Pick the dispatch for `mode`. `Auto` runs inline only on a
    /// multi-threaded runtime and hands everything else to a worker thread.
    pub fn select(
        mode: DispatchMode,
        capability: RuntimeCapability,
        host: &Host,
        config: &Arc<SyncConfig>,
    ) -> Result<Self> {
        let dispatch = match mode {
            DispatchMode::Inline => Self::Inline,
            DispatchMode::Thread => Self::thread(host, config),
            DispatchMode::Process => {
                Self::Delegated(Arc::new(ProcessWorker::from_config(Arc::clone(config))?))
            }
            DispatchMode::Auto => match capability {
                RuntimeCapability::MultiThread => Self::Inline,
                RuntimeCapability::CurrentThread | RuntimeCapability::NoRuntime => {
                    Self::thread(host, config)
                }
            },
        };

        tracing::debug!(mode = %mode, ?capability, dispatch = %dispatch, "Selected dispatch");
        Ok(dispatch)
    }

    /// [`Dispatch::select`] against the runtime the caller is on right now.
    pub fn detect(host: &Host, config: &Arc<SyncConfig>) -> Result<Self> {
        Self::select(config.dispatch, RuntimeCapability::detect(), host, config)
    }

    fn thread(host: &Host, config: &Arc<SyncConfig>) -> Self {
        Self::Delegated(Arc::new(ThreadWorker::new(host.clone(), Arc::clone(config))))
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline)
    }

    pub(crate) async fn run(
        &self,
        host: &Host,
        config: &SyncConfig,
        request: SyncRequest,
    ) -> Result<SyncReport> {
        match self {
            Self::Inline => Selector::new(host, config).run(&request).await,
            Self::Delegated(worker) => worker.delegate(request).await,
        }
    }
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("inline"),
            Self::Delegated(worker) => f.write_str(worker.name()),
        }
    }
}
