//! Sync entry points

use std::path::PathBuf;
use std::sync::Arc;

use crate::Result;
use crate::config::SyncConfig;
use crate::dispatch::Dispatch;
use crate::host::Host;
use crate::request::{SyncOptions, SyncRequest};
use crate::strategy::SyncReport;

/// Entry point for syncing checkouts.
///
/// The dispatch is decided when the engine is built, from the configured
/// [`DispatchMode`](crate::DispatchMode) and the runtime the constructor is
/// called on.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    host: Host,
    config: Arc<SyncConfig>,
    dispatch: Dispatch,
}

impl SyncEngine {
    pub fn new(host: Host, config: SyncConfig) -> Result<Self> {
        let config = Arc::new(config);
        let dispatch = Dispatch::detect(&host, &config)?;
        Ok(Self {
            host,
            config,
            dispatch,
        })
    }

    /// Local disk and real processes.
    pub fn local(config: SyncConfig) -> Result<Self> {
        Self::new(Host::local(), config)
    }

    /// Replace the detected dispatch.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Bring `request.destination` to a clean, up-to-date checkout with
    /// dependencies installed.
    pub async fn sync(&self, request: SyncRequest) -> Result<SyncReport> {
        request.validate()?;

        tracing::info!(
            repository = %request.repository,
            destination = %request.destination.display(),
            clean = request.options.clean,
            dispatch = %self.dispatch,
            "Syncing repository"
        );

        let report = self.dispatch.run(&self.host, &self.config, request).await?;

        match &report.recovered_from {
            Some(cause) => tracing::info!(path = %report.path, recovered_from = %cause, "Sync complete"),
            None => tracing::info!(path = %report.path, "Sync complete"),
        }
        Ok(report)
    }
}

/// Sync one checkout with the resolved user configuration and local
/// collaborators.
pub async fn sync(
    repository: impl Into<String>,
    destination: impl Into<PathBuf>,
    options: SyncOptions,
) -> Result<SyncReport> {
    let engine = SyncEngine::local(SyncConfig::resolve(None)?)?;
    engine
        .sync(SyncRequest::new(repository, destination).with_options(options))
        .await
}
