//! Repository sync orchestration
//!
//! Brings a destination directory to a clean, up-to-date checkout of a
//! repository with its dependencies installed. Three sequences are possible:
//!
//! - **Clean install** when the caller asks for it
//! - **Fresh clone** when the destination does not exist
//! - **Update** of an existing checkout, falling back to a clean install
//!   once if any required update step fails
//!
//! # Architecture
//!
//! ```text
//!               SyncEngine
//!                   |
//!               Dispatch  (inline | thread worker | process worker)
//!                   |
//!               Selector -- probe
//!                   |
//!               TaskQueue
//!                   |
//!               Operation
//!                /      \
//!          repo-fs      repo-git
//! ```
//!
//! # Example
//!
//! ```no_run
//! use repo_sync::{SyncEngine, SyncConfig, SyncRequest};
//!
//! # async fn example() -> repo_sync::Result<()> {
//! let engine = SyncEngine::local(SyncConfig::default())?;
//! let report = engine
//!     .sync(SyncRequest::new("https://example.com/app.git", "/srv/apps/app"))
//!     .await?;
//! println!("{}", report.path);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod host;
pub mod operation;
pub mod probe;
pub mod queue;
pub mod request;
pub mod strategy;

pub use config::{DispatchMode, SyncConfig, WorkerConfig};
pub use dispatch::{
    Delegate, Dispatch, ProcessWorker, RuntimeCapability, ThreadWorker, WorkerJob, WorkerReport,
    serve_request,
};
pub use engine::{SyncEngine, sync};
pub use error::{Error, ErrorKind, Failure, OperationError, RemoteError, Result};
pub use host::Host;
pub use operation::{Action, Operation, Step, Tolerance};
pub use probe::DestinationState;
pub use queue::TaskQueue;
pub use request::{SyncOptions, SyncRequest, Target};
pub use strategy::{Plan, Selector, SyncPath, SyncReport};
