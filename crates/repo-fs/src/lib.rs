//! Filesystem abstraction for repo-sync
//!
//! Provides the filesystem primitives the sync engine calls into and
//! format-agnostic configuration loading.

pub mod config;
pub mod error;
pub mod local;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use local::{Filesystem, LocalFs};
