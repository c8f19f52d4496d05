//! Git and process invocation for repo-sync
//!
//! Wraps the `git` CLI and arbitrary install commands as child processes.
//! Nothing here inspects tool output; callers only see success or failure.

pub mod cli;
pub mod command;
pub mod error;
pub mod locks;
pub mod runner;

pub use cli::GitCli;
pub use command::CommandSpec;
pub use error::{Error, Result};
pub use runner::{ProcessRunner, SystemRunner};
