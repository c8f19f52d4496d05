//! Process invocation
//!
//! Output of the child is inherited (streamed live to the terminal) and
//! never inspected. Only the exit status decides success.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::command::CommandSpec;
use crate::error::{Error, Result};

/// Runs an external command to completion in a working directory.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec, cwd: &Path) -> Result<()>;
}

/// [`ProcessRunner`] that spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec, cwd: &Path) -> Result<()> {
        tracing::debug!(command = %command, cwd = %cwd.display(), "Running command");

        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| Error::Spawn {
                command: command.to_string(),
                cwd: cwd.to_path_buf(),
                source,
            })?;

        if !status.success() {
            return Err(Error::CommandFailed {
                command: command.to_string(),
                cwd: cwd.to_path_buf(),
                code: status.code(),
            });
        }

        Ok(())
    }
}
