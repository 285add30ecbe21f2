//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::DeployConfig;

// ── Value Types ───────────────────────────────────────────────────────────────

/// A shell command line to run on the target, with optional stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    /// Command line interpreted by the target's POSIX shell.
    pub script: String,
    /// Bytes piped to the command's stdin.
    pub stdin: Option<Vec<u8>>,
}

impl RemoteCommand {
    #[must_use]
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            stdin: None,
        }
    }

    #[must_use]
    pub fn with_stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

// ── Remote Port Traits ────────────────────────────────────────────────────────

/// Runs one command on the target and waits for it to finish.
///
/// `Err` means the command could not be issued at all (transport failure);
/// a command that ran and failed comes back as `Ok` with a non-zero status.
#[allow(async_fn_in_trait)]
pub trait RemoteExecutor {
    /// Run a command and capture its exit status and output.
    async fn run(&self, command: &RemoteCommand) -> Result<Output>;
}

/// Host-to-target file transfer operations.
#[allow(async_fn_in_trait)]
pub trait FileTransfer {
    /// Copy a single file into the remote directory or path.
    async fn transfer(&self, local: &Path, remote: &str) -> Result<Output>;
    /// Recursively copy a directory into the remote directory.
    async fn transfer_recursive(&self, local: &Path, remote: &str) -> Result<Output>;
}

/// Composite trait — everything the pipeline needs from the target.
pub trait Target: RemoteExecutor + FileTransfer {}

/// Blanket implementation: any executor that can also transfer files is a `Target`.
impl<T> Target for T where T: RemoteExecutor + FileTransfer {}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts local process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations apply their configured default timeout, if any.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts loading the deployment configuration.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when no file exists.
    fn load(&self) -> Result<DeployConfig>;
    /// The file the configuration is (or would be) read from.
    fn path(&self) -> Result<PathBuf>;
}
