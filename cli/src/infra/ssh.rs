//! Infrastructure implementation of the remote port traits over OpenSSH.
//!
//! `SshTarget<R>` routes every remote command through the local `ssh` binary
//! and every copy through `scp`, both via a `CommandRunner`. Authentication
//! is whatever the user's ssh setup provides (keys, agent, `~/.ssh/config`);
//! `BatchMode` turns a password prompt into a connection failure.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, FileTransfer, RemoteCommand, RemoteExecutor};
use crate::domain::DeploymentTarget;
use crate::infra::command_runner::TokioCommandRunner;

/// Seconds ssh waits for the TCP connection before giving up.
pub const CONNECT_TIMEOUT_SECS: u32 = 10;

/// Remote ports backed by `ssh` / `scp`.
///
/// Generic over `R: CommandRunner` so tests can inject a recording runner.
pub struct SshTarget<R: CommandRunner> {
    runner: R,
    target: DeploymentTarget,
}

impl<R: CommandRunner> SshTarget<R> {
    pub fn new(runner: R, target: DeploymentTarget) -> Self {
        Self { runner, target }
    }

    /// Options shared by `ssh` and `scp`.
    fn common_options() -> Vec<String> {
        vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}"),
        ]
    }

    /// Full `ssh` argument list for one remote script.
    #[must_use]
    pub fn ssh_args(&self, script: &str) -> Vec<String> {
        let mut args = Self::common_options();
        args.extend([
            "-p".to_string(),
            self.target.port.to_string(),
            self.target.login(),
            "--".to_string(),
            script.to_string(),
        ]);
        args
    }

    /// Full `scp` argument list for one copy.
    #[must_use]
    pub fn scp_args(&self, local: &Path, remote: &str, recursive: bool) -> Vec<String> {
        let mut args = vec!["-q".to_string()];
        if recursive {
            args.push("-r".to_string());
        }
        args.extend(Self::common_options());
        args.extend([
            "-P".to_string(),
            self.target.port.to_string(),
            local.display().to_string(),
            format!("{}:{remote}", self.target.login()),
        ]);
        args
    }

    async fn scp(&self, local: &Path, remote: &str, recursive: bool) -> Result<Output> {
        let args = self.scp_args(local, remote, recursive);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        tracing::debug!(local = %local.display(), remote, recursive, "scp");
        self.runner
            .run("scp", &refs)
            .await
            .with_context(|| format!("scp {}", local.display()))
    }
}

impl SshTarget<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn connect(target: DeploymentTarget) -> Self {
        Self::new(TokioCommandRunner::new(), target)
    }
}

impl<R: CommandRunner> RemoteExecutor for SshTarget<R> {
    async fn run(&self, command: &RemoteCommand) -> Result<Output> {
        let args = self.ssh_args(&command.script);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = match &command.stdin {
            Some(input) => self.runner.run_with_stdin("ssh", &refs, input).await,
            None => self.runner.run("ssh", &refs).await,
        };
        result.with_context(|| format!("ssh {}", self.target.login()))
    }
}

impl<R: CommandRunner> FileTransfer for SshTarget<R> {
    async fn transfer(&self, local: &Path, remote: &str) -> Result<Output> {
        self.scp(local, remote, false).await
    }

    async fn transfer_recursive(&self, local: &Path, remote: &str) -> Result<Output> {
        self.scp(local, remote, true).await
    }
}
