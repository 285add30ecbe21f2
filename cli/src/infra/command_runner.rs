//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` spawns local processes (`ssh`, `scp`) with tokio and
//! captures their output. Remote work can legitimately take a long time
//! (`apt-get`, `pip`), so only `run_with_timeout` bounds a command.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Child;

use crate::application::ports::CommandRunner;

/// Production `CommandRunner`.
///
/// With an explicit timeout the child is killed through `tokio::select!`;
/// dropping the wait future alone would leave the process running.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        tracing::trace!(program, ?args, "spawn");
        let child = spawn(program, args, Stdio::null())?;
        wait_output(child, program, None, None).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::trace!(program, ?args, ?timeout, "spawn");
        let child = spawn(program, args, Stdio::null())?;
        wait_output(child, program, Some(timeout), None).await
    }

    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output> {
        tracing::trace!(program, ?args, stdin_bytes = input.len(), "spawn");
        let child = spawn(program, args, Stdio::piped())?;
        wait_output(child, program, None, Some(input.to_vec())).await
    }
}

fn spawn(program: &str, args: &[&str], stdin: Stdio) -> Result<Child> {
    tokio::process::Command::new(program)
        .args(args)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))
}

/// Feed stdin, drain stdout and stderr concurrently, and wait for exit.
async fn wait_output(
    mut child: Child,
    program: &str,
    timeout: Option<Duration>,
    input: Option<Vec<u8>>,
) -> Result<Output> {
    let stdin_handle = child.stdin.take();
    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();

    let collect = async {
        let (status, stdout, stderr, ()) = tokio::join!(
            child.wait(),
            async {
                let mut buf = Vec::new();
                if let Some(ref mut h) = stdout_handle {
                    let _ = h.read_to_end(&mut buf).await;
                }
                buf
            },
            async {
                let mut buf = Vec::new();
                if let Some(ref mut h) = stderr_handle {
                    let _ = h.read_to_end(&mut buf).await;
                }
                buf
            },
            async {
                // Dropping the handle closes the pipe so the child sees EOF.
                if let (Some(mut stdin), Some(input)) = (stdin_handle, input) {
                    let _ = stdin.write_all(&input).await;
                }
            },
        );
        Ok::<_, anyhow::Error>(Output {
            status: status.with_context(|| format!("waiting for {program}"))?,
            stdout,
            stderr,
        })
    };

    let Some(timeout) = timeout else {
        return collect.await;
    };

    tokio::select! {
        result = collect => result,
        () = tokio::time::sleep(timeout) => {
            let _ = child.kill().await;
            anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
        }
    }
}
