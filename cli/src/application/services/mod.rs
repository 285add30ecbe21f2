//! Application services — one module per pipeline stage, plus diagnostics.
//!
//! Services import only from `crate::domain` and `crate::application`.
//! All target I/O is routed through the injected port traits.

pub mod doctor;
pub mod hardware;
pub mod installer;
pub mod precheck;
pub mod transfer;
pub mod udev_rules;

use std::process::Output;

use crate::application::ports::{RemoteCommand, RemoteExecutor};

/// Run a command on the target and require a zero exit status.
///
/// On failure returns a one-line description suitable for an error message:
/// the transport error, or the exit status plus the last line of output.
pub(crate) async fn run_checked(
    remote: &impl RemoteExecutor,
    command: &RemoteCommand,
) -> Result<Output, String> {
    tracing::debug!(script = %command.script, stdin = command.stdin.is_some(), "remote command");
    match remote.run(command).await {
        Ok(output) if output.status.success() => Ok(output),
        Ok(output) => {
            tracing::debug!(script = %command.script, status = ?output.status.code(), "remote command failed");
            Err(failure_detail(&output))
        }
        Err(e) => Err(format!("{e:#}")),
    }
}

/// Run a command whose exit status is an answer rather than a failure
/// (`test -e`, `grep -q`). Transport errors are still errors.
pub(crate) async fn run_probe(
    remote: &impl RemoteExecutor,
    command: &RemoteCommand,
) -> Result<bool, String> {
    tracing::debug!(script = %command.script, "remote probe");
    remote
        .run(command)
        .await
        .map(|output| output.status.success())
        .map_err(|e| format!("{e:#}"))
}

/// `exit status N: <last line of stderr, or stdout>`.
pub(crate) fn failure_detail(output: &Output) -> String {
    let status = output
        .status
        .code()
        .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit status {c}"));
    match last_line(&output.stderr).or_else(|| last_line(&output.stdout)) {
        Some(line) => format!("{status}: {line}"),
        None => status,
    }
}

fn last_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod test_support;
