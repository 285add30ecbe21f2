//! Shared test helpers for stage service tests.
//!
//! Provides cross-platform `exit_status()`, canned outputs, and a scripted
//! target that records every command it is asked to run.

use std::path::Path;
use std::process::Output;
use std::sync::Mutex;

use anyhow::Result;

use crate::application::ports::{FileTransfer, ProgressReporter, RemoteCommand, RemoteExecutor};

/// Build an `ExitStatus` from a logical exit code (cross-platform).
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    exit_output(0, stdout, b"")
}

pub fn fail_output() -> Output {
    exit_output(1, b"", b"")
}

pub fn exit_output(code: i32, stdout: &[u8], stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.to_vec(),
        stderr: stderr.to_vec(),
    }
}

/// Target whose responses come from a closure; records every call.
///
/// File transfers are recorded as `transfer <local> <remote>` (or
/// `transfer -r ...`) so tests can assert on one ordered log.
pub struct ScriptedRemote<F> {
    respond: F,
    calls: Mutex<Vec<RemoteCommand>>,
}

impl<F> ScriptedRemote<F>
where
    F: Fn(&RemoteCommand) -> Result<Output>,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn scripts(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .map(|c| c.script.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<RemoteCommand> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, command: RemoteCommand) -> Result<Output> {
        let result = (self.respond)(&command);
        self.calls.lock().expect("lock").push(command);
        result
    }
}

impl<F> RemoteExecutor for ScriptedRemote<F>
where
    F: Fn(&RemoteCommand) -> Result<Output>,
{
    async fn run(&self, command: &RemoteCommand) -> Result<Output> {
        self.record(command.clone())
    }
}

impl<F> FileTransfer for ScriptedRemote<F>
where
    F: Fn(&RemoteCommand) -> Result<Output>,
{
    async fn transfer(&self, local: &Path, remote: &str) -> Result<Output> {
        self.record(RemoteCommand::new(format!("transfer {} {remote}", local.display())))
    }

    async fn transfer_recursive(&self, local: &Path, remote: &str) -> Result<Output> {
        self.record(RemoteCommand::new(format!("transfer -r {} {remote}", local.display())))
    }
}

/// Reporter that records warnings and ignores everything else.
#[derive(Default)]
pub struct RecordingReporter {
    pub warnings: Mutex<Vec<String>>,
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, message: &str) {
        self.warnings.lock().expect("lock").push(message.to_string());
    }
}
