//! Unit tests for `SshTarget` argument construction.
//!
//! A recording `CommandRunner` captures every `(program, args)` pair so the
//! exact `ssh`/`scp` invocations can be asserted without a network.

use std::path::Path;
use std::process::Output;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use cane_deploy::application::ports::{CommandRunner, FileTransfer, RemoteCommand, RemoteExecutor};
use cane_deploy::domain::DeploymentTarget;
use cane_deploy::infra::ssh::SshTarget;
use proptest::prelude::*;

use crate::helpers::ok_output;

// ─── MockCommandRunner ────────────────────────────────────────────────────────

/// One recorded invocation: program, args and piped stdin.
type Call = (String, Vec<String>, Option<Vec<u8>>);

#[derive(Clone)]
struct MockCommandRunner {
    calls: Arc<Mutex<Vec<Call>>>,
    result: Arc<dyn Fn() -> Result<Output> + Send + Sync>,
}

impl MockCommandRunner {
    fn new_ok() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            result: Arc::new(|| Ok(ok_output(b""))),
        }
    }

    fn new_err(msg: &'static str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            result: Arc::new(move || bail!("{msg}")),
        }
    }

    fn recorded_calls(&self) -> Vec<Call> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    fn record(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Result<Output> {
        self.calls.lock().expect("mutex poisoned").push((
            program.to_owned(),
            args.iter().map(|s| (*s).to_string()).collect(),
            stdin.map(<[u8]>::to_vec),
        ));
        (self.result)()
    }
}

impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.record(program, args, None)
    }

    async fn run_with_timeout(&self, program: &str, args: &[&str], _timeout: Duration) -> Result<Output> {
        self.record(program, args, None)
    }

    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output> {
        self.record(program, args, Some(stdin))
    }
}

fn target() -> DeploymentTarget {
    DeploymentTarget {
        host: "stick.local".to_string(),
        user: "pi".to_string(),
        port: 2222,
        ..DeploymentTarget::default()
    }
}

// ─── ssh ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_invokes_ssh_with_batch_mode_and_port() {
    let runner = MockCommandRunner::new_ok();
    let remote = SshTarget::new(runner.clone(), target());

    remote.run(&RemoteCommand::new("id -nG pi")).await.expect("run");

    let calls = runner.recorded_calls();
    assert_eq!(calls.len(), 1);
    let (program, args, stdin) = &calls[0];
    assert_eq!(program, "ssh");
    assert_eq!(
        args,
        &[
            "-o",
            "BatchMode=yes",
            "-o",
            "ConnectTimeout=10",
            "-p",
            "2222",
            "pi@stick.local",
            "--",
            "id -nG pi",
        ]
    );
    assert!(stdin.is_none());
}

#[tokio::test]
async fn test_run_pipes_stdin_when_present() {
    let runner = MockCommandRunner::new_ok();
    let remote = SshTarget::new(runner.clone(), target());

    let command = RemoteCommand::new("sudo -n tee -a /boot/config.txt > /dev/null")
        .with_stdin("dtoverlay=disable-bt\n");
    remote.run(&command).await.expect("run");

    let calls = runner.recorded_calls();
    let (_, args, stdin) = &calls[0];
    assert_eq!(args.last().map(String::as_str), Some("sudo -n tee -a /boot/config.txt > /dev/null"));
    assert_eq!(stdin.as_deref(), Some(b"dtoverlay=disable-bt\n".as_slice()));
}

#[tokio::test]
async fn test_run_error_names_login() {
    let runner = MockCommandRunner::new_err("failed to spawn ssh");
    let remote = SshTarget::new(runner, target());

    let err = remote.run(&RemoteCommand::new("true")).await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("ssh pi@stick.local"), "got: {msg}");
    assert!(msg.contains("failed to spawn ssh"), "got: {msg}");
}

// ─── scp ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_transfer_invokes_scp_with_capital_port_flag() {
    let runner = MockCommandRunner::new_ok();
    let remote = SshTarget::new(runner.clone(), target());

    remote
        .transfer(Path::new("/src/main.py"), "/home/pi/stick/")
        .await
        .expect("transfer");

    let calls = runner.recorded_calls();
    let (program, args, _) = &calls[0];
    assert_eq!(program, "scp");
    assert_eq!(
        args,
        &[
            "-q",
            "-o",
            "BatchMode=yes",
            "-o",
            "ConnectTimeout=10",
            "-P",
            "2222",
            "/src/main.py",
            "pi@stick.local:/home/pi/stick/",
        ]
    );
}

#[tokio::test]
async fn test_transfer_recursive_adds_r_flag() {
    let runner = MockCommandRunner::new_ok();
    let remote = SshTarget::new(runner.clone(), target());

    remote
        .transfer_recursive(Path::new("/src/vosk-model"), "/home/pi/stick/")
        .await
        .expect("transfer");

    let calls = runner.recorded_calls();
    let (_, args, _) = &calls[0];
    assert_eq!(&args[..2], &["-q", "-r"]);
    assert_eq!(args.last().map(String::as_str), Some("pi@stick.local:/home/pi/stick/"));
}

#[tokio::test]
async fn test_transfer_error_names_local_path() {
    let runner = MockCommandRunner::new_err("scp not found");
    let remote = SshTarget::new(runner, target());

    let err = remote
        .transfer(Path::new("/src/main.py"), "/home/pi/stick/")
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("scp /src/main.py"));
}

proptest! {
    /// The script is always the final ssh argument, passed through verbatim.
    #[test]
    fn prop_script_is_last_ssh_argument(script in "[ -~]{1,80}") {
        let remote = SshTarget::new(MockCommandRunner::new_ok(), target());
        let args = remote.ssh_args(&script);
        prop_assert_eq!(args.last(), Some(&script));
        prop_assert_eq!(&args[args.len() - 2], "--");
    }
}
