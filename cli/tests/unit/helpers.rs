//! Shared test helpers: exit statuses, canned outputs and a simulated board.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use anyhow::Result;
use cane_deploy::application::ports::{FileTransfer, ProgressReporter, RemoteCommand, RemoteExecutor};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── FakeBoard ─────────────────────────────────────────────────────────────────

/// Mutable state of the simulated board.
#[derive(Debug, Clone)]
pub struct BoardState {
    pub reachable: bool,
    pub passwordless_sudo: bool,
    /// Regular files by absolute path.
    pub files: BTreeMap<String, String>,
    /// Device nodes and their current modes.
    pub nodes: BTreeMap<String, String>,
    /// Symlinks such as `/dev/serial0`, by link path.
    pub links: BTreeMap<String, String>,
    pub groups: BTreeSet<String>,
    /// Directories created with `mkdir -p`.
    pub dirs: BTreeSet<String>,
    /// Paths copied in, as `remote_dir/name`.
    pub copied: Vec<String>,
    pub udev_reloads: usize,
    /// Whether the driver smoke test succeeds.
    pub modem_responds: bool,
    /// Any command whose script contains this fails with exit status 1.
    pub fail_on: Option<String>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            reachable: true,
            passwordless_sudo: true,
            files: BTreeMap::new(),
            nodes: [("/dev/ttyS0".to_string(), "660".to_string())].into(),
            links: [("/dev/serial0".to_string(), "/dev/ttyS0".to_string())].into(),
            groups: ["pi", "adm", "sudo"].into_iter().map(String::from).collect(),
            dirs: BTreeSet::new(),
            copied: Vec::new(),
            udev_reloads: 0,
            modem_responds: true,
            fail_on: None,
        }
    }
}

impl BoardState {
    /// Follow a symlink one level, as `/dev/serial0` needs.
    pub fn resolve<'a>(&'a self, path: &'a str) -> &'a str {
        self.links.get(path).map_or(path, String::as_str)
    }

    /// Mode of the node behind `path`, following links.
    pub fn mode_of(&self, path: &str) -> Option<&str> {
        self.nodes.get(self.resolve(path)).map(String::as_str)
    }

    /// What `udevadm trigger` does: every installed rule re-applies its mode
    /// to the matching nodes this board tracks.
    fn apply_udev_rules(&mut self) {
        let rules: Vec<(String, String)> = self
            .files
            .iter()
            .filter(|(path, _)| path.starts_with("/etc/udev/rules.d/"))
            .flat_map(|(_, content)| content.lines())
            .filter_map(|line| Some((quoted_after(line, "SUBSYSTEM==")?, quoted_after(line, "MODE=")?)))
            .collect();
        for (subsystem, mode) in rules {
            let mode = mode.strip_prefix('0').filter(|m| m.len() == 3).unwrap_or(mode.as_str()).to_string();
            for (path, current) in &mut self.nodes {
                if subsystem_of(path) == Some(subsystem.as_str()) {
                    current.clone_from(&mode);
                }
            }
        }
    }
}

fn quoted_after(line: &str, key: &str) -> Option<String> {
    let rest = &line[line.find(key)? + key.len()..];
    let rest = rest.strip_prefix('"')?;
    Some(rest[..rest.find('"')?].to_string())
}

fn subsystem_of(node: &str) -> Option<&'static str> {
    node.starts_with("/dev/tty").then_some("tty")
}

/// A Raspberry Pi simulated at the level of the shell commands the stages
/// issue. Every command is logged.
pub struct FakeBoard {
    pub state: Mutex<BoardState>,
    log: Mutex<Vec<String>>,
}

impl FakeBoard {
    pub fn new(state: BoardState) -> Self {
        Self {
            state: Mutex::new(state),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn fresh() -> Self {
        Self::new(BoardState::default())
    }

    pub fn with_boot_config(content: &str) -> Self {
        let mut state = BoardState::default();
        state.files.insert("/boot/config.txt".to_string(), content.to_string());
        Self::new(state)
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().expect("lock").clone()
    }

    pub fn snapshot(&self) -> BoardState {
        self.state.lock().expect("lock").clone()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.state.lock().expect("lock").files.get(path).cloned()
    }

    fn exec(&self, script: &str, stdin: Option<&[u8]>) -> Output {
        self.log.lock().expect("lock").push(script.to_string());
        let mut s = self.state.lock().expect("lock");

        if !s.reachable {
            return err_output(255, b"ssh: connect to host raspberrypi.local port 22: No route to host\n");
        }
        if s.fail_on.as_deref().is_some_and(|needle| script.contains(needle)) {
            return err_output(1, b"injected failure\n");
        }
        if script.starts_with("sudo ") && !s.passwordless_sudo {
            return err_output(1, b"sudo: a password is required\n");
        }

        let input = stdin.map(|b| String::from_utf8_lossy(b).into_owned()).unwrap_or_default();
        let words: Vec<&str> = script.split_whitespace().collect();

        match words.as_slice() {
            ["true"] | ["sudo", "-n", "true"] => ok_output(b""),
            ["mkdir", "-p", dir] => {
                s.dirs.insert((*dir).to_string());
                ok_output(b"")
            }
            ["test", "!", "-e", path, "||", "cat", _] => {
                let content = s.files.get(*path).cloned().unwrap_or_default();
                ok_output(content.as_bytes())
            }
            ["test", "-e", path] | ["test", "-d", path] => {
                let path = s.resolve(path);
                if s.files.contains_key(path) || s.nodes.contains_key(path) || s.dirs.contains(path) {
                    ok_output(b"")
                } else {
                    err_output(1, b"")
                }
            }
            ["sudo", "-n", "tee", "-a", path, ">", "/dev/null"] => {
                s.files.entry((*path).to_string()).or_default().push_str(&input);
                ok_output(b"")
            }
            ["sudo", "-n", "tee", path, ">", "/dev/null"] => {
                s.files.insert((*path).to_string(), input);
                ok_output(b"")
            }
            ["stat", "-L", "-c", "'%a'", path] => match s.mode_of(path) {
                Some(mode) => ok_output(format!("{mode}\n").as_bytes()),
                None => err_output(1, b"stat: cannot statx: No such file or directory\n"),
            },
            ["readlink", "-f", path] => ok_output(format!("{}\n", s.resolve(path)).as_bytes()),
            ["sudo", "-n", "chmod", mode, path] => {
                let target = s.resolve(path).to_string();
                match s.nodes.get_mut(&target) {
                    Some(current) => {
                        *current = (*mode).to_string();
                        ok_output(b"")
                    }
                    None => err_output(1, b"chmod: cannot access: No such file or directory\n"),
                }
            }
            ["id", "-nG", _] => {
                let list: Vec<&str> = s.groups.iter().map(String::as_str).collect();
                ok_output(format!("{}\n", list.join(" ")).as_bytes())
            }
            ["sudo", "-n", "usermod", "-a", "-G", group, _] => {
                s.groups.insert((*group).to_string());
                ok_output(b"")
            }
            ["sudo", "-n", "udevadm", "control", "--reload-rules"] => {
                s.udev_reloads += 1;
                ok_output(b"")
            }
            ["sudo", "-n", "udevadm", "trigger"] => {
                s.apply_udev_rules();
                ok_output(b"")
            }
            ["test", "-d", venv, "||", "python3", "-m", "venv", _] => {
                s.dirs.insert((*venv).to_string());
                s.files.insert(format!("{venv}/bin/python"), String::new());
                ok_output(b"")
            }
            ["cd", _, "&&", _, "-"] => {
                if s.modem_responds {
                    ok_output(b"AT OK\n")
                } else {
                    Output {
                        status: exit_status(1),
                        stdout: b"Module not responding\n".to_vec(),
                        stderr: Vec::new(),
                    }
                }
            }
            // apt-get and pip
            _ => ok_output(b""),
        }
    }
}

impl RemoteExecutor for FakeBoard {
    async fn run(&self, command: &RemoteCommand) -> Result<Output> {
        Ok(self.exec(&command.script, command.stdin.as_deref()))
    }
}

impl FileTransfer for FakeBoard {
    async fn transfer(&self, local: &Path, remote: &str) -> Result<Output> {
        self.copy(local, remote, false)
    }

    async fn transfer_recursive(&self, local: &Path, remote: &str) -> Result<Output> {
        self.copy(local, remote, true)
    }
}

impl FakeBoard {
    fn copy(&self, local: &Path, remote: &str, recursive: bool) -> Result<Output> {
        let flag = if recursive { "-r " } else { "" };
        let script = format!("scp {flag}{} {remote}", local.display());
        self.log.lock().expect("lock").push(script.clone());
        let mut s = self.state.lock().expect("lock");
        if !s.reachable {
            return Ok(err_output(255, b"ssh: connect to host: No route to host\n"));
        }
        if s.fail_on.as_deref().is_some_and(|needle| script.contains(needle)) {
            return Ok(err_output(1, b"scp: injected failure\n"));
        }
        let name = local.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let dest = format!("{}/{name}", remote.trim_end_matches('/'));
        s.files.insert(dest.clone(), String::new());
        s.copied.push(dest);
        Ok(ok_output(b""))
    }
}

// ── Reporters ────────────────────────────────────────────────────────────────

/// Reporter that discards everything.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}
