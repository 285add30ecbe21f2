//! Target diagnostics types and the pure issue collector.
//!
//! No I/O here; the doctor service fills these in from remote probes.

use serde::Serialize;

use crate::domain::device::mode_covers;

/// Everything `doctor` found out about a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorChecks {
    /// `user@host`.
    pub target: String,
    pub reachable: bool,
    /// `None` when the target could not be reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<BoardChecks>,
}

/// Checks that need a working connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardChecks {
    pub passwordless_sudo: bool,
    pub boot_config: BootConfigCheck,
    pub groups: GroupCheck,
    pub serial_nodes: Vec<NodeCheck>,
    /// A Bluetooth controller is registered, so it may still own the PL011 UART.
    pub bluetooth_active: bool,
    pub udev_rules: FileCheck,
    pub venv: FileCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootConfigCheck {
    pub path: String,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    /// Lines sharing a key with a required directive but a different value.
    pub conflicting: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCheck {
    pub user: String,
    pub member_of: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeCheck {
    pub path: String,
    pub exists: bool,
    /// Permission bits of the resolved node, e.g. `666`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Where a symlink such as `/dev/serial0` points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links_to: Option<String>,
    /// Mode the hardware stage applies.
    pub expected_mode: String,
}

impl NodeCheck {
    /// Whether the node exists but grants less than `expected_mode`.
    #[must_use]
    pub fn is_too_narrow(&self) -> bool {
        self.exists
            && self
                .mode
                .as_deref()
                .is_some_and(|mode| !mode_covers(mode, &self.expected_mode))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCheck {
    pub path: String,
    pub exists: bool,
}

/// Human-readable problems, in check order. Empty means healthy.
#[must_use]
pub fn collect_issues(checks: &DoctorChecks) -> Vec<String> {
    let Some(board) = checks.board.as_ref().filter(|_| checks.reachable) else {
        return vec![format!("{} is unreachable over ssh", checks.target)];
    };

    let mut issues = Vec::new();
    if !board.passwordless_sudo {
        issues.push(format!(
            "passwordless sudo is not available for {}",
            board.groups.user
        ));
    }
    for directive in &board.boot_config.missing {
        issues.push(format!("'{directive}' missing from {}", board.boot_config.path));
    }
    for line in &board.boot_config.conflicting {
        issues.push(format!("{} contains conflicting '{line}'", board.boot_config.path));
    }
    for group in &board.groups.missing {
        issues.push(format!("{} is not in group {group}", board.groups.user));
    }
    if !board.serial_nodes.is_empty() && !board.serial_nodes.iter().any(|n| n.exists) {
        let paths: Vec<_> = board.serial_nodes.iter().map(|n| n.path.as_str()).collect();
        issues.push(format!("no serial device node found ({})", paths.join(", ")));
    }
    for node in board.serial_nodes.iter().filter(|n| n.is_too_narrow()) {
        issues.push(format!(
            "{} has mode {}, expected {}",
            node.path,
            node.mode.as_deref().unwrap_or_default(),
            node.expected_mode
        ));
    }
    if board.bluetooth_active {
        issues.push(
            "Bluetooth controller is active and may hold the PL011 UART; reboot after deploy".to_string(),
        );
    }
    if !board.udev_rules.exists {
        issues.push(format!("udev rules not installed at {}", board.udev_rules.path));
    }
    if !board.venv.exists {
        issues.push(format!("virtual environment missing at {}", board.venv.path));
    }
    issues
}
