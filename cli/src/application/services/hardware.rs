//! Hardware configurator. Resolves the UART/Bluetooth conflict in the boot
//! config, opens up the serial device nodes and asserts group membership.
//!
//! Every mutation is idempotent: boot directives go through
//! [`plan_directives`], nodes are only touched when present, and `usermod`
//! only runs for groups the user is missing.

use std::collections::BTreeMap;

use crate::application::pipeline::StageReport;
use crate::application::ports::{ProgressReporter, RemoteCommand, RemoteExecutor};
use crate::application::services::{run_checked, run_probe};
use crate::domain::boot_config::plan_directives;
use crate::domain::{DeployError, DeviceNode, GroupMembership, PeripheralConflict, shell};

pub const STAGE: &str = "hardware";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwarePlan {
    pub boot_config: String,
    pub conflict: PeripheralConflict,
    /// Candidate nodes; absent ones are skipped.
    pub device_nodes: Vec<DeviceNode>,
    pub memberships: Vec<GroupMembership>,
}

/// `sudo -n true` succeeds only when sudo works without a password prompt.
#[must_use]
pub fn privilege_check() -> RemoteCommand {
    RemoteCommand::new("sudo -n true")
}

/// Print the file, or nothing when it does not exist yet.
#[must_use]
pub fn read_file(path: &str) -> RemoteCommand {
    let path = shell::quote(path);
    RemoteCommand::new(format!("test ! -e {path} || cat {path}"))
}

/// Append stdin to a root-owned file.
#[must_use]
pub fn append_file(path: &str, text: &str) -> RemoteCommand {
    RemoteCommand::new(format!("sudo -n tee -a {} > /dev/null", shell::quote(path)))
        .with_stdin(text.as_bytes())
}

/// Apply the boot directives, device-node modes and group memberships.
///
/// The boot config change only takes effect after a reboot, which this stage
/// never performs; the report flags it instead.
///
/// # Errors
///
/// Returns [`DeployError::Privilege`] when sudo is unavailable or the boot
/// config cannot be read or written, and [`DeployError::Permission`] when a
/// `chmod`, `id` or `usermod` call fails.
pub async fn configure_hardware(
    remote: &impl RemoteExecutor,
    plan: &HardwarePlan,
    reporter: &impl ProgressReporter,
) -> Result<StageReport, DeployError> {
    reporter.step("checking sudo access...");
    run_checked(remote, &privilege_check())
        .await
        .map_err(|detail| DeployError::Privilege {
            detail: format!("passwordless sudo is not available ({detail})"),
        })?;

    let mut notes = Vec::new();

    // Boot config.
    reporter.step(&format!("resolving {} conflict in {}...", plan.conflict.peripheral, plan.boot_config));
    let current = run_checked(remote, &read_file(&plan.boot_config))
        .await
        .map_err(|detail| DeployError::Privilege {
            detail: format!("cannot read {} ({detail})", plan.boot_config),
        })?;
    let content = String::from_utf8_lossy(&current.stdout);
    let directives = plan_directives(&content, plan.conflict.resolve());

    for line in &directives.same_key_lines {
        reporter.warn(&format!(
            "{} also contains '{line}'; left as is, the last matching key usually wins",
            plan.boot_config
        ));
    }

    let boot_changed = directives.changes_file();
    if boot_changed {
        run_checked(remote, &append_file(&plan.boot_config, &directives.append))
            .await
            .map_err(|detail| DeployError::Privilege {
                detail: format!("cannot write {} ({detail})", plan.boot_config),
            })?;
        for d in &directives.missing {
            notes.push(format!("added '{d}' to {}", plan.boot_config));
        }
    }
    for d in &directives.present {
        notes.push(format!("'{d}' already present"));
    }

    // Device nodes.
    let mut nodes_changed = false;
    for node in &plan.device_nodes {
        let exists = run_probe(remote, &RemoteCommand::new(shell::join(["test", "-e", node.path.as_str()])))
            .await
            .map_err(|detail| DeployError::Permission {
                step: format!("probe {}", node.path),
                detail,
            })?;
        if !exists {
            tracing::debug!(node = %node.path, "device node absent, skipped");
            continue;
        }
        reporter.step(&format!("setting mode {} on {}...", node.mode, node.path));
        let chmod = RemoteCommand::new(shell::join(["sudo", "-n", "chmod", node.mode.as_str(), node.path.as_str()]));
        run_checked(remote, &chmod)
            .await
            .map_err(|detail| DeployError::Permission {
                step: format!("chmod {}", node.path),
                detail,
            })?;
        nodes_changed = true;
        notes.push(format!("{} set to {}", node.path, node.mode));
    }

    // Group membership.
    let mut groups_changed = false;
    let mut groups_of: BTreeMap<&str, String> = BTreeMap::new();
    for membership in &plan.memberships {
        let user = membership.user.as_str();
        if !groups_of.contains_key(user) {
            let id = run_checked(remote, &RemoteCommand::new(shell::join(["id", "-nG", user])))
                .await
                .map_err(|detail| DeployError::Permission {
                    step: format!("id -nG {user}"),
                    detail,
                })?;
            groups_of.insert(user, String::from_utf8_lossy(&id.stdout).into_owned());
        }
        if groups_of.get(user).is_some_and(|groups| membership.is_satisfied_by(groups)) {
            continue;
        }
        reporter.step(&format!("adding {} to {}...", membership.user, membership.group));
        let usermod = RemoteCommand::new(shell::join([
            "sudo",
            "-n",
            "usermod",
            "-a",
            "-G",
            membership.group.as_str(),
            user,
        ]));
        run_checked(remote, &usermod)
            .await
            .map_err(|detail| DeployError::Permission {
                step: format!("usermod -a -G {} {user}", membership.group),
                detail,
            })?;
        groups_changed = true;
        notes.push(format!(
            "added {user} to group {} (effective at next login)",
            membership.group
        ));
    }

    let message = if boot_changed {
        format!("{} updated; reboot required", plan.boot_config)
    } else {
        format!("{} already configured", plan.boot_config)
    };
    reporter.success(&message);

    let mut report = StageReport::new(STAGE, boot_changed || nodes_changed || groups_changed, message);
    report.notes = notes;
    report.reboot_required = boot_changed;
    Ok(report)
}
