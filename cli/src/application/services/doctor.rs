//! Read-only target diagnostics.
//!
//! Issues only probes and reads; nothing on the target is changed.

use crate::application::ports::{ProgressReporter, RemoteCommand, RemoteExecutor};
use crate::application::services::hardware::{privilege_check, read_file};
use crate::application::services::precheck::PROBE;
use crate::application::services::{run_checked, run_probe};
use crate::domain::boot_config::plan_directives;
use crate::domain::device::parse_groups;
use crate::domain::health::{BoardChecks, BootConfigCheck, DoctorChecks, FileCheck, GroupCheck, NodeCheck};
use crate::domain::{DeployConfig, shell};

/// Present while a Bluetooth controller is registered with the kernel.
pub const BLUETOOTH_CONTROLLER: &str = "/sys/class/bluetooth/hci0";

/// Probe the target described by `config`.
///
/// An unreachable target is a result, not an error.
///
/// # Errors
///
/// Returns an error if a probe cannot be issued after the connection
/// succeeded, or the boot config or group list cannot be read.
pub async fn run_doctor(
    remote: &impl RemoteExecutor,
    config: &DeployConfig,
    reporter: &impl ProgressReporter,
) -> anyhow::Result<DoctorChecks> {
    let target = &config.target;

    reporter.step(&format!("checking connection to {}...", target.login()));
    if let Err(detail) = run_checked(remote, &RemoteCommand::new(PROBE)).await {
        tracing::debug!(%detail, "doctor: target unreachable");
        return Ok(DoctorChecks {
            target: target.login(),
            reachable: false,
            board: None,
        });
    }

    let passwordless_sudo = probe(remote, privilege_check()).await?;

    reporter.step(&format!("reading {}...", config.hardware.boot_config));
    let content = run_checked(remote, &read_file(&config.hardware.boot_config))
        .await
        .map_err(|detail| anyhow::anyhow!("cannot read {}: {detail}", config.hardware.boot_config))?;
    let plan = plan_directives(
        &String::from_utf8_lossy(&content.stdout),
        config.hardware.conflict.resolve(),
    );
    let boot_config = BootConfigCheck {
        path: config.hardware.boot_config.clone(),
        present: plan.present.iter().map(ToString::to_string).collect(),
        missing: plan.missing.iter().map(ToString::to_string).collect(),
        conflicting: plan.same_key_lines,
    };

    reporter.step("checking group membership...");
    let id = run_checked(remote, &RemoteCommand::new(shell::join(["id", "-nG", target.user.as_str()])))
        .await
        .map_err(|detail| anyhow::anyhow!("cannot list groups of {}: {detail}", target.user))?;
    let id = String::from_utf8_lossy(&id.stdout).into_owned();
    let member_of: Vec<String> = parse_groups(&id).map(str::to_owned).collect();
    let groups = GroupCheck {
        user: target.user.clone(),
        missing: config
            .hardware
            .groups
            .iter()
            .filter(|g| !member_of.contains(g))
            .cloned()
            .collect(),
        member_of,
    };

    reporter.step("checking device nodes...");
    let mut serial_nodes = Vec::with_capacity(config.hardware.device_nodes.len());
    for node in &config.hardware.device_nodes {
        let found = exists(remote, &node.path).await?;
        let (mode, links_to) = if found {
            (
                first_line(remote, ["stat", "-L", "-c", "%a", node.path.as_str()]).await,
                first_line(remote, ["readlink", "-f", node.path.as_str()])
                    .await
                    .filter(|target| *target != node.path),
            )
        } else {
            (None, None)
        };
        serial_nodes.push(NodeCheck {
            path: node.path.clone(),
            exists: found,
            mode,
            links_to,
            expected_mode: node.mode.clone(),
        });
    }
    let bluetooth_active = exists(remote, BLUETOOTH_CONTROLLER).await?;

    let udev_rules = FileCheck {
        path: config.udev.path.clone(),
        exists: exists(remote, &config.udev.path).await?,
    };
    let venv_path = target.remote_path(&config.install.venv);
    let venv = FileCheck {
        exists: exists(remote, &format!("{venv_path}/bin/python")).await?,
        path: venv_path,
    };

    reporter.success("diagnostics complete");
    Ok(DoctorChecks {
        target: target.login(),
        reachable: true,
        board: Some(BoardChecks {
            passwordless_sudo,
            boot_config,
            groups,
            serial_nodes,
            bluetooth_active,
            udev_rules,
            venv,
        }),
    })
}

async fn probe(remote: &impl RemoteExecutor, command: RemoteCommand) -> anyhow::Result<bool> {
    run_probe(remote, &command).await.map_err(anyhow::Error::msg)
}

/// First line of a probe's stdout; `None` when it fails or prints nothing.
async fn first_line<'a>(
    remote: &impl RemoteExecutor,
    words: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let output = run_checked(remote, &RemoteCommand::new(shell::join(words))).await.ok()?;
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
}

async fn exists(remote: &impl RemoteExecutor, path: &str) -> anyhow::Result<bool> {
    probe(remote, RemoteCommand::new(shell::join(["test", "-e", path]))).await
}
