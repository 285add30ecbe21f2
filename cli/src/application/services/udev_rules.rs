//! Persistent device-access rules.

use crate::application::pipeline::StageReport;
use crate::application::ports::{ProgressReporter, RemoteCommand, RemoteExecutor};
use crate::application::services::{run_checked, run_probe};
use crate::domain::udev::render_rules;
use crate::domain::{DeployError, UdevRule, shell};

pub const STAGE: &str = "udev";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdevPlan {
    /// Absolute rules file path on the target.
    pub path: String,
    pub rules: Vec<UdevRule>,
}

/// Install the rules file unless it already exists, then reload udev.
///
/// An existing file is left alone whatever its content; delete it on the
/// target to force a rewrite.
///
/// # Errors
///
/// Returns [`DeployError::Privilege`] if the file cannot be written and
/// [`DeployError::Permission`] if udev cannot be reloaded.
pub async fn install_rules(
    remote: &impl RemoteExecutor,
    plan: &UdevPlan,
    reporter: &impl ProgressReporter,
) -> Result<StageReport, DeployError> {
    let path = plan.path.as_str();
    let exists = run_probe(remote, &RemoteCommand::new(shell::join(["test", "-e", path])))
        .await
        .map_err(|detail| DeployError::Permission {
            step: format!("probe {path}"),
            detail,
        })?;
    if exists {
        reporter.success(&format!("{path} already installed"));
        return Ok(StageReport::new(STAGE, false, format!("{path} already installed")));
    }

    reporter.step(&format!("writing {path}..."));
    let write = RemoteCommand::new(format!("sudo -n tee {} > /dev/null", shell::quote(path)))
        .with_stdin(render_rules(&plan.rules));
    run_checked(remote, &write)
        .await
        .map_err(|detail| DeployError::Privilege {
            detail: format!("cannot write {path} ({detail})"),
        })?;

    for args in [
        ["sudo", "-n", "udevadm", "control", "--reload-rules"].as_slice(),
        ["sudo", "-n", "udevadm", "trigger"].as_slice(),
    ] {
        let command = RemoteCommand::new(shell::join(args.iter().copied()));
        run_checked(remote, &command)
            .await
            .map_err(|detail| DeployError::Permission {
                step: args[2..].join(" "),
                detail,
            })?;
    }

    reporter.success(&format!("{} rules installed", plan.rules.len()));
    Ok(StageReport::new(
        STAGE,
        true,
        format!("{} rules written to {path}", plan.rules.len()),
    ))
}
