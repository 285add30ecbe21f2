//! Dependency installer: OS packages, virtualenv, manifest.

use crate::application::pipeline::StageReport;
use crate::application::ports::{ProgressReporter, RemoteCommand, RemoteExecutor};
use crate::application::services::run_checked;
use crate::domain::{DeployError, shell};

pub const STAGE: &str = "install";

/// Remote paths and package set for the installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub packages: Vec<String>,
    /// Absolute virtualenv path.
    pub venv: String,
    /// Absolute path of the manifest on the target.
    pub manifest: String,
}

impl InstallPlan {
    /// The sub-steps in execution order, as `(description, command)`.
    #[must_use]
    pub fn steps(&self) -> Vec<(&'static str, RemoteCommand)> {
        let mut install = vec!["sudo", "-n", "DEBIAN_FRONTEND=noninteractive", "apt-get", "install", "-y"];
        install.extend(self.packages.iter().map(String::as_str));

        let venv = shell::quote(&self.venv);
        let pip = format!("{}/bin/pip", self.venv);

        vec![
            (
                "refresh package index",
                RemoteCommand::new(shell::join(["sudo", "-n", "apt-get", "update"])),
            ),
            ("install OS packages", RemoteCommand::new(shell::join(install))),
            (
                "create virtual environment",
                RemoteCommand::new(format!("test -d {venv} || python3 -m venv {venv}")),
            ),
            (
                "install manifest",
                RemoteCommand::new(shell::join([pip.as_str(), "install", "-r", self.manifest.as_str()])),
            ),
        ]
    }
}

/// Run the installer sub-steps in order; the first failure aborts.
///
/// Every sub-step is safe to repeat: satisfied installs are no-ops and the
/// virtualenv is only created when its directory is missing.
///
/// # Errors
///
/// Returns [`DeployError::Installer`] naming the failed sub-step.
pub async fn install_dependencies(
    remote: &impl RemoteExecutor,
    plan: &InstallPlan,
    reporter: &impl ProgressReporter,
) -> Result<StageReport, DeployError> {
    for (step, command) in plan.steps() {
        reporter.step(&format!("{step}..."));
        run_checked(remote, &command)
            .await
            .map_err(|detail| DeployError::Installer {
                step: step.to_string(),
                detail,
            })?;
    }
    reporter.success("dependencies installed");
    Ok(StageReport::new(
        STAGE,
        true,
        format!("{} OS packages and manifest installed into {}", plan.packages.len(), plan.venv),
    ))
}
