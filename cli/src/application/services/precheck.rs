//! Connectivity precheck — a single no-op round trip before anything mutates.

use crate::application::pipeline::StageReport;
use crate::application::ports::{ProgressReporter, RemoteCommand, RemoteExecutor};
use crate::application::services::run_checked;
use crate::domain::{DeployError, DeploymentTarget};

pub const STAGE: &str = "precheck";

/// The probe command. Must have no side effects on the target.
pub const PROBE: &str = "true";

/// Verify the control channel reaches the target.
///
/// # Errors
///
/// Returns [`DeployError::Unreachable`] if the probe cannot be issued or
/// exits non-zero (ssh reports connection failures as exit status 255).
pub async fn check_connectivity(
    remote: &impl RemoteExecutor,
    target: &DeploymentTarget,
    reporter: &impl ProgressReporter,
) -> Result<StageReport, DeployError> {
    reporter.step(&format!("checking connection to {}...", target.login()));
    run_checked(remote, &RemoteCommand::new(PROBE))
        .await
        .map_err(|detail| DeployError::Unreachable {
            target: target.login(),
            detail,
        })?;
    reporter.success(&format!("{} reachable", target.login()));
    Ok(StageReport::new(STAGE, false, format!("{} reachable", target.login())))
}
