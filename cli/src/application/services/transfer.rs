//! Artifact transfer — source files, credentials, manifest and model directory.

use std::path::PathBuf;

use crate::application::pipeline::StageReport;
use crate::application::ports::{FileTransfer, ProgressReporter, RemoteCommand, RemoteExecutor};
use crate::application::services::{failure_detail, run_checked};
use crate::domain::{DeployError, shell};

pub const STAGE: &str = "transfer";

/// What to copy and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Remote destination directory.
    pub destination: String,
    pub files: Vec<PathBuf>,
    /// Copied recursively.
    pub directories: Vec<PathBuf>,
}

/// Create the destination directory and copy every artifact into it.
///
/// Copies overwrite earlier runs. The stage stops at the first failed copy;
/// files copied before it are left in place.
///
/// # Errors
///
/// Returns [`DeployError::Transfer`] naming the path that failed.
pub async fn transfer_artifacts(
    remote: &(impl RemoteExecutor + FileTransfer),
    plan: &TransferPlan,
    reporter: &impl ProgressReporter,
) -> Result<StageReport, DeployError> {
    reporter.step(&format!("creating {}...", plan.destination));
    let mkdir = RemoteCommand::new(shell::join(["mkdir", "-p", plan.destination.as_str()]));
    run_checked(remote, &mkdir)
        .await
        .map_err(|detail| DeployError::Transfer {
            path: plan.destination.clone(),
            detail,
        })?;

    let remote_dir = format!("{}/", plan.destination.trim_end_matches('/'));

    for file in &plan.files {
        reporter.step(&format!("copying {}...", file.display()));
        let result = remote.transfer(file, &remote_dir).await;
        check_copy(file, result)?;
    }
    for dir in &plan.directories {
        reporter.step(&format!("copying {}/ (recursive)...", dir.display()));
        let result = remote.transfer_recursive(dir, &remote_dir).await;
        check_copy(dir, result)?;
    }

    let count = plan.files.len() + plan.directories.len();
    reporter.success(&format!("{count} artifacts copied to {}", plan.destination));
    Ok(StageReport::new(
        STAGE,
        count > 0,
        format!("{count} artifacts copied to {}", plan.destination),
    ))
}

fn check_copy(path: &std::path::Path, result: anyhow::Result<std::process::Output>) -> Result<(), DeployError> {
    let detail = match result {
        Ok(output) if output.status.success() => return Ok(()),
        Ok(output) => failure_detail(&output),
        Err(e) => format!("{e:#}"),
    };
    Err(DeployError::Transfer {
        path: path.display().to_string(),
        detail,
    })
}
