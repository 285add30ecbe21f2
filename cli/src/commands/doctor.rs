//! `cane-deploy doctor` — read-only board diagnostics.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::RemoteExecutor;
use crate::application::services::doctor::run_doctor;
use crate::domain::DeployConfig;
use crate::domain::health::collect_issues;
use crate::infra::ssh::SshTarget;
use crate::output::{TerminalReporter, json};

/// Run the doctor command.
///
/// Exits non-zero when any issue is found.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a probe cannot run.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.load_config()?;
    let remote = SshTarget::connect(config.target.clone());
    run_with(app, &config, &remote).await
}

/// Run diagnostics against any executor and render them.
///
/// # Errors
///
/// Returns an error if a probe cannot run.
pub async fn run_with(app: &AppContext, config: &DeployConfig, remote: &impl RemoteExecutor) -> Result<ExitCode> {
    let checks = {
        let reporter = TerminalReporter::new(&app.output);
        run_doctor(remote, config, &reporter).await?
    };
    let issues = collect_issues(&checks);

    if app.is_json() {
        println!("{}", json::to_pretty(&json::doctor_report(&checks))?);
    } else {
        app.renderer().render_doctor(&checks, &issues);
    }

    Ok(if issues.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
