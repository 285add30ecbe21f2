//! `cane-deploy deploy` — run the full provisioning pipeline.

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::Target;
use crate::application::{Pipeline, Stage};
use crate::commands::manifest::load_manifest;
use crate::infra::ssh::SshTarget;
use crate::output::{TerminalReporter, json};

/// Run the deploy command against the configured board.
///
/// # Errors
///
/// Returns an error if the configuration or manifest is invalid, or a stage
/// fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.load_config()?;
    let base_dir = std::env::current_dir().context("cannot determine working directory")?;

    // A malformed manifest is reported before anything touches the board.
    let manifest = load_manifest(&base_dir.join(&config.install.manifest))?;
    tracing::debug!(entries = manifest.len(), "manifest parsed");

    let pipeline = Pipeline::from_config(&config, &base_dir);
    let remote = SshTarget::connect(config.target.clone());
    run_with(app, &pipeline, &remote).await
}

/// Run `pipeline` against any target and render the outcome.
///
/// # Errors
///
/// Returns the first stage failure, after the summary has been printed.
pub async fn run_with(app: &AppContext, pipeline: &Pipeline, remote: &impl Target) -> Result<ExitCode> {
    app.output.section(&format!("Deploying to {}", pipeline.target()));
    let stages: Vec<_> = pipeline.stages().iter().map(Stage::name).collect();
    app.output.field("Stages:", &stages.join(" → "));

    let reporter = TerminalReporter::new(&app.output);
    let mut report = pipeline.run(remote, &reporter).await;
    reporter.finish();

    if app.is_json() {
        println!("{}", json::to_pretty(&json::pipeline_report(&report))?);
        return Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    app.renderer().render_pipeline_report(&report);
    match report.failure.take() {
        Some(failure) => Err(failure.into()),
        None => Ok(ExitCode::SUCCESS),
    }
}
