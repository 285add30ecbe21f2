//! JSON output helpers for every `--json` code path.

use anyhow::{Context, Result};
use serde_json::json;

use crate::application::PipelineReport;
use crate::domain::health::{DoctorChecks, collect_issues};
use crate::domain::{ConfigError, DeployError, ManifestError, StageFailure};

/// Format the JSON error object printed when a command fails.
///
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable error code for the `--json` error object.
///
/// Walks the context chain so errors wrapped with `.context(...)` keep the
/// code of their typed cause.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(failure) = cause.downcast_ref::<StageFailure>() {
            return failure.source.code();
        }
        if let Some(deploy) = cause.downcast_ref::<DeployError>() {
            return deploy.code();
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return "INVALID_CONFIG";
        }
        if cause.downcast_ref::<ManifestError>().is_some() {
            return "INVALID_MANIFEST";
        }
    }
    "ERROR"
}

/// Pretty-print any serializable value.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_pretty(value: &impl serde::Serialize) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}

/// The run summary as a JSON value.
#[must_use]
pub fn pipeline_report(report: &PipelineReport) -> serde_json::Value {
    let failure = report.failure.as_ref().map(|f| {
        json!({
            "stage": f.stage,
            "code": f.source.code(),
            "message": f.source.to_string(),
        })
    });
    json!({
        "target": report.target,
        "success": report.is_success(),
        "reboot_required": report.reboot_required(),
        "started_at": report.started_at.to_rfc3339(),
        "finished_at": report.finished_at.to_rfc3339(),
        "stages": report.stages,
        "failure": failure,
    })
}

/// Doctor findings plus the collected issues.
#[must_use]
pub fn doctor_report(checks: &DoctorChecks) -> serde_json::Value {
    json!({
        "checks": checks,
        "issues": collect_issues(checks),
    })
}
