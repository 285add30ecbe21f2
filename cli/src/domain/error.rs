//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Failure of a single pipeline stage.
///
/// Every variant names the operation that failed so the user can fix the
/// underlying condition and re-run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("unreachable target {target}: {detail}")]
    Unreachable { target: String, detail: String },

    #[error("transfer of '{path}' failed: {detail}")]
    Transfer { path: String, detail: String },

    #[error("{step} failed: {detail}")]
    Installer { step: String, detail: String },

    #[error("{detail}. Run with elevated privileges (passwordless sudo on the target).")]
    Privilege { detail: String },

    #[error("{step} failed: {detail}")]
    Permission { step: String, detail: String },

    #[error("smoke test failed: {detail}")]
    Verification { detail: String },
}

impl DeployError {
    /// Stable machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "UNREACHABLE_TARGET",
            Self::Transfer { .. } => "TRANSFER_FAILED",
            Self::Installer { .. } => "INSTALL_FAILED",
            Self::Privilege { .. } => "PRIVILEGE_REQUIRED",
            Self::Permission { .. } => "PERMISSION_RULES_FAILED",
            Self::Verification { .. } => "SMOKE_TEST_FAILED",
        }
    }
}

/// A stage failure tagged with the stage that produced it.
#[derive(Debug, Error)]
#[error("stage '{stage}' failed")]
pub struct StageFailure {
    pub stage: &'static str,
    #[source]
    pub source: DeployError,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}

// ── Manifest errors ───────────────────────────────────────────────────────────

/// Errors raised while parsing a dependency manifest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("line {line}: cannot parse '{text}' (expected `name[==|>=version]  [# comment]`)")]
    InvalidEntry { line: usize, text: String },

    #[error("line {line}: unsupported comparator '{comparator}' (expected == or >=)")]
    UnsupportedComparator { line: usize, comparator: String },
}
