//! The deployment pipeline — an ordered list of stages run fail-fast.
//!
//! Each stage exposes a single `execute` returning `Result<StageReport,
//! DeployError>`. The pipeline runs them in order, one remote command at a
//! time, and stops at the first error without compensating earlier stages.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::ports::{ProgressReporter, Target};
use crate::application::services::{
    hardware::{self, HardwarePlan},
    installer::{self, InstallPlan},
    precheck,
    smoke_test::{self, SmokeTestPlan},
    transfer::{self, TransferPlan},
    udev_rules::{self, UdevPlan},
};
use crate::domain::{DeployConfig, DeployError, DeploymentTarget, GroupMembership, StageFailure};

// ── Reports ───────────────────────────────────────────────────────────────────

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// The stage mutated the target.
    Changed,
    /// Everything was already in place (or the stage is read-only).
    Unchanged,
    /// The stage failed but is advisory; the run continues.
    Warning,
}

/// Result of a successfully completed (or advisory) stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: &'static str,
    pub status: StageStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Set when the stage changed something that only takes effect after a reboot.
    pub reboot_required: bool,
}

impl StageReport {
    #[must_use]
    pub fn new(stage: &'static str, changed: bool, message: impl Into<String>) -> Self {
        Self {
            stage,
            status: if changed { StageStatus::Changed } else { StageStatus::Unchanged },
            message: message.into(),
            notes: Vec::new(),
            reboot_required: false,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Outcome of a whole run.
#[derive(Debug)]
pub struct PipelineReport {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Stages that completed, in execution order.
    pub stages: Vec<StageReport>,
    /// The first failure, if any. No stage after it was executed.
    pub failure: Option<StageFailure>,
}

impl PipelineReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether any stage changed boot-time configuration.
    #[must_use]
    pub fn reboot_required(&self) -> bool {
        self.stages.iter().any(|s| s.reboot_required)
    }

    /// Advisory failures that did not stop the run.
    pub fn warnings(&self) -> impl Iterator<Item = &StageReport> {
        self.stages.iter().filter(|s| s.status == StageStatus::Warning)
    }

    /// Process exit code: 0 on success, 1 on the first stage failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_success())
    }
}

// ── Stages ────────────────────────────────────────────────────────────────────

/// One pipeline stage, carrying everything it needs from the configuration.
#[derive(Debug, Clone)]
pub enum Stage {
    Precheck,
    Transfer(TransferPlan),
    Install(InstallPlan),
    Hardware(HardwarePlan),
    Udev(UdevPlan),
    SmokeTest(SmokeTestPlan),
}

impl Stage {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Precheck => precheck::STAGE,
            Self::Transfer(_) => transfer::STAGE,
            Self::Install(_) => installer::STAGE,
            Self::Hardware(_) => hardware::STAGE,
            Self::Udev(_) => udev_rules::STAGE,
            Self::SmokeTest(_) => smoke_test::STAGE,
        }
    }

    /// Run the stage against `remote`.
    ///
    /// # Errors
    ///
    /// Returns the typed failure of the first remote operation that failed.
    pub async fn execute(
        &self,
        remote: &impl Target,
        target: &DeploymentTarget,
        reporter: &impl ProgressReporter,
    ) -> Result<StageReport, DeployError> {
        match self {
            Self::Precheck => precheck::check_connectivity(remote, target, reporter).await,
            Self::Transfer(plan) => transfer::transfer_artifacts(remote, plan, reporter).await,
            Self::Install(plan) => installer::install_dependencies(remote, plan, reporter).await,
            Self::Hardware(plan) => hardware::configure_hardware(remote, plan, reporter).await,
            Self::Udev(plan) => udev_rules::install_rules(remote, plan, reporter).await,
            Self::SmokeTest(plan) => smoke_test::run_smoke_test(remote, plan, reporter).await,
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Ordered, fail-fast list of stages for one target.
#[derive(Debug, Clone)]
pub struct Pipeline {
    target: DeploymentTarget,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Build the standard six-stage pipeline from configuration.
    ///
    /// Local artifact paths are resolved against `base_dir`. The dependency
    /// manifest is always transferred, even when not listed as an artifact.
    #[must_use]
    pub fn from_config(config: &DeployConfig, base_dir: &Path) -> Self {
        let target = config.target.clone();
        let resolve = |p: &String| -> PathBuf { base_dir.join(p) };

        let manifest_local = resolve(&config.install.manifest);
        let mut files: Vec<PathBuf> = config.artifacts.files.iter().map(resolve).collect();
        if !files.contains(&manifest_local) {
            files.push(manifest_local.clone());
        }
        let manifest_name = manifest_local
            .file_name()
            .map_or_else(|| config.install.manifest.clone(), |n| n.to_string_lossy().into_owned());

        let stages = vec![
            Stage::Precheck,
            Stage::Transfer(TransferPlan {
                destination: target.destination.clone(),
                files,
                directories: config.artifacts.directories.iter().map(resolve).collect(),
            }),
            Stage::Install(InstallPlan {
                packages: config.install.packages.clone(),
                venv: target.remote_path(&config.install.venv),
                manifest: target.remote_path(&manifest_name),
            }),
            Stage::Hardware(HardwarePlan {
                boot_config: config.hardware.boot_config.clone(),
                conflict: config.hardware.conflict.clone(),
                device_nodes: config.hardware.device_nodes.clone(),
                memberships: config
                    .hardware
                    .groups
                    .iter()
                    .map(|group| GroupMembership {
                        user: target.user.clone(),
                        group: group.clone(),
                    })
                    .collect(),
            }),
            Stage::Udev(UdevPlan {
                path: config.udev.path.clone(),
                rules: config.udev.rules.clone(),
            }),
            Stage::SmokeTest(SmokeTestPlan {
                destination: target.destination.clone(),
                python: format!("{}/bin/python", target.remote_path(&config.install.venv)),
                module: config.smoke_test.module.clone(),
                class: config.smoke_test.class.clone(),
                init: config.smoke_test.init.clone(),
                cleanup: config.smoke_test.cleanup.clone(),
                required: config.smoke_test.required,
            }),
        ];

        Self { target, stages }
    }

    /// Build a pipeline from an explicit stage list.
    #[must_use]
    pub fn new(target: DeploymentTarget, stages: Vec<Stage>) -> Self {
        Self { target, stages }
    }

    #[must_use]
    pub fn target(&self) -> &DeploymentTarget {
        &self.target
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order, stopping at the first failure.
    pub async fn run(&self, remote: &impl Target, reporter: &impl ProgressReporter) -> PipelineReport {
        let started_at = Utc::now();
        let mut stages = Vec::with_capacity(self.stages.len());
        let mut failure = None;

        for stage in &self.stages {
            let name = stage.name();
            tracing::info!(stage = name, board = %self.target, "stage starting");
            match stage.execute(remote, &self.target, reporter).await {
                Ok(report) => {
                    tracing::info!(stage = name, status = ?report.status, "stage finished");
                    stages.push(report);
                }
                Err(source) => {
                    tracing::warn!(stage = name, error = %source, "stage failed");
                    failure = Some(StageFailure { stage: name, source });
                    break;
                }
            }
        }

        PipelineReport {
            target: self.target.to_string(),
            started_at,
            finished_at: Utc::now(),
            stages,
            failure,
        }
    }
}
