//! Domain types and validators for the deployment configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::boot_config::{DEFAULT_BOOT_CONFIG_PATH, PeripheralConflict};
use crate::domain::device::{DeviceNode, default_groups, serial_candidates};
use crate::domain::error::ConfigError;
use crate::domain::target::DeploymentTarget;
use crate::domain::udev::{DEFAULT_RULES_PATH, UdevRule, default_rules, is_octal_mode};

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `cane-deploy.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DeployConfig {
    /// Board to deploy to.
    pub target: DeploymentTarget,
    /// Local files and directories copied to the destination.
    pub artifacts: ArtifactConfig,
    /// OS packages, virtualenv and manifest.
    pub install: InstallConfig,
    /// Boot config, device nodes and groups.
    pub hardware: HardwareConfig,
    /// udev rules file.
    pub udev: UdevConfig,
    /// Remote driver smoke test.
    pub smoke_test: SmokeTestConfig,
}

/// Artifacts copied by the transfer stage, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArtifactConfig {
    pub files: Vec<String>,
    /// Copied recursively (e.g. the speech model).
    pub directories: Vec<String>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            files: [
                "mechaminds.py",
                "a9g_module.py",
                "gsm_gps_simple.py",
                "firebase_alerts.py",
                "firebase-credentials.json",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            directories: vec!["vosk-model".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstallConfig {
    /// Local dependency manifest; transferred next to the other artifacts.
    pub manifest: String,
    /// OS packages installed with `apt-get`.
    pub packages: Vec<String>,
    /// Virtualenv directory, relative to the destination.
    pub venv: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            manifest: "requirements.txt".to_string(),
            packages: [
                "python3-pip",
                "python3-venv",
                "python3-dev",
                "python3-serial",
                "libatlas-base-dev",
                "libopenjp2-7",
                "libavcodec-dev",
                "libavformat-dev",
                "libswscale-dev",
                "portaudio19-dev",
                "libasound2-dev",
                "espeak",
                "i2c-tools",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            venv: "venv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HardwareConfig {
    pub boot_config: String,
    pub conflict: PeripheralConflict,
    /// Candidate nodes; absent ones are skipped.
    pub device_nodes: Vec<DeviceNode>,
    /// Groups the target user must belong to.
    pub groups: Vec<String>,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            boot_config: DEFAULT_BOOT_CONFIG_PATH.to_string(),
            conflict: PeripheralConflict::default(),
            device_nodes: serial_candidates(),
            groups: default_groups(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UdevConfig {
    pub path: String,
    pub rules: Vec<UdevRule>,
}

impl Default for UdevConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_RULES_PATH.to_string(),
            rules: default_rules(),
        }
    }
}

/// Driver entry point exercised after configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SmokeTestConfig {
    /// Python module containing the driver, importable from the destination.
    pub module: String,
    pub class: String,
    pub init: String,
    pub cleanup: String,
    /// When `false`, a failing smoke test is reported but does not fail the run.
    pub required: bool,
}

impl Default for SmokeTestConfig {
    fn default() -> Self {
        Self {
            module: "gsm_gps_simple".to_string(),
            class: "A9GModule".to_string(),
            init: "init_module".to_string(),
            cleanup: "cleanup".to_string(),
            required: false,
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

impl DeployConfig {
    /// Validate every field that ends up inside a remote command line.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.target.validate()?;

        for package in &self.install.packages {
            validate_word("install.packages", package)?;
        }
        validate_relative("install.venv", &self.install.venv)?;
        if self.install.manifest.trim().is_empty() {
            return Err(invalid("install.manifest", "", "a path to the dependency manifest").into());
        }

        validate_absolute("hardware.boot_config", &self.hardware.boot_config)?;
        for node in &self.hardware.device_nodes {
            validate_absolute("hardware.device_nodes.path", &node.path)?;
            if !is_octal_mode(&node.mode) {
                return Err(invalid("hardware.device_nodes.mode", &node.mode, "an octal mode such as 666").into());
            }
        }
        for group in &self.hardware.groups {
            validate_word("hardware.groups", group)?;
        }

        validate_absolute("udev.path", &self.udev.path)?;
        for rule in &self.udev.rules {
            rule.validate()?;
        }

        let smoke = &self.smoke_test;
        for (key, value) in [
            ("smoke_test.module", &smoke.module),
            ("smoke_test.class", &smoke.class),
            ("smoke_test.init", &smoke.init),
            ("smoke_test.cleanup", &smoke.cleanup),
        ] {
            if !is_python_identifier(value) {
                return Err(invalid(key, value, "a Python identifier").into());
            }
        }
        Ok(())
    }
}

/// Top-level sections of the configuration file.
pub const SECTIONS: &[&str] = &["target", "artifacts", "install", "hardware", "udev", "smoke_test"];

/// Reject top-level keys that are not configuration sections.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownKey`] for the first unknown key.
pub fn check_sections<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<(), ConfigError> {
    for key in keys {
        if !SECTIONS.contains(&key) {
            return Err(ConfigError::UnknownKey {
                key: key.to_string(),
                valid: SECTIONS.join(", "),
            });
        }
    }
    Ok(())
}

fn invalid(key: &str, value: &str, valid: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        valid: valid.to_string(),
    }
}

fn validate_word(key: &str, value: &str) -> Result<(), ConfigError> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | ':'));
    if ok {
        Ok(())
    } else {
        Err(invalid(key, value, "letters, digits, '-', '_', '.', '+' or ':'"))
    }
}

fn validate_absolute(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') && !value.contains('\n') {
        Ok(())
    } else {
        Err(invalid(key, value, "an absolute path"))
    }
}

fn validate_relative(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.starts_with('/') || value.split('/').any(|c| c == "..") {
        Err(invalid(key, value, "a path relative to the destination"))
    } else {
        Ok(())
    }
}

/// Whether `s` is a plain (ASCII) Python identifier.
#[must_use]
pub fn is_python_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ── Unit tests ───────────────────────────────────────────────────────────────
