//! Deployment target identity.
//!
//! Pure value types only — no I/O, no async, no process spawning.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// The remote node and working directory a run deploys into.
///
/// Built once from configuration and never mutated for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentTarget {
    /// Hostname or IP address of the board.
    pub host: String,
    /// Login user on the board. Also the user granted device access.
    pub user: String,
    /// SSH port.
    pub port: u16,
    /// Absolute destination directory on the board.
    pub destination: String,
}

impl Default for DeploymentTarget {
    fn default() -> Self {
        Self {
            host: "raspberrypi.local".to_string(),
            user: "pi".to_string(),
            port: DEFAULT_SSH_PORT,
            destination: "/home/pi/smart_walking_stick".to_string(),
        }
    }
}

impl DeploymentTarget {
    /// `user@host`, the form accepted by `ssh` and `scp`.
    #[must_use]
    pub fn login(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Join a relative path onto the destination directory.
    #[must_use]
    pub fn remote_path(&self, relative: &str) -> String {
        let base = self.destination.trim_end_matches('/');
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{relative}")
        }
    }

    /// Validate the target before anything is sent over the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if host or user is empty, contains whitespace, or the
    /// destination is not absolute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("target.host", &self.host), ("target.user", &self.user)] {
            if value.is_empty() || value.chars().any(char::is_whitespace) || value.contains('@') {
                return Err(ConfigError::InvalidValue {
                    key: field.to_string(),
                    value: value.clone(),
                    valid: "a non-empty name without whitespace or '@'".to_string(),
                });
            }
        }
        if !self.destination.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "target.destination".to_string(),
                value: self.destination.clone(),
                valid: "an absolute path".to_string(),
            });
        }
        Ok(())
    }
}

/// Per-run overrides from flags or environment, applied over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetOverrides {
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub destination: Option<String>,
}

impl TargetOverrides {
    /// Replace every field that has an override.
    pub fn apply(&self, target: &mut DeploymentTarget) {
        if let Some(host) = &self.host {
            target.host.clone_from(host);
        }
        if let Some(user) = &self.user {
            target.user.clone_from(user);
        }
        if let Some(port) = self.port {
            target.port = port;
        }
        if let Some(destination) = &self.destination {
            target.destination.clone_from(destination);
        }
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == DEFAULT_SSH_PORT {
            write!(f, "{}:{}", self.login(), self.destination)
        } else {
            write!(f, "{}:{} (port {})", self.login(), self.destination, self.port)
        }
    }
}
