//! Infrastructure implementation of the `ConfigStore` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::{DeployConfig, check_sections};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CANE_DEPLOY_CONFIG";

/// Project-local configuration file, looked up in the working directory.
pub const LOCAL_CONFIG: &str = "cane-deploy.yaml";

/// Production implementation of `ConfigStore` reading a YAML file.
///
/// Lookup order: explicit path, `CANE_DEPLOY_CONFIG`, `./cane-deploy.yaml`,
/// `~/.config/cane-deploy/config.yaml`. The first two must exist; the last
/// two fall back to built-in defaults when absent.
#[derive(Debug, Clone, Default)]
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            working_dir: None,
        }
    }

    /// Resolve `./cane-deploy.yaml` against `dir` instead of the process
    /// working directory.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The file that must exist, if the user named one.
    fn required_path(&self) -> Option<PathBuf> {
        self.explicit.clone().or_else(|| {
            std::env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
    }

    fn local_path(&self) -> PathBuf {
        self.working_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
            .join(LOCAL_CONFIG)
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<DeployConfig> {
        let path = self.path()?;
        if !path.exists() {
            if self.required_path().is_some() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(DeployConfig::default());
        }
        tracing::debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = self.required_path() {
            return Ok(path);
        }
        let local = self.local_path();
        if local.exists() {
            return Ok(local);
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".config").join("cane-deploy").join("config.yaml"))
    }
}

/// Parse a YAML document, rejecting unknown top-level sections.
///
/// An empty document yields the defaults.
///
/// # Errors
///
/// Returns an error for malformed YAML, unknown sections or bad field types.
pub fn parse(content: &str) -> Result<DeployConfig> {
    let value: serde_yaml::Value = serde_yaml::from_str(content).context("malformed YAML")?;
    match &value {
        serde_yaml::Value::Null => return Ok(DeployConfig::default()),
        serde_yaml::Value::Mapping(map) => {
            check_sections(map.keys().filter_map(serde_yaml::Value::as_str))?;
        }
        _ => anyhow::bail!("expected a mapping of configuration sections"),
    }
    Ok(serde_yaml::from_value(value)?)
}
