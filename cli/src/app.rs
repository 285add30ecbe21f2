//! Application context — unified state passed to every command handler.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::{DeployConfig, TargetOverrides};
use crate::infra::config::YamlConfigStore;
use crate::output::{HumanRenderer, OutputContext};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    pub no_color: bool,
    pub quiet: bool,
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
    pub target: TargetOverrides,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    pub mode: OutputMode,
    pub config_store: YamlConfigStore,
    pub overrides: TargetOverrides,
}

impl AppContext {
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            // JSON output never mixes in progress lines.
            output: OutputContext::new(flags.output.no_color, flags.output.quiet || flags.output.json),
            mode,
            config_store: YamlConfigStore::new(flags.config),
            overrides: flags.target,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    #[must_use]
    pub fn renderer(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }

    /// Load the configuration, apply target overrides and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or any value
    /// is invalid.
    pub fn load_config(&self) -> Result<DeployConfig> {
        let mut config = self.config_store.load()?;
        self.overrides.apply(&mut config.target);
        config.validate().context("invalid configuration")?;
        tracing::debug!(board = %config.target, "configuration loaded");
        Ok(config)
    }
}
