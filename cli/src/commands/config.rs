//! `cane-deploy config` — inspect the effective configuration.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::output::json;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (file, environment and flags)
    Show,
    /// Print the configuration file path
    Path,
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run(app: &AppContext, cmd: &ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Path => show_path(app),
    }
}

fn show_config(app: &AppContext) -> Result<ExitCode> {
    let config = app.load_config()?;
    let path = app.config_store.path()?;
    if app.is_json() {
        println!("{}", json::to_pretty(&config)?);
    } else {
        app.renderer().render_config(&config, &path)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn show_path(app: &AppContext) -> Result<ExitCode> {
    let path = app.config_store.path()?;
    if app.is_json() {
        println!(
            "{}",
            json::to_pretty(&serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
            }))?
        );
    } else {
        println!("{}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
