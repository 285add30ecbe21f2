//! `cane-deploy manifest` — parse and list the dependency manifest.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::domain::DependencyManifest;
use crate::output::json;

/// Arguments for the manifest command.
#[derive(Args)]
pub struct ManifestArgs {
    /// Manifest file (defaults to `install.manifest` from the configuration)
    pub path: Option<PathBuf>,
}

/// Run the manifest command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or has a malformed line.
pub fn run(app: &AppContext, args: &ManifestArgs) -> Result<ExitCode> {
    let path = match &args.path {
        Some(path) => path.clone(),
        None => PathBuf::from(app.load_config()?.install.manifest),
    };
    let manifest = load_manifest(&path)?;

    if app.is_json() {
        println!(
            "{}",
            json::to_pretty(&serde_json::json!({
                "path": path.display().to_string(),
                "entries": manifest.entries,
            }))?
        );
    } else {
        app.renderer().render_manifest(&manifest, &path);
    }
    Ok(ExitCode::SUCCESS)
}

/// Read and parse a manifest file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is malformed.
pub fn load_manifest(path: &Path) -> Result<DependencyManifest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read manifest {}", path.display()))?;
    DependencyManifest::parse(&text).with_context(|| format!("invalid manifest {}", path.display()))
}
