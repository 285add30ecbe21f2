//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::domain::TargetOverrides;

/// Provision a Raspberry Pi walking stick over ssh
#[derive(Parser)]
#[command(name = "cane-deploy", version, propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file
    #[arg(long, global = true, env = "CANE_DEPLOY_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Defaults to `deploy`
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Target overrides, applied over the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Board hostname or IP address
    #[arg(long, global = true, env = "CANE_HOST")]
    pub host: Option<String>,

    /// Login user on the board
    #[arg(long, global = true, env = "CANE_USER")]
    pub user: Option<String>,

    /// SSH port
    #[arg(long, global = true, env = "CANE_PORT")]
    pub port: Option<u16>,

    /// Destination directory on the board
    #[arg(long = "dest", global = true, env = "CANE_DEST", value_name = "PATH")]
    pub destination: Option<String>,
}

impl From<TargetArgs> for TargetOverrides {
    fn from(args: TargetArgs) -> Self {
        Self {
            host: args.host,
            user: args.user,
            port: args.port,
            destination: args.destination,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Transfer, install, configure and smoke-test the board
    Deploy,

    /// Diagnose the board without changing it
    Doctor,

    /// Parse and list the dependency manifest
    Manifest(commands::manifest::ManifestArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            config,
            target,
            command,
        } = self;

        let app = AppContext::new(AppFlags {
            output: OutputFlags { no_color, quiet, json },
            config,
            target: target.into(),
        });

        match command.unwrap_or(Command::Deploy) {
            Command::Deploy => commands::deploy::run(&app).await,
            Command::Doctor => commands::doctor::run(&app).await,
            Command::Manifest(args) => commands::manifest::run(&app, &args),
            Command::Config(cmd) => commands::config::run(&app, &cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
