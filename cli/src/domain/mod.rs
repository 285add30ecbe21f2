//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod boot_config;
pub mod config;
pub mod device;
pub mod error;
pub mod health;
pub mod manifest;
pub mod shell;
pub mod target;
pub mod udev;

pub use boot_config::{ConfigDirective, PeripheralConflict, ensure_line_present, exact_line};
pub use config::DeployConfig;
pub use device::{DeviceNode, GroupMembership};
pub use error::{ConfigError, DeployError, ManifestError, StageFailure};
pub use manifest::DependencyManifest;
pub use target::{DeploymentTarget, TargetOverrides};
pub use udev::UdevRule;
