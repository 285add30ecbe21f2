//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` — never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod pipeline;
pub mod ports;
pub mod services;

pub use pipeline::{Pipeline, PipelineReport, Stage, StageReport};
pub use ports::{
    CommandRunner, ConfigStore, FileTransfer, ProgressReporter, RemoteCommand, RemoteExecutor,
    Target,
};
