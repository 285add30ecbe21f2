//! Infrastructure layer — concrete implementations of application port traits.
//!
//! All I/O-performing code lives here: local process execution, ssh/scp and
//! the configuration file.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod ssh;
