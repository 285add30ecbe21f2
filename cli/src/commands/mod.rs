//! Command implementations

pub mod config;
pub mod deploy;
pub mod doctor;
pub mod manifest;
pub mod version;
