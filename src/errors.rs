// src/errors.rs

//! Crate-wide error type, aliases and exit-code mapping.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ServerRole;

/// Exit status for a graceful stop.
pub const EXIT_OK: i32 = 0;
/// Exit status for any fatal error without a dedicated code.
pub const EXIT_FAILURE: i32 = 1;
/// Exit status when a required port is already in use.
pub const EXIT_PORT_CONFLICT: i32 = 2;
/// Exit status when the backend never answered the health probe.
pub const EXIT_HEALTH_TIMEOUT: i32 = 3;
/// Exit status when the data argument is neither a directory nor a JSON file.
pub const EXIT_INVALID_DATA: i32 = 4;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error(
        "The port {port} for {role} is already used, you can change it with --{option} option"
    )]
    PortConflict {
        port: u16,
        role: ServerRole,
        option: &'static str,
    },

    #[error("Template file not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("Unresolved placeholder __{placeholder}__ in template {}", .template.display())]
    UnresolvedPlaceholder {
        placeholder: String,
        template: PathBuf,
    },

    #[error("Failed to launch {role}: {reason}")]
    LaunchFailure { role: ServerRole, reason: String },

    #[error("A {0} server is already running; terminate it before launching another")]
    DuplicateRole(ServerRole),

    #[error(
        "Backend did not answer after {attempts} attempts, see {} for details",
        .log.display()
    )]
    HealthTimeout { attempts: u32, log: PathBuf },

    #[error("Invalid data {}: {reason}", .path.display())]
    InvalidData { path: PathBuf, reason: String },

    #[error("Compilation failed: {message}")]
    CompileFailure { message: String, output: String },

    #[error("Backend health check failed: {0}")]
    HealthCheckFailure(String),

    #[error("Backend notification failed: {0}")]
    NotificationFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LauncherError {
    /// Process exit status associated with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::PortConflict { .. } => EXIT_PORT_CONFLICT,
            LauncherError::HealthTimeout { .. } => EXIT_HEALTH_TIMEOUT,
            LauncherError::InvalidData { .. } => EXIT_INVALID_DATA,
            _ => EXIT_FAILURE,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LauncherError>;
