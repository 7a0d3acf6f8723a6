//! Error types for rxboot operations.
//!
//! This module defines [`RxbootError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Startup failures (runtime too old, installer failure, missing service
//!   directory) are distinct variants so commands can report them precisely
//! - A missing configuration file is not an error; the provisioner reports it
//!   as a degraded outcome instead
//! - Use `anyhow::Error` (via `RxbootError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rxboot operations.
#[derive(Debug, Error)]
pub enum RxbootError {
    /// No usable interpreter could be located.
    #[error("Python runtime not found: {message}")]
    RuntimeNotFound { message: String },

    /// The interpreter is older than the supported minimum.
    #[error("Python {required} or higher is required (found {detected})")]
    RuntimeTooOld { detected: String, required: String },

    /// The interpreter's version banner could not be parsed.
    #[error("Could not determine Python version from output: {output:?}")]
    VersionUnparseable { output: String },

    /// The package installer exited unsuccessfully.
    #[error("Failed to install packages [{packages}] (exit code {code:?})")]
    InstallFailed { packages: String, code: Option<i32> },

    /// A service's working directory does not exist.
    #[error("{service} directory not found: {path}")]
    DirectoryNotFound { service: String, path: PathBuf },

    /// A service executable could not be spawned.
    #[error("Failed to start {service}: {message}")]
    SpawnFailed { service: String, message: String },

    /// A service died while the supervisor was waiting for it to become ready.
    #[error("{service} exited before it was ready ({status})")]
    ExitedBeforeReady { service: String, status: String },

    /// The configuration template existed but could not be materialized.
    #[error("Failed to create {path} from template: {message}")]
    ProvisionFailed { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for rxboot operations.
pub type Result<T> = std::result::Result<T, RxbootError>;
