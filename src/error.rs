//! Error types for deploycheck
//!
//! Uses `thiserror` for library errors; the binary edge wraps these
//! with `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for deploycheck operations
pub type DeployCheckResult<T> = Result<T, DeployCheckError>;

/// Main error type for deploycheck operations
///
/// Only build/push and HTTP-probe failures are recoverable per project;
/// those never surface here (the runner records them and moves on).
/// Everything below aborts the whole run.
#[derive(Error, Debug)]
pub enum DeployCheckError {
    /// Project name does not resolve to a checked-out directory
    #[error("project directory not found: {path}")]
    ProjectDirNotFound { path: PathBuf },

    /// An external command could not be started at all
    #[error("failed to launch '{program}' in {dir}: {source}")]
    Launch {
        program: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external command ran and exited non-zero
    #[error("'{command}' failed in {dir} with exit code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        dir: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
