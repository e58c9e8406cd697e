//! Error types for workspace operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during workspace operations.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// git binary not found in PATH.
    #[error("git not found in PATH")]
    GitNotFound,

    /// A git command returned a non-zero exit status.
    #[error("git command failed: {0}")]
    CommandFailed(String),

    /// Target path already occupied by something else.
    #[error("target path already exists: {0}")]
    TargetExists(PathBuf),

    /// Failed to spawn the git process.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for workspace operations.
pub type Result<T> = std::result::Result<T, WorkspaceError>;
