//! Error types for the tmux driver.

use thiserror::Error;

/// Errors that can occur while driving tmux.
#[derive(Error, Debug)]
pub enum TmuxError {
    /// tmux binary not found in PATH.
    #[error("tmux not found in PATH")]
    NotFound,

    /// A tmux command returned a non-zero exit status.
    #[error("tmux command failed: {0}")]
    CommandFailed(String),

    /// Session does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Window does not exist within a session.
    #[error("window '{0}' not found in session '{1}'")]
    WindowNotFound(String, String),

    /// Failed to parse tmux output.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Failed to spawn the tmux process.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tmux operations.
pub type Result<T> = std::result::Result<T, TmuxError>;
