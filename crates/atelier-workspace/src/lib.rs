//! Filesystem layout and git worktree adapter for Atelier.
//!
//! Path derivation lives here so every component computes bench locations
//! the same way, and the [`Worktrees`] trait is the seam the effect
//! executor uses to materialize worktrees.

pub mod error;
pub mod git;
pub mod layout;

pub use error::{Result, WorkspaceError};
pub use git::{GitCli, Worktrees};
pub use layout::{bench_path, sanitize_name, workshop_root};
