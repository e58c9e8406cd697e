//! Git worktree adapter.

use std::path::Path;
use std::process::Command;

use tracing::{debug, trace};

use crate::error::{Result, WorkspaceError};

/// Abstraction over git worktree operations.
///
/// The effect executor consumes this trait; tests use a recording fake.
pub trait Worktrees {
    /// Returns true if a worktree (or any directory) exists at the path.
    fn worktree_exists(&self, path: &Path) -> bool;

    /// Creates a new worktree at `target_path` checked out to `branch`,
    /// rooted at the repository `repo_path`. Creates the branch if it does
    /// not exist yet.
    fn add_worktree(&self, repo_path: &Path, branch: &str, target_path: &Path) -> Result<()>;
}

/// Worktree adapter shelling out to the git binary.
#[derive(Debug)]
pub struct GitCli {
    git_path: String,
}

impl GitCli {
    /// Create a new adapter, verifying git is available.
    pub fn new() -> Result<Self> {
        let git_path = which::which("git")
            .map_err(|_| WorkspaceError::GitNotFound)?
            .to_string_lossy()
            .into_owned();
        debug!(path = %git_path, "git found");
        Ok(Self { git_path })
    }

    fn run_checked(&self, cwd: &Path, args: &[&str]) -> Result<String> {
        trace!(args = ?args, cwd = %cwd.display(), "running git command");
        let output = Command::new(&self.git_path)
            .current_dir(cwd)
            .args(args)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(WorkspaceError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ))
        }
    }

    fn branch_exists(&self, repo_path: &Path, branch: &str) -> bool {
        self.run_checked(
            repo_path,
            &[
                "show-ref",
                "--verify",
                "--quiet",
                &format!("refs/heads/{}", branch),
            ],
        )
        .is_ok()
    }
}

impl Worktrees for GitCli {
    fn worktree_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn add_worktree(&self, repo_path: &Path, branch: &str, target_path: &Path) -> Result<()> {
        if target_path.exists() {
            return Err(WorkspaceError::TargetExists(target_path.to_path_buf()));
        }

        debug!(
            repo = %repo_path.display(),
            branch = %branch,
            target = %target_path.display(),
            "adding worktree"
        );

        let target = target_path.to_string_lossy();
        if self.branch_exists(repo_path, branch) {
            self.run_checked(repo_path, &["worktree", "add", &target, branch])?;
        } else {
            self.run_checked(repo_path, &["worktree", "add", "-b", branch, &target])?;
        }
        Ok(())
    }
}
