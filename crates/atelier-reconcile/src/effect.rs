//! The effect algebra: data-only descriptions of every side effect.
//!
//! Effects carry no live resources, only plain values, so a plan can be
//! constructed, logged, diffed, and unit-tested without touching any real
//! system. The enum is closed on purpose: the executor's dispatch is
//! exhaustively checked, and there is no remove/rmdir variant at all, so
//! an apply pass cannot express deletion.

use std::path::PathBuf;

use atelier_models::{WorkbenchId, WorkshopId};

/// Default permission bits for created directories.
pub const DIR_MODE: u32 = 0o755;
/// Default permission bits for written files.
pub const FILE_MODE: u32 = 0o644;

/// File operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    /// Create the directory and all missing parents. Idempotent.
    Mkdir,
    /// Create or overwrite the file with the given content.
    Write,
    /// Rename a directory or file; `from` holds the source.
    Rename,
    /// Execution-time no-op: inspection happened during gathering.
    Read,
    /// Execution-time no-op: inspection happened during gathering.
    Exists,
}

/// A file-system effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEffect {
    /// Operation to perform.
    pub op: FileOp,
    /// Target path.
    pub path: PathBuf,
    /// Content for `Write`.
    pub content: Option<String>,
    /// Source path for `Rename`.
    pub from: Option<PathBuf>,
    /// Permission bits applied on unix targets.
    pub mode: u32,
}

impl FileEffect {
    /// Directory creation with default mode.
    pub fn mkdir(path: impl Into<PathBuf>) -> Self {
        Self {
            op: FileOp::Mkdir,
            path: path.into(),
            content: None,
            from: None,
            mode: DIR_MODE,
        }
    }

    /// File write with default mode.
    pub fn write(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            op: FileOp::Write,
            path: path.into(),
            content: Some(content.into()),
            from: None,
            mode: FILE_MODE,
        }
    }

    /// Rename `from` to `to`.
    pub fn rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            op: FileOp::Rename,
            path: to.into(),
            content: None,
            from: Some(from.into()),
            mode: DIR_MODE,
        }
    }
}

/// A git worktree effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitEffect {
    /// Create a worktree at `target_path` on `branch`, rooted at `repo_path`.
    WorktreeAdd {
        repo_path: PathBuf,
        branch: String,
        target_path: PathBuf,
    },
}

/// A session/window effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// Idempotent session creation, tagged with the workshop ID marker.
    CreateSession {
        name: String,
        workshop_id: WorkshopId,
    },
    /// Idempotent window creation with the standard pane layout.
    CreateWindow {
        session: String,
        window: String,
        cwd: PathBuf,
        command: String,
    },
    /// Best-effort notification; never fails the pass on a missing target.
    SendKeys {
        session: String,
        window: String,
        keys: String,
    },
}

/// A narrowly-typed repository mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistEffect {
    /// Record the path a bench was materialized or confirmed at.
    WorkbenchPath {
        workshop_id: WorkshopId,
        workbench_id: WorkbenchId,
        path: PathBuf,
    },
}

/// Log levels an effect may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

/// One side-effecting action, as data.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// File-system mutation or recorded inspection.
    File(FileEffect),
    /// Git worktree operation.
    Git(GitEffect),
    /// Session/window operation.
    Session(SessionEffect),
    /// Repository mutation.
    Persist(PersistEffect),
    /// Ordered group executed as a unit; flattened recursively.
    Composite(Vec<Effect>),
    /// Emit a log line.
    Log { level: LogLevel, message: String },
    /// Do nothing.
    None,
}

impl Effect {
    /// Static label for this effect, used when wrapping execution errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::File(f) => match f.op {
                FileOp::Mkdir => "file.mkdir",
                FileOp::Write => "file.write",
                FileOp::Rename => "file.rename",
                FileOp::Read => "file.read",
                FileOp::Exists => "file.exists",
            },
            Effect::Git(GitEffect::WorktreeAdd { .. }) => "git.worktree_add",
            Effect::Session(SessionEffect::CreateSession { .. }) => "session.create_session",
            Effect::Session(SessionEffect::CreateWindow { .. }) => "session.create_window",
            Effect::Session(SessionEffect::SendKeys { .. }) => "session.send_keys",
            Effect::Persist(PersistEffect::WorkbenchPath { .. }) => "persist.workbench_path",
            Effect::Composite(_) => "composite",
            Effect::Log { .. } => "log",
            Effect::None => "none",
        }
    }

    /// Convenience constructor for a warn-level log effect.
    pub fn warn(message: impl Into<String>) -> Self {
        Effect::Log {
            level: LogLevel::Warn,
            message: message.into(),
        }
    }

    /// Walks this effect tree, yielding every leaf effect in order.
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a Effect)) {
        match self {
            Effect::Composite(effects) => {
                for e in effects {
                    e.for_each_leaf(f);
                }
            }
            leaf => f(leaf),
        }
    }
}
