//! Effect execution: the one imperative shell.
//!
//! The executor interprets effect lists against real collaborators,
//! strictly in list order, making no planning decisions of its own. Every
//! individual effect is idempotent, so a failed pass is safe to re-run;
//! there is no rollback. The executor never deletes filesystem state —
//! the algebra cannot even express deletion.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use atelier_models::{WorkbenchId, WorkshopId};
use atelier_persistence::PersistenceError;
use atelier_tmux::SessionDriver;
use atelier_workspace::Worktrees;

use crate::effect::{Effect, FileEffect, FileOp, GitEffect, LogLevel, PersistEffect, SessionEffect};
use crate::error::{ReconcileError, Result};
use crate::lower::EffectBatch;

/// Narrow repository seam the executor mutates records through.
pub trait PersistSink {
    /// Records the path a bench was materialized or confirmed at.
    fn update_bench_path(
        &self,
        workshop_id: &WorkshopId,
        workbench_id: &WorkbenchId,
        path: &Path,
    ) -> std::result::Result<(), PersistenceError>;
}

/// One failed entity in a batch apply.
#[derive(Debug)]
pub struct BatchError {
    /// Label of the entity whose batch failed.
    pub label: String,
    /// The failure, already wrapped with its effect kind.
    pub error: ReconcileError,
}

/// Outcome of a best-effort batch apply.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of batches that completed.
    pub done: usize,
    /// One entry per failed batch.
    pub errors: Vec<BatchError>,
}

impl BatchReport {
    /// True when every batch completed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Interprets effects against the real world.
pub struct Executor<'a> {
    session: &'a dyn SessionDriver,
    worktrees: &'a dyn Worktrees,
    persist: &'a dyn PersistSink,
}

impl<'a> Executor<'a> {
    /// Creates an executor over the given collaborators.
    pub fn new(
        session: &'a dyn SessionDriver,
        worktrees: &'a dyn Worktrees,
        persist: &'a dyn PersistSink,
    ) -> Self {
        Self {
            session,
            worktrees,
            persist,
        }
    }

    /// Executes effects strictly in order, stopping at the first hard
    /// failure. Later effects may assume earlier ones completed.
    pub fn execute(&self, effects: &[Effect]) -> Result<()> {
        for effect in effects {
            self.run(effect)?;
        }
        Ok(())
    }

    /// Executes batches with per-entity isolation: one batch's failure is
    /// collected and the pass continues with the next batch.
    pub fn execute_batch(&self, batches: &[EffectBatch]) -> BatchReport {
        let mut report = BatchReport::default();
        for batch in batches {
            match self.execute(&batch.effects) {
                Ok(()) => report.done += 1,
                Err(error) => {
                    warn!(entity = %batch.label, error = %error, "batch entity failed, continuing");
                    report.errors.push(BatchError {
                        label: batch.label.clone(),
                        error,
                    });
                }
            }
        }
        report
    }

    fn run(&self, effect: &Effect) -> Result<()> {
        match effect {
            Effect::File(file) => self.run_file(effect.kind(), file),
            Effect::Git(git) => self.run_git(effect.kind(), git),
            Effect::Session(session) => self.run_session(effect.kind(), session),
            Effect::Persist(persist) => self.run_persist(effect.kind(), persist),
            Effect::Composite(effects) => {
                for inner in effects {
                    self.run(inner)?;
                }
                Ok(())
            }
            Effect::Log { level, message } => {
                match level {
                    LogLevel::Debug => debug!("{}", message),
                    LogLevel::Info => info!("{}", message),
                    LogLevel::Warn => warn!("{}", message),
                }
                Ok(())
            }
            Effect::None => Ok(()),
        }
    }

    fn run_file(&self, kind: &'static str, file: &FileEffect) -> Result<()> {
        match file.op {
            FileOp::Mkdir => {
                fs::create_dir_all(&file.path).map_err(|e| ReconcileError::effect(kind, e))?;
                set_mode(&file.path, file.mode);
                Ok(())
            }
            FileOp::Write => {
                if let Some(parent) = file.path.parent() {
                    fs::create_dir_all(parent).map_err(|e| ReconcileError::effect(kind, e))?;
                }
                let content = file.content.as_deref().unwrap_or("");
                fs::write(&file.path, content).map_err(|e| ReconcileError::effect(kind, e))?;
                set_mode(&file.path, file.mode);
                Ok(())
            }
            FileOp::Rename => {
                let Some(from) = &file.from else {
                    return Err(ReconcileError::effect(
                        kind,
                        std::io::Error::new(
                            std::io::ErrorKind::InvalidInput,
                            "rename effect without source path",
                        ),
                    ));
                };
                if !from.exists() && file.path.exists() {
                    // Already renamed by a previous pass; retry-safe.
                    return Ok(());
                }
                if file.path.exists() {
                    return Err(ReconcileError::effect(
                        kind,
                        std::io::Error::new(
                            std::io::ErrorKind::AlreadyExists,
                            format!("rename target occupied: {}", file.path.display()),
                        ),
                    ));
                }
                if let Some(parent) = file.path.parent() {
                    fs::create_dir_all(parent).map_err(|e| ReconcileError::effect(kind, e))?;
                }
                fs::rename(from, &file.path).map_err(|e| ReconcileError::effect(kind, e))
            }
            // Inspection happened during gathering; nothing to do here.
            FileOp::Read | FileOp::Exists => Ok(()),
        }
    }

    fn run_git(&self, kind: &'static str, git: &GitEffect) -> Result<()> {
        match git {
            GitEffect::WorktreeAdd {
                repo_path,
                branch,
                target_path,
            } => {
                if self.worktrees.worktree_exists(target_path) {
                    debug!(target = %target_path.display(), "worktree already present");
                    return Ok(());
                }
                self.worktrees
                    .add_worktree(repo_path, branch, target_path)
                    .map_err(|e| ReconcileError::effect(kind, e))
            }
        }
    }

    fn run_session(&self, kind: &'static str, session: &SessionEffect) -> Result<()> {
        match session {
            SessionEffect::CreateSession { name, workshop_id } => self
                .session
                .create_session(name, workshop_id.as_str())
                .map_err(|e| ReconcileError::effect(kind, e)),
            SessionEffect::CreateWindow {
                session,
                window,
                cwd,
                command,
            } => self
                .session
                .create_window(session, window, cwd, command)
                .map_err(|e| ReconcileError::effect(kind, e)),
            SessionEffect::SendKeys {
                session,
                window,
                keys,
            } => {
                // Best-effort by contract: a missing target never fails the pass.
                self.session.nudge(session, window, keys);
                Ok(())
            }
        }
    }

    fn run_persist(&self, kind: &'static str, persist: &PersistEffect) -> Result<()> {
        match persist {
            PersistEffect::WorkbenchPath {
                workshop_id,
                workbench_id,
                path,
            } => self
                .persist
                .update_bench_path(workshop_id, workbench_id, path)
                .map_err(|e| ReconcileError::effect(kind, e)),
        }
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        warn!(path = %path.display(), error = %e, "failed to set permissions");
    }
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::FileEffect;
    use crate::lower::EffectBatch;
    use crate::testing::{FakeDriver, FakeWorktrees, RecordingSink};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn executor<'a>(
        driver: &'a FakeDriver,
        worktrees: &'a FakeWorktrees,
        sink: &'a RecordingSink,
    ) -> Executor<'a> {
        Executor::new(driver, worktrees, sink)
    }

    #[test]
    fn test_empty_and_noop_execute() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        exec.execute(&[]).unwrap();
        exec.execute(&[Effect::None]).unwrap();
        exec.execute(&[Effect::None, Effect::None]).unwrap();
    }

    #[test]
    fn test_mkdir_then_write() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        let dir = tempdir().unwrap();
        let target = dir.path().join("a/b");
        let file = target.join("marker.json");

        exec.execute(&[
            Effect::File(FileEffect::mkdir(&target)),
            Effect::File(FileEffect::write(&file, "{}")),
        ])
        .unwrap();
        assert!(file.exists());
    }

    #[test]
    fn test_execution_order_is_program_order() {
        // CreateWindow depends on CreateSession. In order, both succeed;
        // swapped, the window creation fails — the executor never reorders.
        let dir = tempdir().unwrap();
        let window = |session: &str| {
            Effect::Session(SessionEffect::CreateWindow {
                session: session.to_string(),
                window: "alpha".to_string(),
                cwd: dir.path().to_path_buf(),
                command: "imp".to_string(),
            })
        };
        let session = |name: &str| {
            Effect::Session(SessionEffect::CreateSession {
                name: name.to_string(),
                workshop_id: WorkshopId::from_string("shop-1"),
            })
        };

        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);
        exec.execute(&[session("s1"), window("s1")]).unwrap();

        let driver2 = FakeDriver::default();
        let exec2 = executor(&driver2, &worktrees, &sink);
        let err = exec2.execute(&[window("s2"), session("s2")]).unwrap_err();
        assert!(
            matches!(err, ReconcileError::Effect { kind, .. } if kind == "session.create_window")
        );
    }

    #[test]
    fn test_rename_refuses_occupied_target() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        let dir = tempdir().unwrap();
        let blocked = dir.path().join("blocked");
        fs::create_dir(&blocked).unwrap();
        let occupied = dir.path().join("occupied");
        fs::create_dir(&occupied).unwrap();

        let err = exec
            .execute(&[Effect::File(FileEffect::rename(&blocked, &occupied))])
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Effect { kind, .. } if kind == "file.rename"));
        // Nothing was deleted or clobbered.
        assert!(blocked.is_dir());
        assert!(occupied.is_dir());
    }

    #[test]
    fn test_mkdir_is_idempotent() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        let dir = tempdir().unwrap();
        let target = dir.path().join("bench");
        let effect = Effect::File(FileEffect::mkdir(&target));

        exec.execute(std::slice::from_ref(&effect)).unwrap();
        exec.execute(std::slice::from_ref(&effect)).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_rename_retry_after_success_is_noop() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        let dir = tempdir().unwrap();
        let from = dir.path().join("old");
        let to = dir.path().join("new");
        fs::create_dir(&from).unwrap();

        let effect = Effect::File(FileEffect::rename(&from, &to));
        exec.execute(std::slice::from_ref(&effect)).unwrap();
        assert!(to.is_dir());
        assert!(!from.exists());

        // Re-running the same effect after success is safe.
        exec.execute(std::slice::from_ref(&effect)).unwrap();
        assert!(to.is_dir());
    }

    #[test]
    fn test_read_and_exists_are_noops() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        let absent = PathBuf::from("/definitely/not/here");
        exec.execute(&[
            Effect::File(FileEffect {
                op: FileOp::Read,
                path: absent.clone(),
                content: None,
                from: None,
                mode: 0o644,
            }),
            Effect::File(FileEffect {
                op: FileOp::Exists,
                path: absent,
                content: None,
                from: None,
                mode: 0o644,
            }),
        ])
        .unwrap();
    }

    #[test]
    fn test_worktree_add_skipped_when_present() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        let dir = tempdir().unwrap();
        let target = dir.path().join("bench");
        fs::create_dir(&target).unwrap();

        exec.execute(&[Effect::Git(GitEffect::WorktreeAdd {
            repo_path: PathBuf::from("/repo"),
            branch: "main".to_string(),
            target_path: target,
        })])
        .unwrap();

        assert!(worktrees.added.borrow().is_empty());
    }

    #[test]
    fn test_send_keys_never_fails() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        // No such session; still succeeds.
        exec.execute(&[Effect::Session(SessionEffect::SendKeys {
            session: "ghost".to_string(),
            window: "w".to_string(),
            keys: "hello".to_string(),
        })])
        .unwrap();
        assert_eq!(driver.nudges.borrow().len(), 1);
    }

    #[test]
    fn test_composite_flattens_in_order() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        let dir = tempdir().unwrap();
        let target = dir.path().join("nested");
        let file = target.join("f.json");

        exec.execute(&[Effect::Composite(vec![
            Effect::File(FileEffect::mkdir(&target)),
            Effect::Composite(vec![Effect::File(FileEffect::write(&file, "x"))]),
        ])])
        .unwrap();

        assert!(file.exists());
    }

    #[test]
    fn test_hard_failure_short_circuits() {
        let driver = FakeDriver {
            fail_creates: Some("boom".to_string()),
            ..FakeDriver::default()
        };
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        let dir = tempdir().unwrap();
        let never_made = dir.path().join("after-failure");

        let err = exec
            .execute(&[
                Effect::Session(SessionEffect::CreateSession {
                    name: "s".to_string(),
                    workshop_id: WorkshopId::from_string("shop-1"),
                }),
                Effect::File(FileEffect::mkdir(&never_made)),
            ])
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Effect { kind, .. } if kind == "session.create_session"));
        assert!(!never_made.exists());
    }

    #[test]
    fn test_batch_isolation() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees {
            fail: Some("worktree add refused".to_string()),
            ..FakeWorktrees::default()
        };
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        let dir = tempdir().unwrap();
        let batches = vec![
            EffectBatch {
                label: "one".to_string(),
                effects: vec![Effect::File(FileEffect::mkdir(dir.path().join("one")))],
            },
            EffectBatch {
                label: "two".to_string(),
                effects: vec![Effect::Git(GitEffect::WorktreeAdd {
                    repo_path: PathBuf::from("/repo"),
                    branch: "main".to_string(),
                    target_path: dir.path().join("two"),
                })],
            },
            EffectBatch {
                label: "three".to_string(),
                effects: vec![Effect::File(FileEffect::mkdir(dir.path().join("three")))],
            },
        ];

        let report = exec.execute_batch(&batches);

        assert_eq!(report.done, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].label, "two");
        assert!(dir.path().join("one").is_dir());
        assert!(dir.path().join("three").is_dir());
        assert!(!report.is_success());
    }

    #[test]
    fn test_persist_effect_reaches_sink() {
        let driver = FakeDriver::default();
        let worktrees = FakeWorktrees::default();
        let sink = RecordingSink::default();
        let exec = executor(&driver, &worktrees, &sink);

        exec.execute(&[Effect::Persist(PersistEffect::WorkbenchPath {
            workshop_id: WorkshopId::from_string("shop-1"),
            workbench_id: WorkbenchId::from_string("bench-1"),
            path: PathBuf::from("/ws/g1"),
        })])
        .unwrap();

        let recorded = sink.paths.borrow();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].2, PathBuf::from("/ws/g1"));
    }
}
