//! Scripted fakes shared by the engine's unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use atelier_models::{WorkbenchId, WorkshopId};
use atelier_persistence::PersistenceError;
use atelier_tmux::{SessionDriver, TmuxError, WindowInfo, WINDOW_PANES};
use atelier_workspace::{WorkspaceError, Worktrees};

use crate::executor::PersistSink;

/// In-memory session driver. Pre-seed state with `add_session` and
/// `add_window`; created sessions/windows are recorded for assertions.
#[derive(Default)]
pub struct FakeDriver {
    pub sessions: RefCell<Vec<(String, String)>>,
    pub windows: RefCell<HashMap<String, Vec<(String, u32, String)>>>,
    pub nudges: RefCell<Vec<(String, String, String)>>,
    /// When set, every create call fails with this message.
    pub fail_creates: Option<String>,
}

impl FakeDriver {
    pub fn add_session(&mut self, name: &str, workshop_id: &str) {
        self.sessions
            .borrow_mut()
            .push((name.to_string(), workshop_id.to_string()));
    }

    pub fn add_window(&mut self, session: &str, window: &str, panes: u32, actor_cmd: &str) {
        self.windows
            .borrow_mut()
            .entry(session.to_string())
            .or_default()
            .push((window.to_string(), panes, actor_cmd.to_string()));
    }

    pub fn window_names(&self, session: &str) -> Vec<String> {
        self.windows
            .borrow()
            .get(session)
            .map(|w| w.iter().map(|(n, _, _)| n.clone()).collect())
            .unwrap_or_default()
    }
}

impl SessionDriver for FakeDriver {
    fn session_exists(&self, name: &str) -> bool {
        self.sessions.borrow().iter().any(|(n, _)| n == name)
    }

    fn find_session_by_workshop(&self, workshop_id: &str) -> atelier_tmux::Result<Option<String>> {
        Ok(self
            .sessions
            .borrow()
            .iter()
            .find(|(_, id)| id == workshop_id)
            .map(|(n, _)| n.clone()))
    }

    fn create_session(&self, name: &str, workshop_id: &str) -> atelier_tmux::Result<()> {
        if let Some(msg) = &self.fail_creates {
            return Err(TmuxError::CommandFailed(msg.clone()));
        }
        if self.find_session_by_workshop(workshop_id)?.is_none() {
            self.sessions
                .borrow_mut()
                .push((name.to_string(), workshop_id.to_string()));
        }
        Ok(())
    }

    fn create_window(
        &self,
        session: &str,
        window: &str,
        _cwd: &Path,
        command: &str,
    ) -> atelier_tmux::Result<()> {
        if let Some(msg) = &self.fail_creates {
            return Err(TmuxError::CommandFailed(msg.clone()));
        }
        if !self.session_exists(session) {
            return Err(TmuxError::SessionNotFound(session.to_string()));
        }
        let mut windows = self.windows.borrow_mut();
        let entry = windows.entry(session.to_string()).or_default();
        if !entry.iter().any(|(n, _, _)| n == window) {
            entry.push((window.to_string(), WINDOW_PANES, command.to_string()));
        }
        Ok(())
    }

    fn list_windows(&self, session: &str) -> atelier_tmux::Result<Vec<WindowInfo>> {
        if !self.session_exists(session) {
            return Err(TmuxError::SessionNotFound(session.to_string()));
        }
        Ok(self
            .windows
            .borrow()
            .get(session)
            .map(|windows| {
                windows
                    .iter()
                    .enumerate()
                    .map(|(i, (name, panes, _))| WindowInfo {
                        index: i as u32,
                        name: name.clone(),
                        pane_count: *panes,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn pane_command(&self, session: &str, window: &str, _pane: u32) -> atelier_tmux::Result<String> {
        self.windows
            .borrow()
            .get(session)
            .and_then(|ws| ws.iter().find(|(n, _, _)| n == window))
            .map(|(_, _, cmd)| cmd.clone())
            .ok_or_else(|| TmuxError::WindowNotFound(window.to_string(), session.to_string()))
    }

    fn nudge(&self, session: &str, window: &str, keys: &str) {
        self.nudges.borrow_mut().push((
            session.to_string(),
            window.to_string(),
            keys.to_string(),
        ));
    }

    fn kill_session(&self, name: &str) -> atelier_tmux::Result<()> {
        let mut sessions = self.sessions.borrow_mut();
        let before = sessions.len();
        sessions.retain(|(n, _)| n != name);
        if sessions.len() == before {
            return Err(TmuxError::SessionNotFound(name.to_string()));
        }
        Ok(())
    }
}

/// Worktree fake that materializes plain directories.
#[derive(Default)]
pub struct FakeWorktrees {
    pub added: RefCell<Vec<(PathBuf, String, PathBuf)>>,
    /// When set, `add_worktree` fails with this message.
    pub fail: Option<String>,
}

impl Worktrees for FakeWorktrees {
    fn worktree_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn add_worktree(
        &self,
        repo_path: &Path,
        branch: &str,
        target_path: &Path,
    ) -> atelier_workspace::Result<()> {
        if let Some(msg) = &self.fail {
            return Err(WorkspaceError::CommandFailed(msg.clone()));
        }
        std::fs::create_dir_all(target_path)?;
        self.added.borrow_mut().push((
            repo_path.to_path_buf(),
            branch.to_string(),
            target_path.to_path_buf(),
        ));
        Ok(())
    }
}

/// Persist sink that records updates in memory.
#[derive(Default)]
pub struct RecordingSink {
    pub paths: RefCell<Vec<(WorkshopId, WorkbenchId, PathBuf)>>,
}

impl PersistSink for RecordingSink {
    fn update_bench_path(
        &self,
        workshop_id: &WorkshopId,
        workbench_id: &WorkbenchId,
        path: &Path,
    ) -> std::result::Result<(), PersistenceError> {
        self.paths.borrow_mut().push((
            workshop_id.clone(),
            workbench_id.clone(),
            path.to_path_buf(),
        ));
        Ok(())
    }
}
