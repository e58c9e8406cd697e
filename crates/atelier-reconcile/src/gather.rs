//! State gathering: read-only probes of the actual world.
//!
//! The gatherer collects what *is* — directory and marker existence,
//! session and window state — without judging any of it. Snapshots are
//! built fresh on every invocation and never cached; staleness here would
//! be a correctness bug. Any single probe failure degrades that entity to
//! unknown/missing rather than aborting the gather, and the planner treats
//! unknown conservatively as needing action.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use atelier_models::Workshop;
use atelier_persistence::read_marker;
use atelier_tmux::{SessionDriver, ACTOR_PANE};
use atelier_workspace::bench_path;

/// What the marker probe found inside a bench directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerState {
    /// Marker present; carries the bench ID it claims.
    Found(String),
    /// No marker file.
    Missing,
    /// Marker could not be read or parsed; treated like missing.
    Unreadable,
}

/// Snapshot of one bench's on-disk state.
#[derive(Debug, Clone)]
pub struct BenchState {
    /// Bench this snapshot belongs to (by ID string).
    pub bench_id: String,
    /// Canonical path derived from identity.
    pub derived_path: PathBuf,
    /// Last materialized path, from the record.
    pub recorded_path: Option<PathBuf>,
    /// Whether a directory exists at the derived path.
    pub derived_exists: bool,
    /// Whether a directory exists at the recorded path.
    pub recorded_exists: bool,
    /// Marker probe result at the derived path.
    pub marker: MarkerState,
}

/// Snapshot of one window inside the workshop session.
#[derive(Debug, Clone)]
pub struct WindowState {
    /// Window name (the sanitized bench name it was created for).
    pub name: String,
    /// Number of panes.
    pub pane_count: u32,
    /// Command running in the actor pane, when it could be probed.
    pub actor_command: Option<String>,
}

/// Snapshot of the workshop's session, when one was found.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Current display name of the session.
    pub name: String,
    /// Windows currently in the session.
    pub windows: Vec<WindowState>,
}

/// Full actual-state snapshot for one workshop.
#[derive(Debug, Clone)]
pub struct WorkshopState {
    /// Session found by the workshop-ID marker, if any.
    pub session: Option<SessionState>,
    /// Per-bench snapshots, in desired-set order.
    pub benches: Vec<BenchState>,
}

/// Read-only prober over the filesystem and the session driver.
pub struct Gatherer<'a> {
    driver: &'a dyn SessionDriver,
    benches_root: &'a Path,
}

impl<'a> Gatherer<'a> {
    /// Creates a gatherer probing benches under `benches_root`.
    pub fn new(driver: &'a dyn SessionDriver, benches_root: &'a Path) -> Self {
        Self {
            driver,
            benches_root,
        }
    }

    /// Gathers the actual state for a workshop's active benches.
    pub fn gather(&self, workshop: &Workshop) -> WorkshopState {
        let benches = workshop
            .active_benches()
            .map(|bench| {
                let derived = bench_path(self.benches_root, &workshop.name, &bench.name);
                self.probe_bench(bench.id.as_str(), derived, bench.recorded_path.clone())
            })
            .collect();

        WorkshopState {
            session: self.probe_session(workshop.id.as_str()),
            benches,
        }
    }

    fn probe_bench(
        &self,
        bench_id: &str,
        derived_path: PathBuf,
        recorded_path: Option<PathBuf>,
    ) -> BenchState {
        let derived_exists = derived_path.is_dir();
        let recorded_exists = recorded_path.as_deref().is_some_and(Path::is_dir);

        let marker = if derived_exists {
            match read_marker(&derived_path) {
                Ok(Some(m)) => MarkerState::Found(m.workbench_id.to_string()),
                Ok(None) => MarkerState::Missing,
                Err(e) => {
                    warn!(bench = %bench_id, error = %e, "marker unreadable, degrading to missing");
                    MarkerState::Unreadable
                }
            }
        } else {
            MarkerState::Missing
        };

        BenchState {
            bench_id: bench_id.to_string(),
            derived_path,
            recorded_path,
            derived_exists,
            recorded_exists,
            marker,
        }
    }

    fn probe_session(&self, workshop_id: &str) -> Option<SessionState> {
        let name = match self.driver.find_session_by_workshop(workshop_id) {
            Ok(Some(name)) => name,
            Ok(None) => return None,
            Err(e) => {
                warn!(workshop = %workshop_id, error = %e, "session probe failed, treating as absent");
                return None;
            }
        };

        let windows = match self.driver.list_windows(&name) {
            Ok(windows) => windows,
            Err(e) => {
                warn!(session = %name, error = %e, "window listing failed, treating as empty");
                Vec::new()
            }
        };

        let windows = windows
            .into_iter()
            .map(|w| {
                let actor_command = match self.driver.pane_command(&name, &w.name, ACTOR_PANE) {
                    Ok(cmd) => Some(cmd),
                    Err(e) => {
                        debug!(window = %w.name, error = %e, "actor pane probe failed");
                        None
                    }
                };
                WindowState {
                    name: w.name,
                    pane_count: w.pane_count,
                    actor_command,
                }
            })
            .collect();

        Some(SessionState { name, windows })
    }
}
