//! Plan generation: a pure diff of desired state against gathered state.
//!
//! `reconcile_open` and `reconcile_materialize` never perform I/O; they
//! turn a [`WorkshopState`] snapshot into an ordered, inspectable plan.
//! Running them twice on the same inputs yields the same plan.

use std::path::PathBuf;

use atelier_models::{WorkbenchId, Workshop, WorkshopId};
use atelier_tmux::WINDOW_PANES;
use atelier_workspace::sanitize_name;

use crate::gather::{BenchState, MarkerState, WorkshopState};

/// Derived status of one planned operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Should exist, doesn't, and this pass will make it.
    Create,
    /// Already satisfied.
    Exists,
    /// Present at the old path only; will be renamed to the derived path.
    Move,
    /// Should exist, doesn't, and materialization is out of scope for this
    /// pass; surfaced as a manual-action item, never silently created.
    Missing,
    /// Present but deviating (stale marker, wrong pane layout); repairable
    /// parts are repaired, the rest is surfaced.
    Update,
    /// Cannot be acted on this pass (window whose directory is absent).
    Skip,
}

/// Planned operation for one bench directory.
#[derive(Debug, Clone)]
pub struct BenchAction {
    /// Bench this action applies to.
    pub bench_id: WorkbenchId,
    /// Bench name.
    pub name: String,
    /// Derived operation.
    pub op: OpKind,
    /// Desired (derived) path.
    pub path: PathBuf,
    /// Source path when `op` is `Move`.
    pub from: Option<PathBuf>,
    /// Whether the record's path must be persisted after this pass.
    pub update_recorded_path: bool,
    /// Whether the marker file must be (re)written.
    pub needs_marker: bool,
}

/// Planned operation for one session window.
#[derive(Debug, Clone)]
pub struct WindowAction {
    /// Window name: the sanitized bench name. Sanitizing keeps tmux's
    /// `-F` output parseable and makes replans find the window again.
    pub window: String,
    /// Derived operation: `Exists`, `Update`, `Create`, or `Skip`.
    pub op: OpKind,
    /// Working directory the window targets.
    pub cwd: PathBuf,
    /// Command expected in the actor pane.
    pub command: String,
    /// What deviated, for `Update`.
    pub deviation: Option<String>,
}

/// Planned operation for the workshop session itself.
#[derive(Debug, Clone)]
pub struct SessionAction {
    /// Session name to address: the found name when one exists, the
    /// canonical name otherwise.
    pub name: String,
    /// `Exists` or `Create`.
    pub op: OpKind,
}

/// A record with no backing directory anywhere, not explicitly archived.
/// The caller decides whether to recreate or prune it; the engine never
/// guesses.
#[derive(Debug, Clone)]
pub struct Orphan {
    /// Bench the record belongs to.
    pub bench_id: WorkbenchId,
    /// Bench name.
    pub name: String,
    /// The path it was last materialized at.
    pub recorded_path: PathBuf,
}

/// The reconciler's output: ordered, side-effect free, loggable.
#[derive(Debug, Clone)]
pub struct WorkshopPlan {
    /// Workshop this plan reconciles.
    pub workshop_id: WorkshopId,
    /// Session operation; `None` when the pass does not manage sessions.
    pub session: Option<SessionAction>,
    /// Bench operations, in desired-set order.
    pub benches: Vec<BenchAction>,
    /// Window operations, in desired-set order.
    pub windows: Vec<WindowAction>,
    /// Records needing a human decision.
    pub orphans: Vec<Orphan>,
    /// Idempotence fast path: true iff nothing would change.
    pub nothing_to_do: bool,
}

impl WorkshopPlan {
    /// Counts operations by kind across benches and windows.
    pub fn count(&self, op: OpKind) -> usize {
        self.benches.iter().filter(|b| b.op == op).count()
            + self.windows.iter().filter(|w| w.op == op).count()
            + self
                .session
                .iter()
                .filter(|s| s.op == op)
                .count()
    }

    /// Items that need manual attention: missing benches and orphans.
    pub fn needs_attention(&self) -> usize {
        self.count(OpKind::Missing) + self.orphans.len()
    }
}

/// Whether the current pass owns materialization of absent benches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Materialization {
    InScope,
    OutOfScope,
}

/// Plans a workshop open: session, windows, and bench checks. Absent
/// benches are surfaced as `Missing` — opening a workshop never
/// materializes directories.
pub fn reconcile_open(workshop: &Workshop, state: &WorkshopState) -> WorkshopPlan {
    let (benches, orphans) = plan_benches(workshop, state, Materialization::OutOfScope);

    let session = match &state.session {
        Some(s) => SessionAction {
            name: s.name.clone(),
            op: OpKind::Exists,
        },
        None => SessionAction {
            name: workshop.session_name(),
            op: OpKind::Create,
        },
    };

    let windows = plan_windows(workshop, state, &benches);

    let nothing_to_do = session.op == OpKind::Exists
        && orphans.is_empty()
        && benches.iter().all(|b| {
            b.op == OpKind::Exists && !b.needs_marker && !b.update_recorded_path
        })
        && windows.iter().all(|w| w.op == OpKind::Exists);

    WorkshopPlan {
        workshop_id: workshop.id.clone(),
        session: Some(session),
        benches,
        windows,
        orphans,
        nothing_to_do,
    }
}

/// Plans infrastructure materialization: every absent bench is `Create`.
/// Session and window state are untouched by this pass.
pub fn reconcile_materialize(workshop: &Workshop, state: &WorkshopState) -> WorkshopPlan {
    let (benches, orphans) = plan_benches(workshop, state, Materialization::InScope);

    let nothing_to_do = orphans.is_empty()
        && benches.iter().all(|b| {
            b.op == OpKind::Exists && !b.needs_marker && !b.update_recorded_path
        });

    WorkshopPlan {
        workshop_id: workshop.id.clone(),
        session: None,
        benches,
        windows: Vec::new(),
        orphans,
        nothing_to_do,
    }
}

fn plan_benches(
    workshop: &Workshop,
    state: &WorkshopState,
    scope: Materialization,
) -> (Vec<BenchAction>, Vec<Orphan>) {
    let mut actions = Vec::new();
    let mut orphans = Vec::new();

    for bstate in &state.benches {
        let Some(bench) = workshop
            .benches
            .iter()
            .find(|b| b.id.as_str() == bstate.bench_id)
        else {
            continue;
        };

        match bench_action(bench.id.clone(), &bench.name, bstate, scope) {
            Ok(action) => actions.push(action),
            Err(orphan) => orphans.push(orphan),
        }
    }

    (actions, orphans)
}

/// Derives the operation for one bench. Tie-break rules, in order:
///
/// 1. Recorded path absent or equal to the derived path: `Exists` when the
///    directory is present (with marker repair when the marker deviates);
///    otherwise `Create`/`Missing` by scope — unless the record was
///    materialized before, in which case the vanished directory makes it
///    an orphan.
/// 2. Recorded path differs: `Move` when only the old path exists;
///    `Exists` plus a metadata-only path update when the derived path
///    already exists (the record is stale, nothing on disk moves);
///    `Missing` when neither exists.
fn bench_action(
    bench_id: WorkbenchId,
    name: &str,
    state: &BenchState,
    scope: Materialization,
) -> Result<BenchAction, Orphan> {
    let derived = state.derived_path.clone();
    let aligned = match &state.recorded_path {
        None => true,
        Some(recorded) => recorded == &derived,
    };

    let marker_ok = matches!(&state.marker, MarkerState::Found(id) if *id == bench_id.to_string());

    let mut action = BenchAction {
        bench_id,
        name: name.to_string(),
        op: OpKind::Exists,
        path: derived,
        from: None,
        update_recorded_path: false,
        needs_marker: false,
    };

    if aligned {
        if state.derived_exists {
            action.needs_marker = !marker_ok;
            action.op = if marker_ok { OpKind::Exists } else { OpKind::Update };
            // A record that never saw this path gets it persisted now.
            action.update_recorded_path = state.recorded_path.is_none();
            return Ok(action);
        }
        if let Some(recorded) = &state.recorded_path {
            // Previously materialized, nothing on disk: a human decides.
            return Err(Orphan {
                bench_id: action.bench_id,
                name: action.name,
                recorded_path: recorded.clone(),
            });
        }
        action.op = match scope {
            Materialization::InScope => OpKind::Create,
            Materialization::OutOfScope => OpKind::Missing,
        };
        action.update_recorded_path = scope == Materialization::InScope;
        action.needs_marker = scope == Materialization::InScope;
        return Ok(action);
    }

    // Paths differ.
    if state.derived_exists {
        // Stale record; metadata-only update, no filesystem move.
        action.needs_marker = !marker_ok;
        action.op = if marker_ok { OpKind::Exists } else { OpKind::Update };
        action.update_recorded_path = true;
        return Ok(action);
    }
    if state.recorded_exists {
        action.op = OpKind::Move;
        action.from = state.recorded_path.clone();
        action.update_recorded_path = true;
        action.needs_marker = true;
        return Ok(action);
    }
    action.op = OpKind::Missing;
    Ok(action)
}

fn plan_windows(
    workshop: &Workshop,
    state: &WorkshopState,
    benches: &[BenchAction],
) -> Vec<WindowAction> {
    let mut windows = Vec::new();

    for action in benches {
        let Some(bench) = workshop.bench(&action.bench_id) else {
            continue;
        };
        let expected_command = bench.role.pane_command();
        let window_name = sanitize_name(&action.name);

        // A window must never be created against a nonexistent directory.
        let dir_present = matches!(action.op, OpKind::Exists | OpKind::Update);
        if !dir_present {
            windows.push(WindowAction {
                window: window_name,
                op: OpKind::Skip,
                cwd: action.path.clone(),
                command: expected_command.to_string(),
                deviation: None,
            });
            continue;
        }

        let existing = state
            .session
            .as_ref()
            .and_then(|s| s.windows.iter().find(|w| w.name == window_name));

        let (op, deviation) = match existing {
            None => (OpKind::Create, None),
            Some(w) => {
                if w.pane_count != WINDOW_PANES {
                    (
                        OpKind::Update,
                        Some(format!(
                            "expected {} panes, found {}",
                            WINDOW_PANES, w.pane_count
                        )),
                    )
                } else if w.actor_command.as_deref() != Some(expected_command) {
                    (
                        OpKind::Update,
                        Some(format!(
                            "expected '{}' in actor pane, found '{}'",
                            expected_command,
                            w.actor_command.as_deref().unwrap_or("unknown")
                        )),
                    )
                } else {
                    (OpKind::Exists, None)
                }
            }
        };

        windows.push(WindowAction {
            window: window_name,
            op,
            cwd: action.path.clone(),
            command: expected_command.to_string(),
            deviation,
        });
    }

    windows
}
