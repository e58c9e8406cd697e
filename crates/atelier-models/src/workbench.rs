//! Workbench types for Atelier.
//!
//! A workbench is one isolated working directory (a git worktree) assigned
//! to a single actor. Its canonical path is always *derived* from the
//! workshop and bench names; records only keep the last path the engine
//! actually materialized, so a rename can never desync name and path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ids::{ActorId, CommissionId, WorkbenchId, WorkshopId};

/// Role of the actor a workbench is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Coordinates the workshop: creates and launches commissions.
    Orchestrator,
    /// Executes commission work inside one workbench.
    #[default]
    Implementer,
}

impl Role {
    /// The command expected to run in the actor pane of this role's window.
    pub fn pane_command(&self) -> &'static str {
        match self {
            Role::Orchestrator => "orc",
            Role::Implementer => "imp",
        }
    }
}

/// Lifecycle status of a workbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkbenchStatus {
    /// Bench is part of the active desired set.
    #[default]
    Active,
    /// Bench is retired; excluded from reconciliation entirely.
    Archived,
}

/// A workbench record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbench {
    /// Unique identifier for the workbench.
    pub id: WorkbenchId,

    /// Workshop this bench belongs to.
    pub workshop_id: WorkshopId,

    /// Human name; also determines the derived path and the window name.
    pub name: String,

    /// Actor seated at this bench. One bench, one actor.
    pub actor: ActorId,

    /// Role of the actor working at this bench.
    #[serde(default)]
    pub role: Role,

    /// Branch the worktree is checked out to.
    pub branch: String,

    /// Source repository the worktree is rooted at, when linked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_repo: Option<PathBuf>,

    /// Last path the engine materialized this bench at. `None` until the
    /// first apply. Compared against the derived path to detect moves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_path: Option<PathBuf>,

    /// Current lifecycle status.
    #[serde(default)]
    pub status: WorkbenchStatus,

    /// Commission this bench's actor is exclusively focused on, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<CommissionId>,

    /// When the bench was created.
    pub created_at: DateTime<Utc>,
}

impl Workbench {
    /// Creates a new active workbench.
    pub fn new(
        workshop_id: WorkshopId,
        name: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            id: WorkbenchId::new(),
            workshop_id,
            name: name.into(),
            actor: ActorId::new(),
            role: Role::Implementer,
            branch: branch.into(),
            source_repo: None,
            recorded_path: None,
            status: WorkbenchStatus::Active,
            focus: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the role, builder-style.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Links a source repository, builder-style.
    pub fn with_source_repo(mut self, repo: impl Into<PathBuf>) -> Self {
        self.source_repo = Some(repo.into());
        self
    }

    /// Returns true if this bench should be reconciled at all.
    pub fn is_active(&self) -> bool {
        self.status == WorkbenchStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbench_creation() {
        let bench = Workbench::new(WorkshopId::from_string("shop-1"), "alpha", "work/alpha");

        assert!(bench.id.as_str().starts_with("bench-"));
        assert!(bench.actor.as_str().starts_with("actor-"));
        assert_eq!(bench.name, "alpha");
        assert_eq!(bench.branch, "work/alpha");
        assert_eq!(bench.role, Role::Implementer);
        assert!(bench.recorded_path.is_none());
        assert!(bench.is_active());
    }

    #[test]
    fn test_workbench_builders() {
        let bench = Workbench::new(WorkshopId::from_string("shop-1"), "lead", "main")
            .with_role(Role::Orchestrator)
            .with_source_repo("/repos/app");

        assert_eq!(bench.role, Role::Orchestrator);
        assert_eq!(bench.source_repo, Some(PathBuf::from("/repos/app")));
    }

    #[test]
    fn test_role_pane_command() {
        assert_eq!(Role::Orchestrator.pane_command(), "orc");
        assert_eq!(Role::Implementer.pane_command(), "imp");
    }

    #[test]
    fn test_archived_bench_not_active() {
        let mut bench = Workbench::new(WorkshopId::from_string("shop-1"), "old", "main");
        bench.status = WorkbenchStatus::Archived;
        assert!(!bench.is_active());
    }

    #[test]
    fn test_workbench_serialization_roundtrip() {
        let mut bench = Workbench::new(WorkshopId::from_string("shop-1"), "alpha", "work/alpha");
        bench.recorded_path = Some(PathBuf::from("/ws/alpha"));
        bench.focus = Some(CommissionId::from_string("comm-1"));

        let json = serde_json::to_string(&bench).unwrap();
        let parsed: Workbench = serde_json::from_str(&json).unwrap();

        assert_eq!(bench.id, parsed.id);
        assert_eq!(bench.name, parsed.name);
        assert_eq!(bench.recorded_path, parsed.recorded_path);
        assert_eq!(bench.focus, parsed.focus);
    }
}
