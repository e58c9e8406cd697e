//! Commission and workplan types for Atelier.
//!
//! A commission is a top-level unit of work executed inside a workshop.
//! Each commission carries workplans: proposed approaches that move through
//! a staged review workflow (draft, review, approval or escalation,
//! execution). These workflow types are what the guard engine gates; they
//! are distinct from the reconciliation plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CommissionId, WorkplanId, WorkshopId};

/// Status of a commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    /// Commission exists but work has not been planned yet.
    #[default]
    Draft,
    /// Commission has an approved workplan.
    Planned,
    /// Commission is being executed.
    Active,
    /// Commission finished; terminal.
    Complete,
    /// Commission retired without completion; terminal.
    Archived,
}

impl CommissionStatus {
    /// Returns true for statuses a commission cannot leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CommissionStatus::Complete | CommissionStatus::Archived)
    }
}

/// Status of a workplan within a commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkplanStatus {
    /// Being written by an implementer.
    #[default]
    Draft,
    /// Submitted, waiting for the orchestrator.
    PendingReview,
    /// Approved for execution.
    Approved,
    /// Sent back up for a human decision.
    Escalated,
    /// Executed; a receipt was produced.
    Executed,
}

/// A proposed approach to a commission's work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workplan {
    /// Unique identifier for the workplan.
    pub id: WorkplanId,

    /// One-line summary of the approach.
    pub summary: String,

    /// Current workflow status.
    #[serde(default)]
    pub status: WorkplanStatus,

    /// When the workplan was created.
    pub created_at: DateTime<Utc>,
}

impl Workplan {
    /// Creates a new draft workplan.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            id: WorkplanId::new(),
            summary: summary.into(),
            status: WorkplanStatus::Draft,
            created_at: Utc::now(),
        }
    }
}

/// A top-level unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commission {
    /// Unique identifier for the commission.
    pub id: CommissionId,

    /// Workshop this commission runs in.
    pub workshop_id: WorkshopId,

    /// Short description of the commissioned work.
    pub title: String,

    /// Current lifecycle status.
    #[serde(default)]
    pub status: CommissionStatus,

    /// Pinned commissions cannot be completed or archived until unpinned.
    #[serde(default)]
    pub pinned: bool,

    /// Workplans proposed for this commission.
    #[serde(default)]
    pub workplans: Vec<Workplan>,

    /// When the commission was created.
    pub created_at: DateTime<Utc>,

    /// When the commission reached a terminal status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Commission {
    /// Creates a new draft commission.
    pub fn new(workshop_id: WorkshopId, title: impl Into<String>) -> Self {
        Self {
            id: CommissionId::new(),
            workshop_id,
            title: title.into(),
            status: CommissionStatus::Draft,
            pinned: false,
            workplans: Vec::new(),
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    /// Adds a workplan.
    pub fn add_workplan(&mut self, plan: Workplan) {
        self.workplans.push(plan);
    }

    /// Looks up a workplan by ID.
    pub fn workplan(&self, id: &WorkplanId) -> Option<&Workplan> {
        self.workplans.iter().find(|p| &p.id == id)
    }

    /// Looks up a workplan by ID, mutably.
    pub fn workplan_mut(&mut self, id: &WorkplanId) -> Option<&mut Workplan> {
        self.workplans.iter_mut().find(|p| &p.id == id)
    }

    /// Moves the commission to a terminal status and stamps `closed_at`.
    ///
    /// Callers must run the status-change guard first; this method only
    /// records the transition.
    pub fn close(&mut self, status: CommissionStatus) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.closed_at = Some(Utc::now());
    }
}
