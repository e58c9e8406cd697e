//! Workshop types for Atelier.
//!
//! A workshop is one tmux session grouping several workbenches. The session
//! is tracked by a stable workshop-ID environment marker, never by display
//! name, so renaming the session does not break reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{WorkbenchId, WorkshopId};
use crate::workbench::Workbench;

/// Lifecycle status of a workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkshopStatus {
    /// Workshop is open for work.
    #[default]
    Active,
    /// Workshop is retired; never reconciled.
    Archived,
}

/// A workshop record: one session, many benches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workshop {
    /// Unique identifier for the workshop.
    pub id: WorkshopId,

    /// Human name; also determines the derived root directory.
    pub name: String,

    /// Current lifecycle status.
    #[serde(default)]
    pub status: WorkshopStatus,

    /// Benches belonging to this workshop.
    #[serde(default)]
    pub benches: Vec<Workbench>,

    /// When the workshop was created.
    pub created_at: DateTime<Utc>,
}

impl Workshop {
    /// Creates a new active workshop with no benches.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkshopId::new(),
            name: name.into(),
            status: WorkshopStatus::Active,
            benches: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The tmux session name used when this workshop's session is created.
    pub fn session_name(&self) -> String {
        format!("atelier-{}", self.name)
    }

    /// Adds a bench to the workshop.
    pub fn add_bench(&mut self, bench: Workbench) {
        self.benches.push(bench);
    }

    /// Looks up a bench by ID.
    pub fn bench(&self, id: &WorkbenchId) -> Option<&Workbench> {
        self.benches.iter().find(|b| &b.id == id)
    }

    /// Looks up a bench by ID, mutably.
    pub fn bench_mut(&mut self, id: &WorkbenchId) -> Option<&mut Workbench> {
        self.benches.iter_mut().find(|b| &b.id == id)
    }

    /// Benches in the desired set: active only. Archived benches never
    /// generate operations.
    pub fn active_benches(&self) -> impl Iterator<Item = &Workbench> {
        self.benches.iter().filter(|b| b.is_active())
    }

    /// Returns true if the workshop itself should be reconciled.
    pub fn is_active(&self) -> bool {
        self.status == WorkshopStatus::Active
    }
}
