//! Guard contexts: the pre-gathered facts a guard decides on.

use atelier_models::{ActorId, CommissionStatus, Role, WorkplanStatus};

/// Facts for creating or launching a commission.
#[derive(Debug, Clone)]
pub struct CommissionCreateContext {
    /// Role of the acting actor.
    pub actor_role: Role,
    /// Whether the target workshop record exists.
    pub workshop_exists: bool,
}

/// Facts for a commission status change.
#[derive(Debug, Clone)]
pub struct StatusChangeContext {
    /// Status the commission currently has.
    pub current: CommissionStatus,
    /// Status the caller wants to move to.
    pub target: CommissionStatus,
    /// Whether the commission is pinned.
    pub pinned: bool,
}

/// Facts for deleting an entity with possible dependents.
#[derive(Debug, Clone)]
pub struct DeleteContext {
    /// Kind of entity being deleted, for the denial message.
    pub entity_kind: &'static str,
    /// Pre-counted number of dependent child records. Guards never count
    /// themselves.
    pub dependent_count: usize,
    /// Whether the caller supplied the force flag.
    pub force: bool,
}

/// Facts for advancing a workplan along its workflow.
#[derive(Debug, Clone)]
pub struct WorkplanAdvanceContext {
    /// Status the workplan currently has.
    pub current: WorkplanStatus,
}

/// Facts for taking exclusive focus on a commission.
#[derive(Debug, Clone)]
pub struct FocusContext {
    /// Actor requesting focus.
    pub actor: ActorId,
    /// Actors currently holding exclusive focus on the same commission,
    /// looked up across all active benches beforehand.
    pub current_holders: Vec<ActorId>,
}
