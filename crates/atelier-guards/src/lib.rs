//! Pure permission and lifecycle guards for Atelier.
//!
//! Every mutating operation runs the matching guard first and proceeds only
//! on `allowed`. Guards are plain functions over hand-assembled context
//! structs: all facts (dependent counts, focus holders, current statuses)
//! are gathered by the caller and passed in, so no guard ever performs I/O
//! and every rule is unit-testable without mocks.

pub mod context;
pub mod rules;

pub use context::{
    CommissionCreateContext, DeleteContext, FocusContext, StatusChangeContext,
    WorkplanAdvanceContext,
};
pub use rules::{
    check_commission_create, check_delete, check_focus, check_status_change,
    check_workplan_advance,
};

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardResult {
    /// Whether the operation may proceed.
    pub allowed: bool,
    /// Human-actionable explanation when denied; empty when allowed.
    pub reason: String,
}

impl GuardResult {
    /// The operation may proceed.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
        }
    }

    /// The operation is blocked. `reason` must name the blocking condition
    /// and, where one exists, the remedying command.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}
