//! Guard rules, one pure function per gated transition.

use atelier_models::{CommissionStatus, Role, WorkplanStatus};

use crate::context::{
    CommissionCreateContext, DeleteContext, FocusContext, StatusChangeContext,
    WorkplanAdvanceContext,
};
use crate::GuardResult;

/// Only the orchestrator may create or launch commissions.
pub fn check_commission_create(ctx: &CommissionCreateContext) -> GuardResult {
    if ctx.actor_role != Role::Orchestrator {
        return GuardResult::deny(
            "only the orchestrator role may create or launch commissions",
        );
    }
    if !ctx.workshop_exists {
        return GuardResult::deny(
            "target workshop does not exist; create it with 'atelier workshop new'",
        );
    }
    GuardResult::allow()
}

/// A pinned commission cannot reach a terminal status.
pub fn check_status_change(ctx: &StatusChangeContext) -> GuardResult {
    if ctx.current.is_terminal() {
        return GuardResult::deny(format!(
            "commission is already {:?} and cannot change status",
            ctx.current
        ));
    }
    if ctx.target.is_terminal() && ctx.pinned {
        return GuardResult::deny(
            "commission is pinned; run 'atelier commission unpin' before closing it",
        );
    }
    GuardResult::allow()
}

/// Deleting an entity with dependents requires the force flag.
pub fn check_delete(ctx: &DeleteContext) -> GuardResult {
    if ctx.dependent_count > 0 && !ctx.force {
        return GuardResult::deny(format!(
            "{} has {} dependent record(s); pass --force to delete anyway",
            ctx.entity_kind, ctx.dependent_count
        ));
    }
    GuardResult::allow()
}

/// A workplan advances only from draft or pending review.
pub fn check_workplan_advance(ctx: &WorkplanAdvanceContext) -> GuardResult {
    match ctx.current {
        WorkplanStatus::Draft | WorkplanStatus::PendingReview => GuardResult::allow(),
        other => GuardResult::deny(format!(
            "workplan cannot advance from status {:?}; only draft and pending_review move forward",
            other
        )),
    }
}

/// Focus is exclusive: denied while a different active actor holds it.
pub fn check_focus(ctx: &FocusContext) -> GuardResult {
    let other = ctx.current_holders.iter().find(|h| **h != ctx.actor);
    match other {
        Some(holder) => GuardResult::deny(format!(
            "commission is already focused by {}; wait for them to release it",
            holder
        )),
        None => GuardResult::allow(),
    }
}
