//! Idempotent infrastructure reconciliation for Atelier.
//!
//! The engine is split along a functional-core/imperative-shell line:
//!
//! 1. [`gather`] probes the actual world read-only (directories, markers,
//!    sessions, windows) and degrades failed probes to "missing".
//! 2. [`plan`] is a pure diff of desired state against the snapshot,
//!    producing typed operations with derived statuses and an explicit
//!    `nothing_to_do` fast path.
//! 3. [`lower`] translates the plan into the data-only [`effect`] algebra.
//! 4. [`executor`] is the only component that performs I/O: it interprets
//!    effects in program order, short-circuiting on hard failure, or with
//!    per-entity isolation in batch mode.
//!
//! Every effect is individually idempotent, so a partially applied pass is
//! repaired by simply running apply again; nothing is ever rolled back and
//! nothing is ever deleted.

pub mod effect;
pub mod error;
pub mod executor;
pub mod gather;
pub mod lower;
pub mod plan;
mod sink;

#[cfg(test)]
mod engine_tests;
#[cfg(test)]
mod testing;

pub use effect::{
    Effect, FileEffect, FileOp, GitEffect, LogLevel, PersistEffect, SessionEffect, DIR_MODE,
    FILE_MODE,
};
pub use error::{ReconcileError, Result};
pub use executor::{BatchError, BatchReport, Executor, PersistSink};
pub use gather::{BenchState, Gatherer, MarkerState, SessionState, WindowState, WorkshopState};
pub use lower::{lower, EffectBatch, LoweredPlan};
pub use plan::{
    reconcile_materialize, reconcile_open, BenchAction, OpKind, Orphan, SessionAction,
    WindowAction, WorkshopPlan,
};
