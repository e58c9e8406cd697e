//! Core data models for Atelier.
//!
//! This crate provides the fundamental data types used throughout the
//! Atelier system: workshops, workbenches, commissions, and workplans.

pub mod commission;
pub mod ids;
pub mod workbench;
pub mod workshop;

// Re-export main types
pub use commission::{Commission, CommissionStatus, Workplan, WorkplanStatus};
pub use ids::{ActorId, CommissionId, IdError, WorkbenchId, WorkplanId, WorkshopId};
pub use workbench::{Role, Workbench, WorkbenchStatus};
pub use workshop::{Workshop, WorkshopStatus};
