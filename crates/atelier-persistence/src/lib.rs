//! JSON persistence for Atelier.
//!
//! Entities are stored as one JSON file each under the state directory,
//! written atomically (temp file then rename) so a crash never leaves a
//! half-written record. This crate also owns the workbench marker file:
//! the on-disk breadcrumb the reconciler reads to decide whether a bench
//! directory was materialized by Atelier.

pub mod atomic;
pub mod error;
pub mod marker;
pub mod store;

pub use atomic::{atomic_write_json, read_json, read_json_optional};
pub use error::{PersistenceError, Result};
pub use marker::{marker_path, read_marker, write_marker, BenchMarker, MARKER_SCHEMA_VERSION};
pub use store::{CommissionStore, WorkshopStore};
