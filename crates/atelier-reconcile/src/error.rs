//! Error types for the reconciliation engine.

use atelier_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur during reconciliation and effect execution.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A guard denied the operation. Expected and user-actionable; the
    /// reason already names the blocking condition, so it is never wrapped
    /// in anything else.
    #[error("{0}")]
    GuardDenied(String),

    /// A requested entity does not exist. Propagated verbatim; never
    /// treated as "create".
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// An effect failed against the real world, wrapped with its kind.
    /// Re-running apply is safe: every effect is idempotent.
    #[error("effect {kind} failed: {source}")]
    Effect {
        kind: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ReconcileError {
    /// Wraps an underlying failure with the kind of the failing effect.
    pub fn effect(
        kind: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Effect {
            kind,
            source: Box::new(source),
        }
    }

    /// Returns true for the not-found error class.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReconcileError::Persistence(e) if e.is_not_found())
    }
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
