//! Tmux session driver for Atelier workshops.
//!
//! One workshop maps to one tmux session, one workbench to one window.
//! Sessions are tracked by a stable workshop-ID environment marker rather
//! than by display name, so a manual rename never orphans a workshop.
//!
//! The [`SessionDriver`] trait is the seam the reconciliation engine
//! consumes; [`TmuxDriver`] is the shelling implementation.

pub mod driver;
pub mod error;
pub mod session;

pub use driver::{SessionDriver, TmuxDriver, ACTOR_PANE, WINDOW_PANES};
pub use error::{Result, TmuxError};
pub use session::{PaneInfo, WindowInfo, WORKSHOP_ID_VAR};
