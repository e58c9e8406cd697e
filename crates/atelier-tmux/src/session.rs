//! Tmux window and pane data structures.

use crate::{Result, TmuxError};

/// Environment variable carrying the owning workshop's stable ID.
///
/// Sessions are always located through this marker, never by display name,
/// so a manual `rename-session` cannot break tracking.
pub const WORKSHOP_ID_VAR: &str = "ATELIER_WORKSHOP_ID";

/// A window within a tmux session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Window index within the session.
    pub index: u32,
    /// Window name.
    pub name: String,
    /// Number of panes in the window.
    pub pane_count: u32,
}

impl WindowInfo {
    /// Parse a window from `list-windows` output.
    ///
    /// Expected format: `window_index:window_name:window_panes`
    pub fn parse(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.splitn(3, ':').collect();
        if parts.len() != 3 {
            return Err(TmuxError::ParseError(format!(
                "invalid window format: {}",
                line
            )));
        }

        let index: u32 = parts[0]
            .parse()
            .map_err(|_| TmuxError::ParseError(format!("invalid window index: {}", parts[0])))?;
        let pane_count: u32 = parts[2]
            .trim()
            .parse()
            .map_err(|_| TmuxError::ParseError(format!("invalid pane count: {}", parts[2])))?;

        Ok(Self {
            index,
            name: parts[1].to_string(),
            pane_count,
        })
    }
}

/// A pane within a tmux window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneInfo {
    /// Pane index within the window.
    pub index: u32,
    /// Command currently running in the pane.
    pub command: String,
}

impl PaneInfo {
    /// Parse a pane from `list-panes` output.
    ///
    /// Expected format: `pane_index:pane_current_command`
    pub fn parse(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.splitn(2, ':').collect();
        if parts.len() != 2 {
            return Err(TmuxError::ParseError(format!(
                "invalid pane format: {}",
                line
            )));
        }

        let index: u32 = parts[0]
            .parse()
            .map_err(|_| TmuxError::ParseError(format!("invalid pane index: {}", parts[0])))?;

        Ok(Self {
            index,
            command: parts[1].trim().to_string(),
        })
    }
}
