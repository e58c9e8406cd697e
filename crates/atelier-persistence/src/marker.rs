//! Workbench marker files.
//!
//! Every materialized bench directory carries a marker file under a hidden
//! subdirectory. The marker's presence is one of the facts the state
//! gatherer reads, so the write path and the read path must agree exactly
//! on location and key names; both go through [`marker_path`] and
//! [`BenchMarker`] and nothing else.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use atelier_models::WorkbenchId;

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::Result;

/// Current marker schema version.
pub const MARKER_SCHEMA_VERSION: u32 = 1;

/// Hidden subdirectory holding Atelier metadata inside a bench.
const MARKER_DIR: &str = ".atelier";
/// Marker file name.
const MARKER_FILE: &str = "bench.json";

/// Marker written into every materialized bench directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchMarker {
    /// Schema version of this marker.
    pub schema_version: u32,
    /// Stable ID of the bench this directory belongs to.
    pub workbench_id: WorkbenchId,
}

impl BenchMarker {
    /// Creates a marker for the given bench at the current schema version.
    pub fn new(workbench_id: WorkbenchId) -> Self {
        Self {
            schema_version: MARKER_SCHEMA_VERSION,
            workbench_id,
        }
    }
}

/// Returns the marker file path for a bench rooted at `bench_root`.
pub fn marker_path(bench_root: &Path) -> PathBuf {
    bench_root.join(MARKER_DIR).join(MARKER_FILE)
}

/// Writes the marker for a bench. Creates the hidden directory as needed.
pub fn write_marker(bench_root: &Path, marker: &BenchMarker) -> Result<()> {
    atomic_write_json(&marker_path(bench_root), marker)
}

/// Reads the marker for a bench, if one exists.
pub fn read_marker(bench_root: &Path) -> Result<Option<BenchMarker>> {
    read_json_optional(&marker_path(bench_root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_marker_path_layout() {
        let path = marker_path(Path::new("/ws/alpha"));
        assert_eq!(path, PathBuf::from("/ws/alpha/.atelier/bench.json"));
    }

    #[test]
    fn test_write_then_read_same_contract() {
        let dir = tempdir().unwrap();
        let marker = BenchMarker::new(WorkbenchId::from_string("bench-1"));

        write_marker(dir.path(), &marker).unwrap();
        let loaded = read_marker(dir.path()).unwrap();

        assert_eq!(loaded, Some(marker));
    }

    #[test]
    fn test_read_marker_missing() {
        let dir = tempdir().unwrap();
        assert_eq!(read_marker(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_marker_key_names_are_stable() {
        // The gatherer depends on these exact keys; a rename here would make
        // idempotence checks detect "needs creation" forever.
        let marker = BenchMarker::new(WorkbenchId::from_string("bench-1"));
        let json = serde_json::to_value(&marker).unwrap();

        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["workbench_id"], "bench-1");
    }
}
