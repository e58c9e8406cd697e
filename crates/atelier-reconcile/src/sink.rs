//! Store-backed persist sink.

use std::path::Path;

use atelier_models::{WorkbenchId, WorkshopId};
use atelier_persistence::{PersistenceError, WorkshopStore};

use crate::executor::PersistSink;

impl PersistSink for WorkshopStore {
    fn update_bench_path(
        &self,
        workshop_id: &WorkshopId,
        workbench_id: &WorkbenchId,
        path: &Path,
    ) -> Result<(), PersistenceError> {
        let mut workshop = self.load(workshop_id)?;
        let bench = workshop
            .bench_mut(workbench_id)
            .ok_or_else(|| PersistenceError::NotFound {
                kind: "workbench".to_string(),
                id: workbench_id.to_string(),
            })?;
        bench.recorded_path = Some(path.to_path_buf());
        self.save(&workshop)
    }
}
