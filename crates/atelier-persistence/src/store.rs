//! Entity stores backed by one JSON file per record.
//!
//! ```text
//! base_path/
//! ├── workshops/
//! │   └── shop-{uuid}.json
//! └── commissions/
//!     └── comm-{uuid}.json
//! ```

use std::fs;
use std::path::PathBuf;

use atelier_models::{Commission, CommissionId, Workshop, WorkshopId};

use crate::atomic::{atomic_write_json, read_json};
use crate::error::{PersistenceError, Result};

/// Persists workshop records (benches are embedded in their workshop).
pub struct WorkshopStore {
    base_path: PathBuf,
}

impl WorkshopStore {
    /// Creates a store rooted at the given state directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.base_path.join("workshops")
    }

    fn path(&self, id: &WorkshopId) -> PathBuf {
        self.dir().join(format!("{}.json", id))
    }

    /// Saves a workshop record.
    pub fn save(&self, workshop: &Workshop) -> Result<()> {
        atomic_write_json(&self.path(&workshop.id), workshop)
    }

    /// Loads a workshop by ID.
    pub fn load(&self, id: &WorkshopId) -> Result<Workshop> {
        let path = self.path(id);
        if !path.exists() {
            return Err(PersistenceError::NotFound {
                kind: WorkshopId::KIND.to_string(),
                id: id.to_string(),
            });
        }
        read_json(&path)
    }

    /// Loads a workshop by human name.
    pub fn load_by_name(&self, name: &str) -> Result<Workshop> {
        self.list()?
            .into_iter()
            .find(|w| w.name == name)
            .ok_or_else(|| PersistenceError::NotFound {
                kind: WorkshopId::KIND.to_string(),
                id: name.to_string(),
            })
    }

    /// Lists all workshop records, sorted by creation time.
    pub fn list(&self) -> Result<Vec<Workshop>> {
        let dir = self.dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut shops = Vec::new();
        let entries = fs::read_dir(&dir).map_err(|source| PersistenceError::ReadError {
            path: dir.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| PersistenceError::ReadError {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match read_json::<Workshop>(&path) {
                    Ok(shop) => shops.push(shop),
                    Err(e) => {
                        eprintln!("Warning: failed to load workshop {:?}: {}", path, e);
                    }
                }
            }
        }

        shops.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(shops)
    }

    /// Returns true if a workshop record exists.
    pub fn workshop_exists(&self, id: &WorkshopId) -> bool {
        self.path(id).exists()
    }

    /// Counts the benches recorded for a workshop.
    pub fn count_workbenches(&self, id: &WorkshopId) -> Result<usize> {
        Ok(self.load(id)?.benches.len())
    }

    /// Deletes a workshop record. Idempotent.
    pub fn delete(&self, id: &WorkshopId) -> Result<()> {
        let path = self.path(id);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|source| PersistenceError::WriteError { path, source })?;
        }
        Ok(())
    }
}

/// Persists commission records.
pub struct CommissionStore {
    base_path: PathBuf,
}

impl CommissionStore {
    /// Creates a store rooted at the given state directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.base_path.join("commissions")
    }

    fn path(&self, id: &CommissionId) -> PathBuf {
        self.dir().join(format!("{}.json", id))
    }

    /// Saves a commission record.
    pub fn save(&self, commission: &Commission) -> Result<()> {
        atomic_write_json(&self.path(&commission.id), commission)
    }

    /// Loads a commission by ID.
    pub fn load(&self, id: &CommissionId) -> Result<Commission> {
        let path = self.path(id);
        if !path.exists() {
            return Err(PersistenceError::NotFound {
                kind: CommissionId::KIND.to_string(),
                id: id.to_string(),
            });
        }
        read_json(&path)
    }

    /// Lists commissions for one workshop, sorted by creation time.
    pub fn list_for_workshop(&self, workshop_id: &WorkshopId) -> Result<Vec<Commission>> {
        let mut all = self.list()?;
        all.retain(|c| &c.workshop_id == workshop_id);
        Ok(all)
    }

    /// Lists all commission records, sorted by creation time.
    pub fn list(&self) -> Result<Vec<Commission>> {
        let dir = self.dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut comms = Vec::new();
        let entries = fs::read_dir(&dir).map_err(|source| PersistenceError::ReadError {
            path: dir.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| PersistenceError::ReadError {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match read_json::<Commission>(&path) {
                    Ok(comm) => comms.push(comm),
                    Err(e) => {
                        eprintln!("Warning: failed to load commission {:?}: {}", path, e);
                    }
                }
            }
        }

        comms.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comms)
    }

    /// Deletes a commission record. Idempotent.
    pub fn delete(&self, id: &CommissionId) -> Result<()> {
        let path = self.path(id);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|source| PersistenceError::WriteError { path, source })?;
        }
        Ok(())
    }
}
