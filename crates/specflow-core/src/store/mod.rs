//! Atomic, crash-consistent persistence of spec records.
//!
//! One JSON record per spec lives under `active/<id>/state.json`, next to the
//! artifacts produced for that spec. A lightweight projection of every active
//! record is kept in `index.json`; it is maintained by every mutating call
//! under a short-lived lock and is the source of truth for listing and name
//! uniqueness. Archived records move to `completed/<id>` and become
//! read-only; cancelled records are deleted or tombstoned under
//! `cancelled/<id>`.

pub mod atomic;
pub mod layout;
pub mod validate;

#[cfg(test)]
mod tests;

use std::{
    fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, PoisonError},
};

use jiff::Timestamp;
use log::{debug, info, warn};

pub use layout::Layout;

use crate::{
    error::{IoResultExt, OrchestratorError, Result},
    models::{Spec, SpecSummary},
};

/// File-backed state store for spec records.
#[derive(Debug)]
pub struct SpecStore {
    layout: Layout,
    index_lock: Mutex<()>,
    #[cfg(test)]
    fail_index_writes: std::sync::atomic::AtomicBool,
}

impl SpecStore {
    /// Opens the store, creating its directories if needed.
    pub fn open(layout: Layout) -> Result<Self> {
        for dir in [
            layout.active_dir(),
            layout.completed_dir(),
            layout.cancelled_dir(),
        ] {
            fs::create_dir_all(&dir).at_path(&dir)?;
        }
        debug!("Opened spec store at {}", layout.specs_dir().display());
        Ok(Self {
            layout,
            index_lock: Mutex::new(()),
            #[cfg(test)]
            fail_index_writes: std::sync::atomic::AtomicBool::new(false),
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Directory of an active spec.
    pub fn spec_dir(&self, id: &str) -> PathBuf {
        self.layout.spec_dir(id)
    }

    fn lock_index(&self) -> MutexGuard<'_, ()> {
        self.index_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persists a brand-new record and registers it in the index.
    ///
    /// Fails with [`OrchestratorError::DuplicateName`] if an active spec
    /// already uses the same name. If the record or the index cannot be
    /// written, the new record directory is removed again.
    pub fn insert(&self, spec: &Spec) -> Result<()> {
        validate::check_record(&spec.id, spec)?;

        let _guard = self.lock_index();
        let mut index = self.read_index()?;
        if index.iter().any(|entry| entry.name == spec.name) {
            return Err(OrchestratorError::DuplicateName {
                name: spec.name.clone(),
            });
        }

        let dir = self.layout.spec_dir(&spec.id);
        if dir.exists() || self.layout.completed_spec_dir(&spec.id).exists() {
            return Err(OrchestratorError::invalid_input("id")
                .with_reason(format!("spec id {} is already in use", spec.id)));
        }
        fs::create_dir_all(&dir).at_path(&dir)?;
        index.push(SpecSummary::from(spec));
        if let Err(e) = self
            .write_record(spec)
            .and_then(|()| self.write_index(&index))
        {
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                warn!("Could not remove partial record {}: {cleanup}", dir.display());
            }
            return Err(e);
        }
        info!("Created spec record {} ({})", spec.id, spec.name);
        Ok(())
    }

    /// Loads and validates an active record.
    pub fn load(&self, id: &str) -> Result<Spec> {
        self.load_from(id, self.layout.state_file(id))
    }

    /// Loads a record from the completed index.
    pub fn load_archived(&self, id: &str) -> Result<Spec> {
        let path = self
            .layout
            .completed_spec_dir(id)
            .join(layout::STATE_FILE);
        self.load_from(id, path)
    }

    fn load_from(&self, id: &str, path: PathBuf) -> Result<Spec> {
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OrchestratorError::NotFound { id: id.to_string() })
            }
            Err(e) => return Err(e).at_path(path),
        };
        validate::parse_record(id, &bytes)
    }

    /// Replaces the active record of `spec` atomically and refreshes its
    /// index entry. Sets `updated_at`.
    ///
    /// The record is written first. If the index write then fails, the
    /// record is already replaced and the error is returned; the index is a
    /// projection of the records and [`SpecStore::rebuild_index`] repairs it.
    pub fn save(&self, spec: &mut Spec) -> Result<()> {
        if !self.layout.state_file(&spec.id).exists() {
            return Err(OrchestratorError::NotFound {
                id: spec.id.clone(),
            });
        }
        spec.updated_at = Timestamp::now();
        validate::check_record(&spec.id, spec)?;
        self.write_record(spec)?;

        let _guard = self.lock_index();
        let mut index = self.read_index()?;
        let summary = SpecSummary::from(&*spec);
        match index.iter_mut().find(|entry| entry.id == spec.id) {
            Some(entry) => *entry = summary,
            None => index.push(summary),
        }
        self.write_index(&index)?;
        debug!("Saved spec {} at phase {}", spec.id, spec.phase);
        Ok(())
    }

    fn write_record(&self, spec: &Spec) -> Result<()> {
        let json = serde_json::to_vec_pretty(spec)?;
        atomic::write_atomic(&self.layout.state_file(&spec.id), &json)
    }

    /// Summaries of every active spec, oldest first.
    pub fn list_active(&self) -> Result<Vec<SpecSummary>> {
        let _guard = self.lock_index();
        self.read_index()
    }

    /// Summaries of every archived spec, oldest first.
    pub fn list_archived(&self) -> Result<Vec<SpecSummary>> {
        let mut summaries = Vec::new();
        for id in self.record_ids(self.layout.completed_dir())? {
            let spec = self.load_archived(&id)?;
            summaries.push(SpecSummary::from(&spec));
        }
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    /// Looks up an active spec by name.
    pub fn find_by_name(&self, name: &str) -> Result<Option<SpecSummary>> {
        Ok(self
            .list_active()?
            .into_iter()
            .find(|entry| entry.name == name))
    }

    /// Moves an active record into the completed index and makes it
    /// read-only.
    pub fn move_to_archive(&self, id: &str) -> Result<()> {
        let _guard = self.lock_index();

        let target = self.layout.completed_spec_dir(id);
        if target.exists() {
            return Err(OrchestratorError::AlreadyArchived { id: id.to_string() });
        }
        let source = self.layout.spec_dir(id);
        if !source.join(layout::STATE_FILE).exists() {
            return Err(OrchestratorError::NotFound { id: id.to_string() });
        }

        fs::rename(&source, &target).at_path(&source)?;
        set_read_only(&target.join(layout::STATE_FILE))?;

        let mut index = self.read_index()?;
        index.retain(|entry| entry.id != id);
        self.write_index(&index)?;
        info!("Moved spec {id} to the completed index");
        Ok(())
    }

    /// Moves a cancelled spec's directory under `cancelled/`, stamping the
    /// record with `cancelled_at`.
    pub fn tombstone(&self, spec: &mut Spec) -> Result<()> {
        spec.cancelled_at = Some(Timestamp::now());
        spec.updated_at = Timestamp::now();
        self.write_record(spec)?;

        let _guard = self.lock_index();
        let source = self.layout.spec_dir(&spec.id);
        let target = self.layout.cancelled_spec_dir(&spec.id);
        if target.exists() {
            fs::remove_dir_all(&target).at_path(&target)?;
        }
        fs::rename(&source, &target).at_path(&source)?;
        self.drop_from_index(&spec.id)
    }

    /// Deletes an active spec's directory and artifacts.
    pub fn remove(&self, id: &str) -> Result<()> {
        let _guard = self.lock_index();
        let dir = self.layout.spec_dir(id);
        if !dir.exists() {
            return Err(OrchestratorError::NotFound { id: id.to_string() });
        }
        fs::remove_dir_all(&dir).at_path(&dir)?;
        self.drop_from_index(id)
    }

    fn drop_from_index(&self, id: &str) -> Result<()> {
        let mut index = self.read_index()?;
        index.retain(|entry| entry.id != id);
        self.write_index(&index)
    }

    /// Regenerates `index.json` from the active records.
    ///
    /// Fails on the first record that does not validate.
    pub fn rebuild_index(&self) -> Result<Vec<SpecSummary>> {
        let _guard = self.lock_index();
        let mut index = Vec::new();
        for id in self.record_ids(self.layout.active_dir())? {
            let spec = self.load(&id)?;
            index.push(SpecSummary::from(&spec));
        }
        sort_summaries(&mut index);
        self.write_index(&index)?;
        info!("Rebuilt index with {} active specs", index.len());
        Ok(index)
    }

    fn record_ids(&self, dir: PathBuf) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e).at_path(dir),
        };
        for entry in entries {
            let entry = entry.at_path(&dir)?;
            if entry.path().join(layout::STATE_FILE).is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn read_index(&self) -> Result<Vec<SpecSummary>> {
        let path = self.layout.index_file();
        match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                OrchestratorError::corrupt("index", format!("{}: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).at_path(path),
        }
    }

    fn write_index(&self, index: &[SpecSummary]) -> Result<()> {
        #[cfg(test)]
        if self
            .fail_index_writes
            .load(std::sync::atomic::Ordering::SeqCst)
        {
            return Err(std::io::Error::other("injected index failure"))
                .at_path(self.layout.index_file());
        }
        let mut sorted = index.to_vec();
        sort_summaries(&mut sorted);
        let json = serde_json::to_vec_pretty(&sorted)?;
        atomic::write_atomic(&self.layout.index_file(), &json)
    }
}

fn sort_summaries(summaries: &mut [SpecSummary]) {
    summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

fn set_read_only(path: &std::path::Path) -> Result<()> {
    let mut permissions = fs::metadata(path).at_path(path)?.permissions();
    permissions.set_readonly(true);
    fs::set_permissions(path, permissions).at_path(path)
}
