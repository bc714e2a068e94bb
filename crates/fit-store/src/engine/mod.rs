//! Snapshot engine
//!
//! A [`SnapshotEngine`] owns one [`Store`] together with the file it was read
//! from. Every mutating operation persists the store before returning, so the
//! file on disk always reflects the last successful command.
//!
//! Tracked paths are relative to the directory that contains the store file.

mod report;
mod save;
mod verify;

pub use report::{
    ChangeKind, FileChange, LoadReport, SaveOutcome, SaveReport, SnapshotSelector,
    SnapshotSummary, VerifyIssue, VerifyReport,
};

use camino::{Utf8Path, Utf8PathBuf};
use fit_core::error::FitError;
use fit_core::types::{FileRecord, RecordPath};
use fit_core::utils::{resolve_record_path, store_root};
use std::fs;
use tracing::{debug, info};

use crate::store::{Store, StoreOptions};
use crate::StoreResult;

/// Lifecycle of the in-memory store relative to its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Decoded from disk, not yet modified
    Loaded,
    /// Modified in memory, not yet written
    Mutated,
    /// Written to disk since the last modification
    Persisted,
}

/// Tracks files and records snapshots into a single store file
#[derive(Debug)]
pub struct SnapshotEngine {
    store: Store,
    /// Path of the store file
    store_path: Utf8PathBuf,
    /// Directory tracked paths resolve against
    root: Utf8PathBuf,
    options: StoreOptions,
    state: EngineState,
}

impl SnapshotEngine {
    /// Create a new, empty store file at `path`
    pub fn create<P: AsRef<Utf8Path>>(path: P, options: StoreOptions) -> StoreResult<Self> {
        let store_path = path.as_ref().to_path_buf();
        if Store::exists(&store_path)? {
            return Err(FitError::StoreExists {
                path: store_path.to_string(),
            });
        }

        let mut engine = Self::with_store(Store::new(), store_path, options, EngineState::Mutated);
        engine.persist()?;
        info!(path = %engine.store_path, "Created store");
        Ok(engine)
    }

    /// Open an existing store file
    pub fn open<P: AsRef<Utf8Path>>(path: P, options: StoreOptions) -> StoreResult<Self> {
        let store_path = path.as_ref().to_path_buf();
        let store = Store::load_file(&store_path, &options.limits)?;
        Ok(Self::with_store(store, store_path, options, EngineState::Loaded))
    }

    fn with_store(
        store: Store,
        store_path: Utf8PathBuf,
        options: StoreOptions,
        state: EngineState,
    ) -> Self {
        let root = store_root(&store_path);
        Self {
            store,
            store_path,
            root,
            options,
            state,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_path(&self) -> &Utf8Path {
        &self.store_path
    }

    /// Directory that tracked paths are relative to
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Write the store back to its file
    fn persist(&mut self) -> StoreResult<()> {
        self.store.save_file(&self.store_path, &self.options)?;
        self.state = EngineState::Persisted;
        Ok(())
    }
}

impl SnapshotEngine {
    /// Start tracking `path`; the file itself is not read until the next save
    pub fn track(&mut self, path: &str) -> StoreResult<RecordPath> {
        let path = RecordPath::new(path)?;
        // Rejects absolute paths and paths that climb out of the root
        resolve_record_path(&self.root, &path)?;

        self.store
            .tracking_mut()
            .insert(FileRecord::tracked(path.clone()))?;
        self.state = EngineState::Mutated;
        self.persist()?;

        info!(path = %path, store = %self.store_path, "Tracking file");
        Ok(path)
    }

    /// Stop tracking `path`; earlier snapshots keep their copies
    pub fn untrack(&mut self, path: &str) -> StoreResult<RecordPath> {
        let path = RecordPath::new(path)?;
        self.store.tracking_mut().remove(&path)?;
        self.state = EngineState::Mutated;
        self.persist()?;

        info!(path = %path, store = %self.store_path, "Untracked file");
        Ok(path)
    }

    /// Tracked records in tracking order
    pub fn list_tracking(&self) -> &[FileRecord] {
        self.store.tracking().records()
    }

    /// Every snapshot, oldest first, with the newest flagged
    pub fn list_snapshots(&self) -> Vec<SnapshotSummary<'_>> {
        let snapshots = self.store.snapshots();
        snapshots
            .iter()
            .enumerate()
            .map(|(index, snapshot)| SnapshotSummary {
                index,
                latest: index + 1 == snapshots.len(),
                records: snapshot.records(),
            })
            .collect()
    }

    /// Map a selector onto a snapshot index
    pub fn resolve_selector(&self, selector: SnapshotSelector) -> StoreResult<usize> {
        let count = self.store.snapshots().len();
        if count == 0 {
            return Err(FitError::NoSnapshots);
        }
        match selector {
            SnapshotSelector::Latest => Ok(count - 1),
            SnapshotSelector::Index(index) if index < count => Ok(index),
            SnapshotSelector::Index(index) => Err(FitError::SnapshotOutOfRange { index, count }),
        }
    }

    /// Write the files of a snapshot back to disk.
    ///
    /// Parent directories are created and existing files overwritten. Every
    /// blob range is checked before the first file is written. The store
    /// itself is not modified.
    pub fn load(&self, selector: SnapshotSelector) -> StoreResult<LoadReport> {
        let snapshot_index = self.resolve_selector(selector)?;
        let snapshot = &self.store.snapshots()[snapshot_index];
        let blob = self.store.blob();

        let mut staged = Vec::with_capacity(snapshot.len());
        for record in snapshot {
            let target = resolve_record_path(&self.root, &record.path)?;
            let content = blob.read(record.range)?;
            staged.push((record, target, content));
        }

        let mut restored = Vec::with_capacity(staged.len());
        for (record, target, content) in staged {
            if let Some(parent) = target.parent() {
                if !parent.as_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| {
                        FitError::io(format!("Failed to create directory {}", parent), e)
                    })?;
                }
            }
            fs::write(&target, content)
                .map_err(|e| FitError::io(format!("Failed to write {}", target), e))?;
            debug!(path = %record.path, bytes = content.len(), "Restored file");
            restored.push(record.path.clone());
        }

        info!(
            snapshot = snapshot_index,
            files = restored.len(),
            store = %self.store_path,
            "Loaded snapshot"
        );
        Ok(LoadReport {
            snapshot_index,
            restored,
        })
    }
}

#[cfg(test)]
mod tests;
