//! The save pass: classify every tracked file and record a snapshot.

use camino::Utf8Path;
use fit_core::digest::{hash_buffer, Base64Digest};
use fit_core::error::FitError;
use fit_core::types::{FileRecord, RecordPath, Snapshot};
use fit_core::utils::resolve_record_path;
use std::fs;
use std::io;
use tracing::{debug, info, warn};

use super::{ChangeKind, EngineState, FileChange, SaveOutcome, SaveReport, SnapshotEngine};
use crate::StoreResult;

/// A file read during the pass, before anything touches the store
enum Staged {
    /// Content that must be appended to the blob
    Fresh {
        path: RecordPath,
        digest: Base64Digest,
        content: Vec<u8>,
        kind: ChangeKind,
    },
    /// Same digest as the previous snapshot; its record is carried forward
    Carried(FileRecord),
    Deleted(RecordPath),
}

impl SnapshotEngine {
    /// Snapshot every tracked file.
    ///
    /// All files are read and classified first; the blob, snapshot list and
    /// tracking set are only touched once every read has succeeded.
    pub fn save(&mut self) -> StoreResult<SaveOutcome> {
        if self.store.tracking().is_empty() {
            info!(store = %self.store_path, "No files are tracked, nothing to save");
            return Ok(SaveOutcome::NothingTracked);
        }

        let staged = self.stage()?;
        self.check_blob_limit(&staged)?;

        let mut records = Vec::with_capacity(staged.len());
        let mut changes = Vec::with_capacity(staged.len());
        for entry in staged {
            match entry {
                Staged::Fresh {
                    path,
                    digest,
                    content,
                    kind,
                } => {
                    let range = self.store.blob_mut().append(&content);
                    debug!(path = %path, %kind, offset = range.offset, length = range.length, "Stored content");
                    changes.push(FileChange {
                        path: path.clone(),
                        kind,
                    });
                    records.push(FileRecord::stored(path, digest, range));
                },
                Staged::Carried(record) => {
                    debug!(path = %record.path, "Unchanged");
                    changes.push(FileChange {
                        path: record.path.clone(),
                        kind: ChangeKind::Unchanged,
                    });
                    records.push(record);
                },
                Staged::Deleted(path) => {
                    warn!(path = %path, "Tracked file was renamed or deleted, dropping it");
                    changes.push(FileChange {
                        path,
                        kind: ChangeKind::Deleted,
                    });
                },
            }
        }

        self.store.tracking_mut().replace(records.clone());
        let snapshot_index = self.store.push_snapshot(Snapshot::from_records(records));
        self.state = EngineState::Mutated;
        self.persist()?;

        let report = SaveReport {
            snapshot_index,
            changes,
        };
        info!(
            snapshot = snapshot_index,
            new = report.count(ChangeKind::New),
            changed = report.count(ChangeKind::Changed),
            deleted = report.count(ChangeKind::Deleted),
            store = %self.store_path,
            "Saved snapshot"
        );
        Ok(SaveOutcome::Saved(report))
    }

    /// Refuse a pass whose appends would push the blob past the decode limit
    fn check_blob_limit(&self, staged: &[Staged]) -> StoreResult<()> {
        let fresh: u64 = staged
            .iter()
            .map(|entry| match entry {
                Staged::Fresh { content, .. } => content.len() as u64,
                _ => 0,
            })
            .sum();
        let size = self.store.blob().len().saturating_add(fresh);
        let limit = self.options.limits.max_blob_bytes;
        if size > limit {
            warn!(size, limit, store = %self.store_path, "Save would exceed the blob limit");
            return Err(FitError::BlobLimitExceeded { size, limit });
        }
        Ok(())
    }

    fn stage(&self) -> StoreResult<Vec<Staged>> {
        let previous = self.store.latest();
        let mut staged = Vec::with_capacity(self.store.tracking().len());

        for tracked in self.store.tracking().iter() {
            let path = tracked.path.clone();
            let file = resolve_record_path(&self.root, &path)?;
            let content = match fs::read(&file) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound || self.parent_is_file(&file) => {
                    staged.push(Staged::Deleted(path));
                    continue;
                },
                Err(e) => {
                    return Err(FitError::io(format!("Failed to read tracked file {}", file), e))
                },
            };

            let digest = hash_buffer(&content);
            let entry = match previous.and_then(|snapshot| snapshot.find(&path)) {
                Some(prior) if prior.digest == digest => Staged::Carried(prior.clone()),
                Some(_) => Staged::Fresh {
                    path,
                    digest,
                    content,
                    kind: ChangeKind::Changed,
                },
                None => Staged::Fresh {
                    path,
                    digest,
                    content,
                    kind: ChangeKind::New,
                },
            };
            staged.push(entry);
        }

        Ok(staged)
    }

    /// True when a directory between the store root and `file` is now a regular
    /// file, so the tracked path can no longer exist.
    fn parent_is_file(&self, file: &Utf8Path) -> bool {
        file.ancestors()
            .skip(1)
            .take_while(|ancestor| *ancestor != self.root.as_path())
            .any(|ancestor| fs::metadata(ancestor).map_or(false, |meta| !meta.is_dir()))
    }
}
