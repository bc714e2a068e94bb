//! The set of paths awaiting the next snapshot.

use super::{FileRecord, RecordPath};
use crate::error::{FitError, FitResult};

/// Ordered, path-unique collection of tracked records
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackingSet {
    records: Vec<FileRecord>,
}

impl TrackingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded records, rejecting duplicate paths
    pub fn from_records(records: Vec<FileRecord>) -> FitResult<Self> {
        let mut set = Self::new();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    /// Append a record; fails if its path is already tracked
    pub fn insert(&mut self, record: FileRecord) -> FitResult<()> {
        if self.contains(&record.path) {
            return Err(FitError::AlreadyTracked {
                path: record.path.to_string(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// Remove and return the record with this exact path
    pub fn remove(&mut self, path: &RecordPath) -> FitResult<FileRecord> {
        let index = self
            .records
            .iter()
            .position(|record| &record.path == path)
            .ok_or_else(|| FitError::NotTracked {
                path: path.to_string(),
            })?;
        Ok(self.records.remove(index))
    }

    pub fn contains(&self, path: &RecordPath) -> bool {
        self.records.iter().any(|record| &record.path == path)
    }

    pub fn get(&self, path: &RecordPath) -> Option<&FileRecord> {
        self.records.iter().find(|record| &record.path == path)
    }

    /// Records in insertion order
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the contents after a save pass.
    ///
    /// The caller passes a subsequence of the current records (in the same
    /// order), so path uniqueness still holds.
    pub fn replace(&mut self, records: Vec<FileRecord>) {
        debug_assert!(
            records
                .iter()
                .enumerate()
                .all(|(i, r)| records[i + 1..].iter().all(|o| o.path != r.path)),
            "tracking set replacement must keep paths unique"
        );
        self.records = records;
    }
}
