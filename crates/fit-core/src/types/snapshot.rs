//! Immutable snapshots.

use super::{FileRecord, RecordPath};

/// An ordered set of records captured by one save.
///
/// A snapshot owns its records outright, so later saves can never reach back
/// and alter it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    records: Vec<FileRecord>,
}

impl Snapshot {
    /// Freeze records in the given order
    pub fn from_records(records: Vec<FileRecord>) -> Self {
        Self { records }
    }

    /// Records in insertion order
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the record for an exact path
    pub fn find(&self, path: &RecordPath) -> Option<&FileRecord> {
        self.records.iter().find(|record| &record.path == path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
