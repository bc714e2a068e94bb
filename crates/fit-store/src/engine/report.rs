//! Result types returned by engine operations.

use fit_core::digest::Base64Digest;
use fit_core::types::{BlobRange, FileRecord, RecordPath};
use std::fmt;

/// How a tracked file compared against the previous snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Not present in the previous snapshot
    New,
    /// Present with a different digest
    Changed,
    /// Present with the same digest; the previous blob range is reused
    Unchanged,
    /// Missing from disk; dropped from the tracking set
    Deleted,
}

impl ChangeKind {
    pub fn is_change(self) -> bool {
        !matches!(self, ChangeKind::Unchanged)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::New => "new",
            ChangeKind::Changed => "changed",
            ChangeKind::Unchanged => "unchanged",
            ChangeKind::Deleted => "deleted",
        };
        f.write_str(label)
    }
}

/// Classification of one tracked file during a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: RecordPath,
    pub kind: ChangeKind,
}

/// Outcome of a save pass that wrote a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Index of the snapshot that was appended
    pub snapshot_index: usize,
    /// Every tracked file in tracking order, deletions included
    pub changes: Vec<FileChange>,
}

impl SaveReport {
    /// False when every file was unchanged
    pub fn has_changes(&self) -> bool {
        self.changes.iter().any(|change| change.kind.is_change())
    }

    /// Number of files classified as `kind`
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|change| change.kind == kind).count()
    }

    /// Files of one classification, in tracking order
    pub fn paths(&self, kind: ChangeKind) -> impl Iterator<Item = &RecordPath> {
        self.changes
            .iter()
            .filter(move |change| change.kind == kind)
            .map(|change| &change.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(SaveReport),
    /// The tracking set was empty; no snapshot was written
    NothingTracked,
}

/// Which snapshot `load` restores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotSelector {
    #[default]
    Latest,
    Index(usize),
}

impl From<Option<usize>> for SnapshotSelector {
    fn from(index: Option<usize>) -> Self {
        index.map_or(SnapshotSelector::Latest, SnapshotSelector::Index)
    }
}

/// Files written back by `load`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub snapshot_index: usize,
    pub restored: Vec<RecordPath>,
}

/// One snapshot as listed by `snaps`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSummary<'a> {
    pub index: usize,
    pub latest: bool,
    pub records: &'a [FileRecord],
}

/// A snapshot record whose stored bytes do not match it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyIssue {
    OutOfBounds {
        snapshot_index: usize,
        path: RecordPath,
        range: BlobRange,
        blob_len: u64,
    },
    DigestMismatch {
        snapshot_index: usize,
        path: RecordPath,
        expected: Base64Digest,
        actual: Base64Digest,
    },
}

impl fmt::Display for VerifyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyIssue::OutOfBounds {
                snapshot_index,
                path,
                range,
                blob_len,
            } => write!(
                f,
                "snapshot [{}] {}: range {}+{} exceeds blob size {}",
                snapshot_index, path, range.offset, range.length, blob_len
            ),
            VerifyIssue::DigestMismatch {
                snapshot_index,
                path,
                expected,
                actual,
            } => write!(
                f,
                "snapshot [{}] {}: expected digest {}, found {}",
                snapshot_index, path, expected, actual
            ),
        }
    }
}

/// Result of re-hashing every snapshot record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerifyReport {
    pub snapshots_checked: usize,
    pub records_checked: usize,
    pub issues: Vec<VerifyIssue>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
