//! File record types.
//!
//! A record names one tracked path and, once saved, the digest and blob range
//! of the content captured for it.

use crate::digest::Base64Digest;
use crate::error::{FitError, FitResult};
use std::fmt;

/// Exclusive upper bound on the byte length of a record path
pub const MAX_PATH_LEN: usize = 256;

/// Validated path text of a tracked file.
///
/// Paths compare byte for byte; no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordPath(String);

impl RecordPath {
    /// Validate and wrap a path
    pub fn new(path: impl Into<String>) -> FitResult<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(FitError::invalid_path(path, "path is empty"));
        }
        if path.len() >= MAX_PATH_LEN {
            let reason = format!("path is {} bytes, the limit is {}", path.len(), MAX_PATH_LEN - 1);
            return Err(FitError::invalid_path(path, reason));
        }
        if path.contains('\0') {
            return Err(FitError::invalid_path(path, "path contains a NUL byte"));
        }
        Ok(Self(path))
    }

    /// Borrow the path text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Location of stored content inside the blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlobRange {
    pub offset: u64,
    pub length: u64,
}

impl BlobRange {
    pub const fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// One past the last byte, or `None` on overflow
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.length)
    }
}

/// One tracked file, either awaiting its first save or captured in a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: RecordPath,
    pub digest: Base64Digest,
    pub range: BlobRange,
}

impl FileRecord {
    /// A freshly tracked record with no content yet
    pub fn tracked(path: RecordPath) -> Self {
        Self {
            path,
            digest: Base64Digest::empty(),
            range: BlobRange::default(),
        }
    }

    /// A record whose content has been stored
    pub fn stored(path: RecordPath, digest: Base64Digest, range: BlobRange) -> Self {
        Self {
            path,
            digest,
            range,
        }
    }

    /// Check if content has ever been captured for this record
    pub fn has_content(&self) -> bool {
        !self.digest.is_empty()
    }
}
