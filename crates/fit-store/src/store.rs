//! The in-memory store and its backing file.
//!
//! A [`Store`] owns the snapshot history, the tracking set and the blob. It is
//! read from and written to a single file through the codec.

use camino::Utf8Path;
use fit_core::error::FitError;
use fit_core::types::{Snapshot, TrackingSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use tracing::debug;

use crate::blob::Blob;
use crate::codec::{self, DecodeLimits};
use crate::StoreResult;

/// Knobs that control how a store file is read and written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Sanity limits applied while decoding
    pub limits: DecodeLimits,
    /// Write to a temporary file and rename it over the store
    pub atomic_writes: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            limits: DecodeLimits::default(),
            atomic_writes: true,
        }
    }
}

/// Snapshot history, tracking set and content blob
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Store {
    snapshots: Vec<Snapshot>,
    tracking: TrackingSet,
    blob: Blob,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a store from decoded parts
    pub fn from_parts(snapshots: Vec<Snapshot>, tracking: TrackingSet, blob: Blob) -> Self {
        Self {
            snapshots,
            tracking,
            blob,
        }
    }

    /// Snapshots, oldest first
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// The most recent snapshot
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn tracking(&self) -> &TrackingSet {
        &self.tracking
    }

    pub fn tracking_mut(&mut self) -> &mut TrackingSet {
        &mut self.tracking
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    pub fn blob_mut(&mut self) -> &mut Blob {
        &mut self.blob
    }

    /// Append a snapshot and return its index
    pub fn push_snapshot(&mut self, snapshot: Snapshot) -> usize {
        self.snapshots.push(snapshot);
        self.snapshots.len() - 1
    }

    /// Read and decode a store file
    pub fn load_file(path: &Utf8Path, limits: &DecodeLimits) -> StoreResult<Self> {
        let file = File::open(path)
            .map_err(|e| FitError::io(format!("Failed to open store {}", path), e))?;
        let store = codec::decode_store(&mut BufReader::new(file), limits)?;
        debug!(
            path = %path,
            snapshots = store.snapshots.len(),
            tracked = store.tracking.len(),
            blob_bytes = store.blob.len(),
            "Loaded store"
        );
        Ok(store)
    }

    /// Encode and write the store to `path`
    pub fn save_file(&self, path: &Utf8Path, options: &StoreOptions) -> StoreResult<()> {
        if options.atomic_writes {
            self.save_atomic(path)?;
        } else {
            let mut file = File::create(path)
                .map_err(|e| FitError::io(format!("Failed to create store {}", path), e))?;
            self.write_to(&mut file, path)?;
        }
        debug!(path = %path, atomic = options.atomic_writes, "Persisted store");
        Ok(())
    }

    fn save_atomic(&self, path: &Utf8Path) -> StoreResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| FitError::io(format!("Failed to create temporary file in {}", dir), e))?;
        self.write_to(temp.as_file_mut(), path)?;

        temp.persist(path)
            .map_err(|e| FitError::io(format!("Failed to replace store {}", path), e.error))?;
        Ok(())
    }

    fn write_to(&self, file: &mut File, path: &Utf8Path) -> StoreResult<()> {
        let mut writer = BufWriter::new(file);
        codec::encode_store(self, &mut writer)?;
        let file = writer
            .into_inner()
            .map_err(|e| FitError::io(format!("Failed to flush store {}", path), e.into_error()))?;
        file.sync_all()
            .map_err(|e| FitError::io(format!("Failed to sync store {}", path), e))?;
        Ok(())
    }

    /// Check whether a store file exists at `path`
    pub fn exists(path: &Utf8Path) -> StoreResult<bool> {
        match fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FitError::io(format!("Failed to inspect {}", path), e)),
        }
    }
}
