//! Entity model for the snapshot store.
//!
//! This module provides the types every store is built from:
//! - File records and the blob ranges they point at
//! - Immutable snapshots
//! - The tracking set

pub mod record;
pub mod snapshot;
pub mod tracking;

// Re-export all public types
pub use record::{BlobRange, FileRecord, RecordPath, MAX_PATH_LEN};
pub use snapshot::Snapshot;
pub use tracking::TrackingSet;
